//! # opcost: cost of elementary algebraic operations
//!
//! opcost measures the mean wall-clock time of the building blocks
//! cryptographic schemes are priced in: scalar field arithmetic, curve group
//! law and scalar multiplication on G1 and G2, target group arithmetic and
//! exponentiation in GT, the bilinear pairing, and modular arithmetic on
//! integers of increasing size.
//!
//! ## Architecture
//!
//! - **[`backend`]**: trait abstractions over pairing libraries (Arkworks,
//!   blstrs) so every curve is driven through one interface.
//! - **[`domain`]**: [`Operation`]s and the [`AlgebraicDomain`] contract a
//!   structure implements to be measured.
//! - **[`adapter`]**: [`AlgebraicBackend`]s that own the domains of one
//!   configuration (a pairing curve, an integer ring) and their lifecycle.
//! - **[`sampler`]**, **[`timer`]**, **[`accumulator`]**: fresh random
//!   operands, one timed call, the running sums.
//! - **[`suite`]**: the trial loop producing a [`BackendReport`].
//! - **[`runner`]**: plans backends from a [`BenchConfig`] and runs them,
//!   optionally in parallel.
//! - **[`report`]**: plain-text rendering.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use opcost::{BenchConfig, RandomSampler, ReportPrinter, SuiteRunner, plan};
//!
//! # fn main() -> Result<(), opcost::errors::Error> {
//! let config = BenchConfig {
//!     trials: 1_000,
//!     integer_trials: 1_000,
//!     integer_bit_lengths: vec![256, 2048],
//!     ..BenchConfig::default()
//! };
//! let reports = SuiteRunner::new(RandomSampler::new()).run(plan(&config)?);
//! print!("{}", ReportPrinter.render(&reports));
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - **`arkworks`** (default): BN254, BLS12-381, MNT4-298 and MNT6-298 via
//!   arkworks
//! - **`blst`** (default): BLS12-381 via blstrs
//!
//! The integer ring (`num-bigint`) is always available.
//!
//! ## Measurement
//!
//! Each trial draws fresh operands from a CSPRNG seeded by the operating
//! system, outside the timed window. Only the operation call itself is
//! bracketed by the clock. Means are integer nanosecond sums divided by the
//! number of recorded trials.

pub mod accumulator;
pub mod adapter;
pub mod backend;
pub mod config;
pub mod domain;
pub mod errors;
pub mod report;
pub mod runner;
pub mod sampler;
mod serde_impl;
pub mod suite;
pub mod timer;

pub use adapter::{AlgebraicBackend, BackendState};
pub use config::{BackendConfig, BackendId, BenchConfig, CurveId};
pub use domain::{AlgebraicDomain, BackendDescriptor, DomainId, Notation, Operation};
pub use report::ReportPrinter;
pub use runner::{PlannedBackend, SuiteRunner, plan};
pub use sampler::RandomSampler;
pub use suite::{BackendReport, BenchmarkResult, BenchmarkSuite, OperationOutcome};
