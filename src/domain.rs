//! Algebraic domains and the operations measured over them.
//!
//! A domain is one algebraic structure (a scalar field, a curve group, the
//! pairing target group, an integer ring modulo a prime) together with the
//! subset of [`Operation`]s it supports. Domains know how to draw fresh
//! operands for each operation and how to dispatch that operation into the
//! concrete implementation; they know nothing about timing.
//!
//! # Canonical order
//!
//! [`Operation`] derives `Ord` in the order results are emitted and printed:
//! Add, Sub, Neg, Mul, Div, Mod, Invert, ScalarMultiply, Pair.

use core::fmt;

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::{BackendConfig, CurveId};
use crate::errors::Error;
use crate::sampler::RandomSampler;

/// An elementary operation whose cost is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Sub,
    Neg,
    Mul,
    Div,
    /// Reduction of an unreduced value modulo the domain's modulus.
    Mod,
    Invert,
    /// Scalar multiplication in additive groups, exponentiation in
    /// multiplicative ones.
    ScalarMultiply,
    /// Bilinear map `e: G1 x G2 -> GT`.
    Pair,
}

impl Operation {
    /// Every operation in canonical order.
    pub const ALL: [Operation; 9] = [
        Operation::Add,
        Operation::Sub,
        Operation::Neg,
        Operation::Mul,
        Operation::Div,
        Operation::Mod,
        Operation::Invert,
        Operation::ScalarMultiply,
        Operation::Pair,
    ];

    /// Human label of this operation under the given notation.
    pub fn label(self, notation: Notation) -> &'static str {
        match (self, notation) {
            (Operation::Add, _) => "add",
            (Operation::Sub, _) => "sub",
            (Operation::Neg, _) => "neg",
            (Operation::Mul, _) => "mul",
            (Operation::Div, _) => "div",
            (Operation::Mod, _) => "mod",
            (Operation::Invert, _) => "inv",
            (Operation::ScalarMultiply, Notation::Additive) => "scalar-mul",
            (Operation::ScalarMultiply, Notation::Multiplicative) => "exp",
            (Operation::Pair, _) => "pair",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Notation::Additive))
    }
}

/// Whether a domain writes its group law additively or multiplicatively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    Additive,
    Multiplicative,
}

/// Identifies one domain inside one backend, e.g. `BN254/arkworks G1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainId {
    pub backend: String,
    pub name: String,
}

impl DomainId {
    pub fn new(backend: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.backend, self.name)
    }
}

/// Parameters that distinguish one backend configuration from another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainParameters {
    PairingCurve(BackendConfig),
    IntegerRing { bits: usize },
}

/// Static metadata used to label results. Carries no behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub name: String,
    pub library: String,
    pub parameters: DomainParameters,
}

impl BackendDescriptor {
    pub fn pairing(config: BackendConfig) -> Self {
        Self {
            name: format!("{}/{}", config.curve, config.backend),
            library: config.backend.library().to_owned(),
            parameters: DomainParameters::PairingCurve(config),
        }
    }

    pub fn integer_ring(bits: usize) -> Self {
        Self {
            name: format!("Z/pZ {bits}-bit"),
            library: "num-bigint".to_owned(),
            parameters: DomainParameters::IntegerRing { bits },
        }
    }

    /// The curve this backend measures, if it is a pairing backend.
    pub fn curve(&self) -> Option<CurveId> {
        match &self.parameters {
            DomainParameters::PairingCurve(config) => Some(config.curve),
            DomainParameters::IntegerRing { .. } => None,
        }
    }
}

impl fmt::Display for BackendDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameters {
            DomainParameters::PairingCurve(config) => {
                write!(f, "{} pairing curve via {}", config.curve, self.library)
            }
            DomainParameters::IntegerRing { bits } => {
                write!(f, "integer ring modulo a {bits}-bit prime via {}", self.library)
            }
        }
    }
}

/// Operand shapes shared by rings, fields and groups.
///
/// Every variant owns its values: operands are produced fresh for one trial
/// and dropped after it, never reused.
#[derive(Clone, Debug)]
pub enum Operands<E, S> {
    Unary(E),
    Binary(E, E),
    Scaled(E, S),
}

/// A structure whose elements can be drawn uniformly at random.
pub trait Samplable {
    type Element: Clone + Send;

    /// Draws one element from a cryptographically secure generator.
    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Self::Element;
}

/// Uniform operation contract every concrete structure is adapted to.
///
/// `operands` runs outside the timed window; `apply` is the only call a
/// timer brackets.
pub trait AlgebraicDomain: Send + Sync {
    /// One trial's worth of inputs for any supported operation.
    type Operands: Send;
    /// Result of an operation. Discarded by the caller.
    type Output;

    fn id(&self) -> &DomainId;

    fn notation(&self) -> Notation;

    /// Supported operations, in canonical order.
    fn operations(&self) -> &[Operation];

    /// Draws fresh operands for `operation`.
    fn operands(&self, operation: Operation, sampler: &RandomSampler)
    -> Result<Self::Operands, Error>;

    /// Runs `operation` once on `operands`.
    fn apply(&self, operation: Operation, operands: &Self::Operands) -> Result<Self::Output, Error>;

    fn supports(&self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}
