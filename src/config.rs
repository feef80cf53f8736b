//! Configuration types for benchmark runs.
//!
//! This module provides the backend/curve selection types and the
//! [`BenchConfig`] run configuration: trial counts, the integer-ring bit
//! length sweep, the curves to measure and optional time budgets.
//!
//! # Example
//!
//! ```rust
//! use opcost::{BackendConfig, BackendId, BenchConfig, CurveId};
//!
//! let config = BenchConfig {
//!     trials: 1_000,
//!     curves: vec![BackendConfig::new(BackendId::Arkworks, CurveId::Bn254)],
//!     integer_bit_lengths: vec![256, 3072],
//!     ..BenchConfig::default()
//! };
//! config.validate().expect("valid config");
//! ```

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{BackendError, Error};
use crate::serde_impl::millis_option;

/// Largest trial count accepted per suite.
pub const MAX_TRIALS: u64 = 10_000_000;
/// Smallest integer-ring modulus, in bits.
pub const MIN_INTEGER_BITS: usize = 8;
/// Largest integer-ring modulus, in bits.
pub const MAX_INTEGER_BITS: usize = 8192;

/// Supported pairing-friendly elliptic curves.
///
/// - **BN254**: 254-bit Barreto-Naehrig curve (~100 bits of security).
/// - **BLS12-381**: ~128 bits of security.
/// - **MNT4-298 / MNT6-298**: Miyaji-Nakabayashi-Takano curves of embedding
///   degree 4 and 6 (the PBC "type D" family).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveId {
    Bn254,
    Bls12_381,
    Mnt4_298,
    Mnt6_298,
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurveId::Bn254 => "BN254",
            CurveId::Bls12_381 => "BLS12-381",
            CurveId::Mnt4_298 => "MNT4-298",
            CurveId::Mnt6_298 => "MNT6-298",
        })
    }
}

impl FromStr for CurveId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "bn254" => Ok(CurveId::Bn254),
            "bls12381" => Ok(CurveId::Bls12_381),
            "mnt4298" => Ok(CurveId::Mnt4_298),
            "mnt6298" => Ok(CurveId::Mnt6_298),
            _ => Err(Error::InvalidConfig(format!("unknown curve `{s}`"))),
        }
    }
}

/// Cryptographic library providing a pairing backend.
///
/// - **Arkworks**: pure Rust, supports every [`CurveId`].
/// - **blst**: assembly-optimized, BLS12-381 only.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendId {
    Arkworks,
    Blst,
}

impl BackendId {
    /// Name of the crate the backend is built on.
    pub fn library(self) -> &'static str {
        match self {
            BackendId::Arkworks => "arkworks",
            BackendId::Blst => "blstrs",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendId::Arkworks => "arkworks",
            BackendId::Blst => "blst",
        })
    }
}

impl FromStr for BackendId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ark" | "arkworks" => Ok(BackendId::Arkworks),
            "blst" | "blstrs" => Ok(BackendId::Blst),
            _ => Err(Error::InvalidConfig(format!("unknown backend `{s}`"))),
        }
    }
}

/// Backend and curve configuration.
///
/// Not all combinations are supported - use
/// [`ensure_supported`](BackendConfig::ensure_supported) to validate.
///
/// | Backend    | BN254 | BLS12-381 | MNT4-298 | MNT6-298 |
/// |------------|-------|-----------|----------|----------|
/// | Arkworks   | ✓     | ✓         | ✓        | ✓        |
/// | blst       | ✗     | ✓         | ✗        | ✗        |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BackendConfig {
    pub backend: BackendId,
    pub curve: CurveId,
}

impl BackendConfig {
    pub fn new(backend: BackendId, curve: CurveId) -> Self {
        Self { backend, curve }
    }

    /// Validates that this backend/curve combination is supported and that
    /// the Cargo feature it needs is compiled in.
    ///
    /// ```rust
    /// use opcost::{BackendConfig, BackendId, CurveId};
    ///
    /// let config = BackendConfig::new(BackendId::Blst, CurveId::Bn254);
    /// assert!(config.ensure_supported().is_err());
    /// ```
    pub fn ensure_supported(&self) -> Result<(), BackendError> {
        match (self.backend, self.curve) {
            (BackendId::Arkworks, _) => {
                if cfg!(feature = "arkworks") {
                    Ok(())
                } else {
                    Err(BackendError::UnsupportedFeature(
                        "compile with `arkworks` feature to use the Arkworks backends",
                    ))
                }
            }
            (BackendId::Blst, CurveId::Bls12_381) => {
                if cfg!(feature = "blst") {
                    Ok(())
                } else {
                    Err(BackendError::UnsupportedFeature(
                        "compile with `blst` feature to use the blstrs backend",
                    ))
                }
            }
            (BackendId::Blst, _) => Err(BackendError::UnsupportedCurve(
                "the blstrs backend only implements BLS12-381",
            )),
        }
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.backend, self.curve)
    }
}

/// Parses `backend:curve`, e.g. `arkworks:bn254` or `blst:bls12-381`.
impl FromStr for BackendConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (backend, curve) = s.split_once(':').ok_or_else(|| {
            Error::InvalidConfig(format!("expected `backend:curve`, got `{s}`"))
        })?;
        Ok(Self::new(backend.parse()?, curve.parse()?))
    }
}

/// Complete configuration of one benchmark run.
///
/// # Fields
///
/// - `trials`: trials per operation for pairing-curve suites
/// - `integer_trials`: trials per operation for integer-ring suites
/// - `integer_bit_lengths`: modulus sizes of the integer-ring sweep, in order
/// - `curves`: pairing backends to measure, in order
/// - `suite_budget`: optional wall-clock cap for one backend's suite
/// - `operation_budget`: optional wall-clock cap for one operation's trials
/// - `parallel`: run independent backends concurrently
///
/// # Timing caveat
///
/// With `parallel` set, suites compete for CPU cores, memory bandwidth and
/// frequency boost, so measured durations no longer reflect single-core cost.
/// The report order is unaffected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub trials: u64,
    pub integer_trials: u64,
    pub integer_bit_lengths: Vec<usize>,
    pub curves: Vec<BackendConfig>,
    #[serde(with = "millis_option")]
    pub suite_budget: Option<Duration>,
    #[serde(with = "millis_option")]
    pub operation_budget: Option<Duration>,
    pub parallel: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            integer_trials: 100_000,
            integer_bit_lengths: vec![64, 128, 256, 512, 1024, 2048, 3072, 4096],
            curves: vec![
                BackendConfig::new(BackendId::Arkworks, CurveId::Bn254),
                BackendConfig::new(BackendId::Arkworks, CurveId::Bls12_381),
                BackendConfig::new(BackendId::Blst, CurveId::Bls12_381),
                BackendConfig::new(BackendId::Arkworks, CurveId::Mnt4_298),
                BackendConfig::new(BackendId::Arkworks, CurveId::Mnt6_298),
            ],
            suite_budget: None,
            operation_budget: None,
            parallel: false,
        }
    }
}

impl BenchConfig {
    /// Checks trial counts, bit lengths and budgets.
    ///
    /// Backend/curve support is deliberately not checked here: an
    /// unsupported backend still appears in the report as a failure.
    pub fn validate(&self) -> Result<(), Error> {
        for (name, trials) in [("trials", self.trials), ("integer_trials", self.integer_trials)] {
            if trials == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be positive")));
            }
            if trials > MAX_TRIALS {
                return Err(Error::InvalidConfig(format!(
                    "{name} must not exceed {MAX_TRIALS}"
                )));
            }
        }
        if let Some(bits) = self
            .integer_bit_lengths
            .iter()
            .find(|bits| !(MIN_INTEGER_BITS..=MAX_INTEGER_BITS).contains(*bits))
        {
            return Err(Error::InvalidConfig(format!(
                "integer bit length {bits} outside [{MIN_INTEGER_BITS}, {MAX_INTEGER_BITS}]"
            )));
        }
        if self.suite_budget == Some(Duration::ZERO) || self.operation_budget == Some(Duration::ZERO)
        {
            return Err(Error::InvalidConfig("time budgets must be positive".into()));
        }
        if self.curves.is_empty() && self.integer_bit_lengths.is_empty() {
            return Err(Error::InvalidConfig("nothing to measure".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BenchConfig::default();
        config.validate().expect("default config");
        assert_eq!(config.integer_bit_lengths.len(), 8);
        assert_eq!(config.curves[0].curve, CurveId::Bn254);
    }

    #[test]
    fn rejects_zero_trials_and_bad_bits() {
        let config = BenchConfig {
            trials: 0,
            ..BenchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = BenchConfig {
            integer_bit_lengths: vec![64, 4],
            ..BenchConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = BenchConfig {
            suite_budget: Some(Duration::ZERO),
            ..BenchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_backend_config() {
        let config: BackendConfig = "blst:bls12-381".parse().expect("parse");
        assert_eq!(config, BackendConfig::new(BackendId::Blst, CurveId::Bls12_381));
        let config: BackendConfig = "ark:MNT6_298".parse().expect("parse");
        assert_eq!(config.curve, CurveId::Mnt6_298);
        assert!("arkworks".parse::<BackendConfig>().is_err());
        assert!("arkworks:secp256k1".parse::<BackendConfig>().is_err());
    }

    #[test]
    fn blst_only_supports_bls12_381() {
        assert_eq!(
            BackendConfig::new(BackendId::Blst, CurveId::Mnt4_298).ensure_supported(),
            Err(BackendError::UnsupportedCurve(
                "the blstrs backend only implements BLS12-381"
            ))
        );
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = BenchConfig {
            suite_budget: Some(Duration::from_millis(1500)),
            ..BenchConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(json.contains("\"suite_budget\":1500"));
        let back: BenchConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);

        let partial: BenchConfig = serde_json::from_str(r#"{"trials": 5}"#).expect("defaults");
        assert_eq!(partial.trials, 5);
        assert_eq!(partial.integer_trials, 100_000);
    }
}
