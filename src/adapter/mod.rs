//! Adapters from concrete algebraic structures to the harness.
//!
//! An [`AlgebraicBackend`] owns the domains of one configuration (every
//! group of a pairing curve, or one integer ring) and walks through a fixed
//! lifecycle:
//!
//! ```text
//! Uninitialized -> ParametersGenerated -> Ready -> Running -> Finalized
//! ```
//!
//! Parameter generation and base-point derivation happen before `Running`
//! and are never timed. A `Finalized` backend refuses further work; build a
//! new instance instead.

use serde::{Deserialize, Serialize};

use crate::config::{BackendConfig, BackendId, CurveId};
use crate::domain::{BackendDescriptor, DomainParameters};
use crate::errors::{BackendError, Error};
use crate::sampler::RandomSampler;
use crate::suite::BenchTarget;

mod integer;
pub use integer::*;

mod pairing;
pub use pairing::*;

#[cfg(test)]
pub(crate) mod mock;

/// Lifecycle position of an [`AlgebraicBackend`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendState {
    #[default]
    Uninitialized,
    ParametersGenerated,
    Ready,
    Running,
    Finalized,
}

/// Enforces the forward-only [`BackendState`] transitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lifecycle {
    state: BackendState,
}

impl Lifecycle {
    pub fn state(&self) -> BackendState {
        self.state
    }

    /// Runs `step` and moves to `to` if the transition is legal and `step`
    /// succeeds. On failure the state is left untouched.
    pub fn transition<T>(
        &mut self,
        to: BackendState,
        step: impl FnOnce() -> Result<T, Error>,
    ) -> Result<T, Error> {
        use BackendState::*;
        let legal = matches!(
            (self.state, to),
            (Uninitialized, ParametersGenerated) | (ParametersGenerated, Ready) | (Ready, Running)
        );
        if !legal {
            return Err(Error::InvalidState {
                from: self.state,
                to,
            });
        }
        let value = step()?;
        self.state = to;
        Ok(value)
    }

    /// Fails unless the backend is currently in `expected`.
    pub fn require(&self, expected: BackendState) -> Result<(), Error> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidState {
                from: self.state,
                to: expected,
            })
        }
    }

    pub fn finalize(&mut self) {
        self.state = BackendState::Finalized;
    }
}

/// One concrete algebraic configuration, adapted to the uniform contract.
pub trait AlgebraicBackend: Send {
    fn descriptor(&self) -> &BackendDescriptor;

    fn state(&self) -> BackendState;

    /// `Uninitialized -> ParametersGenerated`. May be expensive (prime search).
    fn generate_parameters(&mut self, sampler: &RandomSampler) -> Result<(), Error>;

    /// `ParametersGenerated -> Ready`. Derives generators and base points.
    fn prepare(&mut self, sampler: &RandomSampler) -> Result<(), Error>;

    /// `Ready -> Running`.
    fn start(&mut self) -> Result<(), Error>;

    /// Domains to measure, in reporting order. Only available while running.
    fn domains(&self) -> Result<Vec<&dyn BenchTarget>, Error>;

    /// Any state `-> Finalized`.
    fn finalize(&mut self);
}

/// A configuration that cannot be built; fails at parameter generation so it
/// still shows up in the report.
#[derive(Debug)]
pub struct UnsupportedBackend {
    descriptor: BackendDescriptor,
    reason: BackendError,
    lifecycle: Lifecycle,
}

impl UnsupportedBackend {
    pub fn new(descriptor: BackendDescriptor, reason: BackendError) -> Self {
        Self {
            descriptor,
            reason,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl AlgebraicBackend for UnsupportedBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn state(&self) -> BackendState {
        self.lifecycle.state()
    }

    fn generate_parameters(&mut self, _sampler: &RandomSampler) -> Result<(), Error> {
        let reason = self.reason.clone();
        self.lifecycle
            .transition(BackendState::ParametersGenerated, || {
                Err(Error::ParameterGeneration(reason))
            })
    }

    fn prepare(&mut self, _sampler: &RandomSampler) -> Result<(), Error> {
        self.lifecycle.transition(BackendState::Ready, || Ok(()))
    }

    fn start(&mut self) -> Result<(), Error> {
        self.lifecycle.transition(BackendState::Running, || Ok(()))
    }

    fn domains(&self) -> Result<Vec<&dyn BenchTarget>, Error> {
        self.lifecycle.require(BackendState::Running)?;
        Ok(Vec::new())
    }

    fn finalize(&mut self) {
        self.lifecycle.finalize();
    }
}

/// Builds a fresh, uninitialized backend for `parameters`.
pub fn instantiate(parameters: &DomainParameters) -> Box<dyn AlgebraicBackend> {
    match parameters {
        DomainParameters::IntegerRing { bits } => Box::new(IntegerRingBackend::new(*bits)),
        DomainParameters::PairingCurve(config) => pairing_backend(*config),
    }
}

fn pairing_backend(config: BackendConfig) -> Box<dyn AlgebraicBackend> {
    let descriptor = BackendDescriptor::pairing(config);
    if let Err(reason) = config.ensure_supported() {
        return Box::new(UnsupportedBackend::new(descriptor, reason));
    }
    match (config.backend, config.curve) {
        #[cfg(feature = "arkworks")]
        (BackendId::Arkworks, CurveId::Bn254) => {
            Box::new(PairingCurveBackend::<crate::backend::ArkworksBn254>::new(descriptor))
        }
        #[cfg(feature = "arkworks")]
        (BackendId::Arkworks, CurveId::Bls12_381) => {
            Box::new(PairingCurveBackend::<crate::backend::ArkworksBls12_381>::new(descriptor))
        }
        #[cfg(feature = "arkworks")]
        (BackendId::Arkworks, CurveId::Mnt4_298) => {
            Box::new(PairingCurveBackend::<crate::backend::ArkworksMnt4_298>::new(descriptor))
        }
        #[cfg(feature = "arkworks")]
        (BackendId::Arkworks, CurveId::Mnt6_298) => {
            Box::new(PairingCurveBackend::<crate::backend::ArkworksMnt6_298>::new(descriptor))
        }
        #[cfg(feature = "blst")]
        (BackendId::Blst, CurveId::Bls12_381) => {
            Box::new(PairingCurveBackend::<crate::backend::BlstBackend>::new(descriptor))
        }
        _ => Box::new(UnsupportedBackend::new(
            descriptor,
            BackendError::UnsupportedFeature("backend not compiled into this build"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut lifecycle = Lifecycle::default();
        assert!(lifecycle.transition(BackendState::Ready, || Ok(())).is_err());
        lifecycle
            .transition(BackendState::ParametersGenerated, || Ok(()))
            .expect("params");
        lifecycle.transition(BackendState::Ready, || Ok(())).expect("ready");
        lifecycle.transition(BackendState::Running, || Ok(())).expect("running");
        lifecycle.finalize();
        assert_eq!(
            lifecycle.transition(BackendState::Running, || Ok(())),
            Err(Error::InvalidState {
                from: BackendState::Finalized,
                to: BackendState::Running,
            })
        );
    }

    #[test]
    fn failed_step_keeps_state() {
        let mut lifecycle = Lifecycle::default();
        let result: Result<(), Error> = lifecycle.transition(BackendState::ParametersGenerated, || {
            Err(Error::ParameterGeneration(BackendError::Math("no prime")))
        });
        assert!(result.is_err());
        assert_eq!(lifecycle.state(), BackendState::Uninitialized);
    }

    #[test]
    fn unsupported_combination_fails_at_parameter_generation() {
        let config = BackendConfig::new(BackendId::Blst, CurveId::Bn254);
        let mut backend = instantiate(&DomainParameters::PairingCurve(config));
        assert_eq!(backend.descriptor().name, "BN254/blst");
        let err = backend
            .generate_parameters(&RandomSampler::new())
            .expect_err("blst has no BN254");
        assert!(matches!(
            err,
            Error::ParameterGeneration(BackendError::UnsupportedCurve(_))
        ));
    }
}
