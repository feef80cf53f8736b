//! Scriptable backend for exercising the suite without real arithmetic.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use rand_core::{CryptoRng, RngCore};

use super::{AlgebraicBackend, BackendState, Lifecycle};
use crate::domain::{
    AlgebraicDomain, BackendDescriptor, DomainId, DomainParameters, Notation, Operation, Samplable,
};
use crate::errors::{BackendError, Error};
use crate::sampler::RandomSampler;
use crate::suite::BenchTarget;

const MOCK_OPERATIONS: [Operation; 3] = [Operation::Add, Operation::Mul, Operation::ScalarMultiply];

/// Wrapping `u64` arithmetic that can be told to fail or stall.
pub(crate) struct MockDomain {
    id: DomainId,
    /// Fail `operation` on its n-th call (1-based).
    fail_on: Option<(Operation, u64)>,
    sleep_on: Option<(Operation, Duration)>,
    calls: Mutex<BTreeMap<Operation, u64>>,
}

impl MockDomain {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            id: DomainId::new("mock", name),
            fail_on: None,
            sleep_on: None,
            calls: Mutex::new(BTreeMap::new()),
        }
    }

    pub(crate) fn failing_on(mut self, operation: Operation, call: u64) -> Self {
        self.fail_on = Some((operation, call));
        self
    }

    pub(crate) fn sleeping_on(mut self, operation: Operation, delay: Duration) -> Self {
        self.sleep_on = Some((operation, delay));
        self
    }
}

impl Samplable for MockDomain {
    type Element = u64;

    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> u64 {
        rng.next_u64()
    }
}

impl AlgebraicDomain for MockDomain {
    type Operands = (u64, u64);
    type Output = u64;

    fn id(&self) -> &DomainId {
        &self.id
    }

    fn notation(&self) -> Notation {
        Notation::Additive
    }

    fn operations(&self) -> &[Operation] {
        &MOCK_OPERATIONS
    }

    fn operands(&self, _operation: Operation, sampler: &RandomSampler) -> Result<(u64, u64), Error> {
        Ok((sampler.sample(self)?, sampler.sample(self)?))
    }

    fn apply(&self, operation: Operation, &(a, b): &(u64, u64)) -> Result<u64, Error> {
        let call = {
            let mut calls = self.calls.lock().expect("calls lock");
            let count = calls.entry(operation).or_default();
            *count += 1;
            *count
        };
        if self.fail_on == Some((operation, call)) {
            return Err(Error::Operation {
                operation,
                source: BackendError::Math("injected failure"),
            });
        }
        if let Some((slow, delay)) = self.sleep_on {
            if slow == operation {
                std::thread::sleep(delay);
            }
        }
        Ok(match operation {
            Operation::Add => a.wrapping_add(b),
            Operation::Mul => a.wrapping_mul(b),
            _ => a.wrapping_pow((b % 64) as u32),
        })
    }
}

pub(crate) struct MockBackend {
    descriptor: BackendDescriptor,
    lifecycle: Lifecycle,
    domains: Vec<MockDomain>,
    fail_parameters: bool,
}

impl MockBackend {
    pub(crate) fn new(domains: Vec<MockDomain>) -> Self {
        Self::named("mock", domains)
    }

    pub(crate) fn named(name: &str, domains: Vec<MockDomain>) -> Self {
        Self {
            descriptor: BackendDescriptor {
                name: name.to_owned(),
                library: "mock".to_owned(),
                parameters: DomainParameters::IntegerRing { bits: 64 },
            },
            lifecycle: Lifecycle::default(),
            domains,
            fail_parameters: false,
        }
    }

    pub(crate) fn failing_parameters(mut self) -> Self {
        self.fail_parameters = true;
        self
    }
}

impl AlgebraicBackend for MockBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn state(&self) -> BackendState {
        self.lifecycle.state()
    }

    fn generate_parameters(&mut self, _sampler: &RandomSampler) -> Result<(), Error> {
        let fail = self.fail_parameters;
        self.lifecycle.transition(BackendState::ParametersGenerated, || {
            if fail {
                Err(Error::ParameterGeneration(BackendError::Math("injected failure")))
            } else {
                Ok(())
            }
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
        Ok(self.domains.iter().map(|d| d as &dyn BenchTarget).collect())
    }

    fn finalize(&mut self) {
        self.lifecycle.finalize();
    }
}
