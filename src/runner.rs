//! Runs a list of backends and collects their reports in input order.

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::adapter::{AlgebraicBackend, instantiate};
use crate::config::BenchConfig;
use crate::domain::DomainParameters;
use crate::errors::Error;
use crate::sampler::RandomSampler;
use crate::suite::{BackendReport, BenchmarkSuite};

/// A backend paired with the suite that will measure it.
pub struct PlannedBackend {
    pub backend: Box<dyn AlgebraicBackend>,
    pub suite: BenchmarkSuite,
}

impl PlannedBackend {
    pub fn new(backend: Box<dyn AlgebraicBackend>, suite: BenchmarkSuite) -> Self {
        Self { backend, suite }
    }
}

/// Expands `config` into the backends to run: every configured curve first,
/// then the integer ring at each bit length, in the order given.
pub fn plan(config: &BenchConfig) -> Result<Vec<PlannedBackend>, Error> {
    config.validate()?;
    let suite = |trials| {
        BenchmarkSuite::new(trials).map(|suite| {
            suite
                .with_suite_budget(config.suite_budget)
                .with_operation_budget(config.operation_budget)
        })
    };
    let curve_suite = suite(config.trials)?;
    let integer_suite = suite(config.integer_trials)?;

    let curves = config.curves.iter().map(|&curve| {
        PlannedBackend::new(instantiate(&DomainParameters::PairingCurve(curve)), curve_suite)
    });
    let rings = config.integer_bit_lengths.iter().map(|&bits| {
        PlannedBackend::new(instantiate(&DomainParameters::IntegerRing { bits }), integer_suite)
    });
    Ok(curves.chain(rings).collect())
}

/// Drives every planned backend through its suite.
///
/// A failing backend is recorded in its own report and never stops the
/// others. Reports come back in plan order whether or not the run is
/// parallel.
#[derive(Clone, Debug, Default)]
pub struct SuiteRunner {
    sampler: RandomSampler,
    parallel: bool,
}

impl SuiteRunner {
    pub fn new(sampler: RandomSampler) -> Self {
        Self {
            sampler,
            parallel: false,
        }
    }

    /// Runs independent backends on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[instrument(skip_all, fields(backends = plan.len(), parallel = self.parallel))]
    pub fn run(&self, plan: Vec<PlannedBackend>) -> Vec<BackendReport> {
        let reports: Vec<_> = if self.parallel {
            plan.into_par_iter().map(|planned| self.run_one(planned)).collect()
        } else {
            plan.into_iter().map(|planned| self.run_one(planned)).collect()
        };
        let failed = reports.iter().filter(|r| r.failure.is_some()).count();
        info!(total = reports.len(), failed, "all suites finished");
        reports
    }

    fn run_one(&self, mut planned: PlannedBackend) -> BackendReport {
        planned.suite.run(planned.backend.as_mut(), &self.sampler)
    }
}
