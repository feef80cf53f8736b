//! The measurement loop: run every supported operation of every domain of a
//! backend a fixed number of times and reduce the timings to means.
//!
//! For each operation the loop repeats, `trials` times:
//!
//! 1. check the time budgets,
//! 2. draw fresh operands ([`AlgebraicDomain::operands`]),
//! 3. time exactly one [`AlgebraicDomain::apply`] call ([`OperationTimer`]),
//! 4. record the elapsed time ([`Accumulator`]).
//!
//! Failures are contained at the smallest sensible scope:
//!
//! - an operation error stops that operation only; trials completed before it
//!   are reported as a partial result,
//! - a budget expiry stops the operation the same way,
//! - a sampling failure stops the whole backend, since no later operand could
//!   be trusted either.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::accumulator::Accumulator;
use crate::adapter::AlgebraicBackend;
use crate::domain::{AlgebraicDomain, BackendDescriptor, DomainId, Notation, Operation};
use crate::errors::Error;
use crate::sampler::RandomSampler;
use crate::timer::OperationTimer;

/// Mean cost of one operation in one domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BenchmarkResult {
    pub domain: DomainId,
    pub operation: Operation,
    /// Trials actually recorded; always at least one.
    pub trials: u64,
    #[serde(rename = "mean_ns", serialize_with = "crate::serde_impl::nanos")]
    pub mean: Duration,
}

/// What happened to one operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationOutcome {
    Complete(BenchmarkResult),
    /// Stopped early; `result` covers the trials completed before `cause`.
    Partial {
        result: BenchmarkResult,
        requested: u64,
        #[serde(serialize_with = "crate::serde_impl::display")]
        cause: Error,
    },
    Failed {
        #[serde(serialize_with = "crate::serde_impl::display")]
        cause: Error,
    },
}

impl OperationOutcome {
    pub fn result(&self) -> Option<&BenchmarkResult> {
        match self {
            OperationOutcome::Complete(result) | OperationOutcome::Partial { result, .. } => {
                Some(result)
            }
            OperationOutcome::Failed { .. } => None,
        }
    }

    pub fn cause(&self) -> Option<&Error> {
        match self {
            OperationOutcome::Complete(_) => None,
            OperationOutcome::Partial { cause, .. } | OperationOutcome::Failed { cause } => {
                Some(cause)
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, OperationOutcome::Complete(_))
    }
}

/// Outcomes of every supported operation of one domain, keyed in canonical
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DomainReport {
    pub domain: DomainId,
    pub notation: Notation,
    pub outcomes: BTreeMap<Operation, OperationOutcome>,
}

impl DomainReport {
    /// The first failure that must stop the rest of the backend, if any.
    pub fn fatal(&self) -> Option<&Error> {
        self.outcomes
            .values()
            .filter_map(OperationOutcome::cause)
            .find(|cause| cause.is_fatal_to_backend())
    }
}

/// Everything measured for one backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BackendReport {
    pub descriptor: BackendDescriptor,
    /// Requested trials per operation.
    pub trials: u64,
    pub domains: Vec<DomainReport>,
    /// Set when the backend could not be set up or was aborted part way.
    #[serde(serialize_with = "crate::serde_impl::display_option")]
    pub failure: Option<Error>,
}

impl BackendReport {
    pub fn new(descriptor: BackendDescriptor, trials: u64) -> Self {
        Self {
            descriptor,
            trials,
            domains: Vec::new(),
            failure: None,
        }
    }

    /// Every result, complete or partial, in emission order.
    pub fn results(&self) -> impl Iterator<Item = &BenchmarkResult> {
        self.domains
            .iter()
            .flat_map(|d| d.outcomes.values())
            .filter_map(OperationOutcome::result)
    }
}

/// Object-safe view of a domain the suite can measure.
///
/// Implemented for every [`AlgebraicDomain`]; backends hand these out so the
/// suite can walk heterogeneous domains in one loop.
pub trait BenchTarget: Sync {
    fn domain_id(&self) -> &DomainId;

    /// Measures every supported operation.
    fn bench(&self, run: &TrialRun<'_>) -> DomainReport;

    /// Marks every supported operation as failed by `cause` without running it.
    fn skip(&self, cause: &Error) -> DomainReport;
}

impl<D: AlgebraicDomain> BenchTarget for D {
    fn domain_id(&self) -> &DomainId {
        self.id()
    }

    fn bench(&self, run: &TrialRun<'_>) -> DomainReport {
        run.measure(self)
    }

    fn skip(&self, cause: &Error) -> DomainReport {
        DomainReport {
            domain: self.id().clone(),
            notation: self.notation(),
            outcomes: self
                .operations()
                .iter()
                .map(|&op| (op, OperationOutcome::Failed { cause: cause.clone() }))
                .collect(),
        }
    }
}

/// Trial count and optional wall-clock budgets, applied to one backend at a
/// time.
#[derive(Clone, Copy, Debug)]
pub struct BenchmarkSuite {
    trials: u64,
    suite_budget: Option<Duration>,
    operation_budget: Option<Duration>,
    timer: OperationTimer,
}

impl BenchmarkSuite {
    /// A suite running `trials` trials per operation. `trials` must be positive.
    pub fn new(trials: u64) -> Result<Self, Error> {
        if trials == 0 {
            return Err(Error::InvalidConfig("trial count must be positive".to_owned()));
        }
        Ok(Self {
            trials,
            suite_budget: None,
            operation_budget: None,
            timer: OperationTimer,
        })
    }

    /// Caps the wall-clock time spent measuring one backend.
    pub fn with_suite_budget(mut self, budget: Option<Duration>) -> Self {
        self.suite_budget = budget;
        self
    }

    /// Caps the wall-clock time spent on any single operation.
    pub fn with_operation_budget(mut self, budget: Option<Duration>) -> Self {
        self.operation_budget = budget;
        self
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Sets up `backend`, measures all its domains and finalizes it.
    ///
    /// Never fails: every error ends up in the returned report. The backend is
    /// `Finalized` afterwards whatever happened.
    #[instrument(skip_all, fields(backend = %backend.descriptor().name, trials = self.trials))]
    pub fn run(&self, backend: &mut dyn AlgebraicBackend, sampler: &RandomSampler) -> BackendReport {
        let mut report = BackendReport::new(backend.descriptor().clone(), self.trials);

        let setup = backend
            .generate_parameters(sampler)
            .and_then(|()| backend.prepare(sampler))
            .and_then(|()| backend.start());
        if let Err(err) = setup {
            warn!(error = %err, "backend setup failed");
            report.failure = Some(err);
            backend.finalize();
            return report;
        }

        match backend.domains() {
            Ok(domains) => {
                let run = TrialRun {
                    suite: self,
                    sampler,
                    deadline: self.suite_budget.map(|budget| Instant::now() + budget),
                };
                for domain in domains {
                    if let Some(cause) = &report.failure {
                        report.domains.push(domain.skip(cause));
                        continue;
                    }
                    let domain_report = domain.bench(&run);
                    if let Some(fatal) = domain_report.fatal() {
                        warn!(domain = %domain_report.domain, error = %fatal, "aborting backend");
                        report.failure = Some(fatal.clone());
                    }
                    report.domains.push(domain_report);
                }
            }
            Err(err) => report.failure = Some(err),
        }

        backend.finalize();
        info!(domains = report.domains.len(), "backend finished");
        report
    }
}

/// One backend's measurement pass: the suite settings plus the shared sampler
/// and the suite deadline.
#[derive(Debug)]
pub struct TrialRun<'a> {
    suite: &'a BenchmarkSuite,
    sampler: &'a RandomSampler,
    deadline: Option<Instant>,
}

impl TrialRun<'_> {
    /// Measures every supported operation of `domain`, in canonical order.
    pub fn measure<D: AlgebraicDomain + ?Sized>(&self, domain: &D) -> DomainReport {
        let mut accumulator = Accumulator::new();
        let mut outcomes = BTreeMap::new();
        let mut fatal: Option<Error> = None;

        let mut operations = domain.operations().to_vec();
        operations.sort();
        for operation in operations {
            if let Some(cause) = &fatal {
                outcomes.insert(operation, OperationOutcome::Failed { cause: cause.clone() });
                continue;
            }
            let stop = self.trials(domain, operation, &mut accumulator);
            if let Some(cause) = stop.as_ref().filter(|cause| cause.is_fatal_to_backend()) {
                fatal = Some(cause.clone());
            }
            let outcome = self.outcome(domain.id(), operation, &accumulator, stop);
            debug!(domain = %domain.id(), %operation, complete = outcome.is_complete(), "operation done");
            outcomes.insert(operation, outcome);
        }

        DomainReport {
            domain: domain.id().clone(),
            notation: domain.notation(),
            outcomes,
        }
    }

    /// Runs the trials of one operation. Returns why it stopped early, if it did.
    fn trials<D: AlgebraicDomain + ?Sized>(
        &self,
        domain: &D,
        operation: Operation,
        accumulator: &mut Accumulator,
    ) -> Option<Error> {
        let operation_deadline = self
            .suite
            .operation_budget
            .map(|budget| Instant::now() + budget);

        for _ in 0..self.suite.trials {
            if let Some(budget) = self.expired(operation_deadline) {
                return Some(Error::Timeout {
                    budget,
                    completed: accumulator.count(operation),
                });
            }
            let operands = match domain.operands(operation, self.sampler) {
                Ok(operands) => operands,
                Err(err) => return Some(err),
            };
            match self.suite.timer.measure(domain, operation, &operands) {
                Ok((output, elapsed)) => {
                    drop(output);
                    accumulator.record(operation, elapsed);
                }
                Err(err) => return Some(err),
            }
        }
        None
    }

    /// The budget that has run out, if any.
    fn expired(&self, operation_deadline: Option<Instant>) -> Option<Duration> {
        let now = Instant::now();
        if self.deadline.is_some_and(|deadline| now >= deadline) {
            return self.suite.suite_budget;
        }
        if operation_deadline.is_some_and(|deadline| now >= deadline) {
            return self.suite.operation_budget;
        }
        None
    }

    fn outcome(
        &self,
        domain: &DomainId,
        operation: Operation,
        accumulator: &Accumulator,
        stop: Option<Error>,
    ) -> OperationOutcome {
        let mean = match accumulator.mean(operation) {
            Ok(mean) => mean,
            Err(no_samples) => {
                return OperationOutcome::Failed {
                    cause: stop.unwrap_or(no_samples),
                };
            }
        };
        let result = BenchmarkResult {
            domain: domain.clone(),
            operation,
            trials: accumulator.count(operation),
            mean,
        };
        match stop {
            None => OperationOutcome::Complete(result),
            Some(cause) => OperationOutcome::Partial {
                result,
                requested: self.suite.trials,
                cause,
            },
        }
    }
}
