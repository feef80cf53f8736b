//! Per-operation duration sums.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::Operation;
use crate::errors::Error;

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    nanos: u128,
    count: u64,
}

/// Sums elapsed durations per operation and derives the mean once, at the end.
///
/// Sums are kept as integer nanoseconds in a `u128`, which holds ~10^22
/// years: 10^7 trials of multi-second calls are nowhere near the limit and no
/// precision is lost before the single final division.
#[derive(Clone, Debug, Default)]
pub struct Accumulator {
    tallies: BTreeMap<Operation, Tally>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, operation: Operation, elapsed: Duration) {
        let tally = self.tallies.entry(operation).or_default();
        tally.nanos += elapsed.as_nanos();
        tally.count += 1;
    }

    /// Number of durations recorded for `operation`.
    pub fn count(&self, operation: Operation) -> u64 {
        self.tallies.get(&operation).map_or(0, |t| t.count)
    }

    /// Sum of the durations recorded for `operation`.
    pub fn total(&self, operation: Operation) -> Duration {
        self.tallies
            .get(&operation)
            .map_or(Duration::ZERO, |t| nanos_to_duration(t.nanos))
    }

    /// Mean recorded duration, or [`Error::NoSamples`] if nothing was recorded.
    pub fn mean(&self, operation: Operation) -> Result<Duration, Error> {
        match self.tallies.get(&operation) {
            Some(tally) if tally.count > 0 => {
                Ok(nanos_to_duration(tally.nanos / u128::from(tally.count)))
            }
            _ => Err(Error::NoSamples(operation)),
        }
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    // remainder is below 10^9
    Duration::new(secs, (nanos % NANOS_PER_SEC) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_without_samples_is_an_error() {
        let mut acc = Accumulator::new();
        acc.record(Operation::Add, Duration::from_nanos(10));
        assert_eq!(acc.mean(Operation::Pair), Err(Error::NoSamples(Operation::Pair)));
        assert_eq!(acc.count(Operation::Pair), 0);
    }

    #[test]
    fn mean_is_integer_division_of_sum() {
        let mut acc = Accumulator::new();
        for nanos in [10, 20, 31] {
            acc.record(Operation::Mul, Duration::from_nanos(nanos));
        }
        assert_eq!(acc.count(Operation::Mul), 3);
        assert_eq!(acc.total(Operation::Mul), Duration::from_nanos(61));
        assert_eq!(acc.mean(Operation::Mul), Ok(Duration::from_nanos(20)));
    }

    #[test]
    fn large_sums_do_not_lose_precision() {
        let mut acc = Accumulator::new();
        // 100_000 trials of 4.000001 ms
        let trial = Duration::new(0, 4_000_001);
        for _ in 0..100_000 {
            acc.record(Operation::ScalarMultiply, trial);
        }
        assert_eq!(acc.total(Operation::ScalarMultiply), Duration::new(400, 100_000));
        assert_eq!(acc.mean(Operation::ScalarMultiply), Ok(trial));
    }
}
