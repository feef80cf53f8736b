//! Cryptographically secure sampling of domain elements.
//!
//! [`RandomSampler`] draws fresh entropy from an [`EntropySource`] (the
//! operating system by default), seeds a ChaCha-based [`StdRng`] with it and
//! hands that generator to the domain's own random-element procedure. Every
//! sample gets its own seed, so no generator state is shared between trials
//! or between concurrently running suites.
//!
//! A source that reports an error is retried a bounded number of times; after
//! that the sampler fails with [`Error::Sampling`].

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use rand_core::{OsRng, RngCore};
use tracing::warn;

use crate::domain::Samplable;
use crate::errors::Error;

/// Attempts made against a failing entropy source before giving up.
pub const DEFAULT_ENTROPY_ATTEMPTS: usize = 3;

/// A source of true randomness, safe to share between threads.
pub trait EntropySource: Send + Sync {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand_core::Error>;
}

/// The operating system's randomness (`getrandom`).
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Draws uniformly distributed elements of any [`Samplable`] domain.
#[derive(Clone)]
pub struct RandomSampler {
    source: Arc<dyn EntropySource>,
    attempts: usize,
}

impl core::fmt::Debug for RandomSampler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RandomSampler")
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSampler {
    /// Sampler backed by the operating system.
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsEntropy))
    }

    pub fn with_source(source: Arc<dyn EntropySource>) -> Self {
        Self {
            source,
            attempts: DEFAULT_ENTROPY_ATTEMPTS,
        }
    }

    /// Overrides how many times a failing source is asked before giving up.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Checks that entropy can be obtained at all.
    pub fn probe(&self) -> Result<(), Error> {
        self.seed().map(|_| ())
    }

    /// A fresh generator seeded from the entropy source.
    pub fn rng(&self) -> Result<StdRng, Error> {
        Ok(StdRng::from_seed(self.seed()?))
    }

    /// Draws one element of `domain`.
    pub fn sample<D: Samplable + ?Sized>(&self, domain: &D) -> Result<D::Element, Error> {
        let mut rng = self.rng()?;
        Ok(domain.random_element(&mut rng))
    }

    fn seed(&self) -> Result<<StdRng as SeedableRng>::Seed, Error> {
        let mut seed = <StdRng as SeedableRng>::Seed::default();
        let mut last_error = None;
        for attempt in 1..=self.attempts {
            match self.source.try_fill(seed.as_mut()) {
                Ok(()) => return Ok(seed),
                Err(err) => {
                    warn!(attempt, error = %err, "entropy source failed, retrying");
                    last_error = Some(err.to_string());
                }
            }
        }
        Err(Error::Sampling(
            last_error.unwrap_or_else(|| "no attempts made".to_owned()),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::num::NonZeroU32;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand_core::CryptoRng;

    use super::*;

    /// Fails the first `failures` requests, then delegates to the OS.
    pub(crate) struct FlakyEntropy {
        pub failures: usize,
        pub calls: AtomicUsize,
    }

    impl FlakyEntropy {
        pub(crate) fn new(failures: usize) -> Self {
            Self {
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EntropySource for FlakyEntropy {
        fn try_fill(&self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                let code = NonZeroU32::new(rand_core::Error::CUSTOM_START).expect("non-zero");
                return Err(rand_core::Error::from(code));
            }
            OsEntropy.try_fill(dest)
        }
    }

    struct Bytes;

    impl Samplable for Bytes {
        type Element = [u8; 16];

        fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Self::Element {
            let mut out = [0u8; 16];
            rng.fill_bytes(&mut out);
            out
        }
    }

    #[test]
    fn samples_differ() {
        let sampler = RandomSampler::new();
        let a = sampler.sample(&Bytes).expect("sample");
        let b = sampler.sample(&Bytes).expect("sample");
        assert_ne!(a, b);
    }

    #[test]
    fn retries_transient_failures() {
        let source = Arc::new(FlakyEntropy::new(2));
        let sampler = RandomSampler::with_source(source.clone());
        sampler.sample(&Bytes).expect("third attempt succeeds");
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn exhausted_source_is_a_sampling_error() {
        let sampler = RandomSampler::with_source(Arc::new(FlakyEntropy::new(usize::MAX)));
        assert!(matches!(sampler.sample(&Bytes), Err(Error::Sampling(_))));
        assert!(matches!(sampler.probe(), Err(Error::Sampling(_))));
    }

    #[test]
    fn sampler_is_shareable_across_threads() {
        let sampler = RandomSampler::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sampler = sampler.clone();
                std::thread::spawn(move || sampler.sample(&Bytes).expect("sample"))
            })
            .collect();
        let samples: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();
        assert_ne!(samples[0], samples[1]);
    }
}
