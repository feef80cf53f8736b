//! Arithmetic in `Z/pZ` for a freshly generated prime `p`, on `num-bigint`.

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};

use super::{AlgebraicBackend, BackendState, Lifecycle};
use crate::domain::{
    AlgebraicDomain, BackendDescriptor, DomainId, Notation, Operands, Operation, Samplable,
};
use crate::errors::{BackendError, Error};
use crate::sampler::RandomSampler;
use crate::suite::BenchTarget;

/// Miller-Rabin rounds per candidate; error probability at most `4^-20`.
pub const MILLER_RABIN_ROUNDS: usize = 20;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

const RING_OPERATIONS: [Operation; 6] = [
    Operation::Add,
    Operation::Sub,
    Operation::Mul,
    Operation::Div,
    Operation::Mod,
    Operation::ScalarMultiply,
];

/// Probabilistic primality test: trial division by small primes, then
/// `rounds` Miller-Rabin witnesses drawn from `rng`.
pub fn is_probable_prime<R: RngCore + CryptoRng>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }
    for p in SMALL_PRIMES {
        if *n == BigUint::from(p) {
            return true;
        }
        if (n % p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    // n is odd and > 97, so n - 1 has at least one trailing zero
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Draws a random prime of exactly `bits` bits with its top two bits set.
pub fn random_prime<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<BigUint, BackendError> {
    if bits < 3 {
        return Err(BackendError::Math("prime bit length must be at least 3"));
    }
    let top = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2));
    // primes of this size have density ~1/(bits * ln 2); this cap is never hit in practice
    let max_candidates = 100 * bits;
    for _ in 0..max_candidates {
        let candidate = rng.gen_biguint(bits as u64) | &top | BigUint::one();
        if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, rng) {
            return Ok(candidate);
        }
    }
    Err(BackendError::Math("no prime found within the candidate limit"))
}

/// The ring of integers modulo a prime.
///
/// Elements are canonical residues in `[0, p)`. `Mod` is measured on the
/// unreduced product of two residues, and `ScalarMultiply` is modular
/// exponentiation (`exp`).
#[derive(Clone, Debug)]
pub struct IntegerRing {
    id: DomainId,
    modulus: BigInt,
}

impl IntegerRing {
    pub fn new(id: DomainId, modulus: BigUint) -> Self {
        Self {
            id,
            modulus: BigInt::from(modulus),
        }
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    fn random_nonzero<R: RngCore + CryptoRng>(&self, rng: &mut R) -> BigInt {
        rng.gen_bigint_range(&BigInt::one(), &self.modulus)
    }
}

impl Samplable for IntegerRing {
    type Element = BigInt;

    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> BigInt {
        rng.gen_bigint_range(&BigInt::zero(), &self.modulus)
    }
}

impl AlgebraicDomain for IntegerRing {
    type Operands = Operands<BigInt, BigInt>;
    type Output = BigInt;

    fn id(&self) -> &DomainId {
        &self.id
    }

    fn notation(&self) -> Notation {
        Notation::Multiplicative
    }

    fn operations(&self) -> &[Operation] {
        &RING_OPERATIONS
    }

    fn operands(&self, operation: Operation, sampler: &RandomSampler) -> Result<Self::Operands, Error> {
        let mut rng = sampler.rng()?;
        let a = self.random_element(&mut rng);
        let b = self.random_element(&mut rng);
        match operation {
            Operation::Add | Operation::Sub | Operation::Mul => Ok(Operands::Binary(a, b)),
            // divisor drawn from [1, p)
            Operation::Div => Ok(Operands::Binary(a, self.random_nonzero(&mut rng))),
            Operation::Mod => Ok(Operands::Unary(a * b)),
            Operation::ScalarMultiply => Ok(Operands::Scaled(a, b)),
            other => Err(unsupported(other)),
        }
    }

    fn apply(&self, operation: Operation, operands: &Self::Operands) -> Result<BigInt, Error> {
        match (operation, operands) {
            (Operation::Add, Operands::Binary(a, b)) => Ok(a + b),
            (Operation::Sub, Operands::Binary(a, b)) => Ok(a - b),
            (Operation::Mul, Operands::Binary(a, b)) => Ok(a * b),
            (Operation::Div, Operands::Binary(a, b)) => {
                if b.is_zero() {
                    return Err(Error::Operation {
                        operation,
                        source: BackendError::Math("division by zero"),
                    });
                }
                Ok(a / b)
            }
            (Operation::Mod, Operands::Unary(x)) => Ok(x.mod_floor(&self.modulus)),
            (Operation::ScalarMultiply, Operands::Scaled(base, exponent)) => {
                Ok(base.modpow(exponent, &self.modulus))
            }
            (other, _) => Err(unsupported(other)),
        }
    }
}

fn unsupported(operation: Operation) -> Error {
    Error::Operation {
        operation,
        source: BackendError::UnsupportedFeature("operation not defined on the integer ring"),
    }
}

/// Backend for one integer ring. The prime is generated at
/// [`AlgebraicBackend::generate_parameters`].
#[derive(Debug)]
pub struct IntegerRingBackend {
    descriptor: BackendDescriptor,
    bits: usize,
    lifecycle: Lifecycle,
    modulus: Option<BigUint>,
    ring: Option<IntegerRing>,
}

impl IntegerRingBackend {
    pub fn new(bits: usize) -> Self {
        Self {
            descriptor: BackendDescriptor::integer_ring(bits),
            bits,
            lifecycle: Lifecycle::default(),
            modulus: None,
            ring: None,
        }
    }

    /// The ring being measured, once prepared.
    pub fn ring(&self) -> Option<&IntegerRing> {
        self.ring.as_ref()
    }
}

impl AlgebraicBackend for IntegerRingBackend {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn state(&self) -> BackendState {
        self.lifecycle.state()
    }

    #[instrument(skip_all, fields(bits = self.bits))]
    fn generate_parameters(&mut self, sampler: &RandomSampler) -> Result<(), Error> {
        let bits = self.bits;
        let prime = self.lifecycle.transition(BackendState::ParametersGenerated, || {
            let mut rng = sampler.rng()?;
            Ok(random_prime(bits, &mut rng)?)
        })?;
        debug!(bits = prime.bits(), "generated modulus");
        self.modulus = Some(prime);
        Ok(())
    }

    fn prepare(&mut self, _sampler: &RandomSampler) -> Result<(), Error> {
        let id = DomainId::new(self.descriptor.name.clone(), "Zp");
        let modulus = self.modulus.take();
        let ring = self.lifecycle.transition(BackendState::Ready, || {
            modulus
                .map(|p| IntegerRing::new(id, p))
                .ok_or(Error::ParameterGeneration(BackendError::Other(
                    "modulus missing".to_owned(),
                )))
        })?;
        self.ring = Some(ring);
        Ok(())
    }

    fn start(&mut self) -> Result<(), Error> {
        self.lifecycle.transition(BackendState::Running, || Ok(()))
    }

    fn domains(&self) -> Result<Vec<&dyn BenchTarget>, Error> {
        self.lifecycle.require(BackendState::Running)?;
        Ok(self
            .ring
            .iter()
            .map(|ring| ring as &dyn BenchTarget)
            .collect())
    }

    fn finalize(&mut self) {
        self.lifecycle.finalize();
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn ring(modulus: u64) -> IntegerRing {
        IntegerRing::new(DomainId::new("test", "Zp"), BigUint::from(modulus))
    }

    #[test]
    fn recognises_known_primes() {
        let mut rng = StdRng::from_entropy();
        for p in [2u64, 3, 97, 101, 7919, 2_147_483_647, 18_446_744_073_709_551_557] {
            assert!(is_probable_prime(&BigUint::from(p), 20, &mut rng), "{p}");
        }
        // 561 is a Carmichael number; 2^32 + 1 = 641 * 6700417
        for c in [0u64, 1, 4, 561, 4_294_967_297, 2_147_483_649] {
            assert!(!is_probable_prime(&BigUint::from(c), 20, &mut rng), "{c}");
        }
    }

    #[test]
    fn generated_primes_have_requested_size() {
        let mut rng = StdRng::from_entropy();
        for bits in [8, 64, 256] {
            let p = random_prime(bits, &mut rng).expect("prime");
            assert_eq!(p.bits(), bits as u64);
            assert!(p.bit(bits as u64 - 2));
            assert!(is_probable_prime(&p, 20, &mut rng));
        }
        assert!(random_prime(2, &mut rng).is_err());
    }

    #[test]
    fn operations_reduce_correctly() {
        let ring = ring(101);
        let product = ring
            .apply(
                Operation::Mod,
                &Operands::Unary(BigInt::from(100) * BigInt::from(100)),
            )
            .expect("mod");
        assert_eq!(product, BigInt::from(1));
        let power = ring
            .apply(
                Operation::ScalarMultiply,
                &Operands::Scaled(BigInt::from(3), BigInt::from(100)),
            )
            .expect("exp");
        // Fermat: 3^(p-1) = 1 mod p
        assert_eq!(power, BigInt::one());
    }

    #[test]
    fn division_by_zero_is_an_operation_error() {
        let ring = ring(101);
        let err = ring
            .apply(
                Operation::Div,
                &Operands::Binary(BigInt::from(5), BigInt::zero()),
            )
            .expect_err("zero divisor");
        assert_eq!(
            err,
            Error::Operation {
                operation: Operation::Div,
                source: BackendError::Math("division by zero"),
            }
        );
    }

    #[test]
    fn samples_stay_below_modulus() {
        let ring = ring(13);
        let sampler = RandomSampler::new();
        for _ in 0..200 {
            let x = sampler.sample(&ring).expect("sample");
            assert!(x >= BigInt::zero() && x < *ring.modulus());
        }
        assert!(ring.operands(Operation::Pair, &sampler).is_err());
    }

    #[test]
    fn sampled_divisors_are_never_zero() {
        let ring = ring(2);
        let sampler = RandomSampler::new();
        for _ in 0..100 {
            let operands = ring.operands(Operation::Div, &sampler).expect("operands");
            assert!(matches!(&operands, Operands::Binary(_, b) if b.is_one()));
            ring.apply(Operation::Div, &operands).expect("quotient");
        }
    }

    #[test]
    fn backend_walks_through_lifecycle() {
        let sampler = RandomSampler::new();
        let mut backend = IntegerRingBackend::new(64);
        assert!(backend.domains().is_err());
        assert!(backend.prepare(&sampler).is_err());
        backend.generate_parameters(&sampler).expect("params");
        backend.prepare(&sampler).expect("prepare");
        assert_eq!(backend.ring().map(|r| r.modulus().bits()), Some(64));
        backend.start().expect("start");
        assert_eq!(backend.domains().expect("running").len(), 1);
        backend.finalize();
        assert_eq!(backend.state(), BackendState::Finalized);
        assert!(backend.start().is_err());
    }
}
