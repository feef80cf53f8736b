//! Arkworks-backed implementation, generic over any [`Pairing`] engine.
//!
//! The wrappers [`ArkScalar`], [`ArkG1`], [`ArkG2`] and [`ArkGt`] adapt the
//! arkworks field, curve and target-group types of an engine `E` to the
//! traits in [`crate::backend`]; [`ArkworksEngine<E>`] ties them together.
//! Concrete engines are exported as type aliases.
//!
//! # Feature
//!
//! Compiled when the Cargo feature `arkworks` is enabled.

use core::marker::PhantomData;

use ark_ec::pairing::{Pairing, PairingOutput};
use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::{Field, One, PrimeField, Zero};
use ark_std::UniformRand;
use rand_core::{CryptoRng, RngCore};

use crate::backend::{CurvePoint, FieldElement, PairingBackend, TargetGroup};

/// Scalar field element of engine `E`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArkScalar<E: Pairing>(pub E::ScalarField);

/// G1 element of engine `E`, in projective coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArkG1<E: Pairing>(pub E::G1);

/// G2 element of engine `E`, in projective coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArkG2<E: Pairing>(pub E::G2);

/// Target group element of engine `E`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArkGt<E: Pairing>(pub PairingOutput<E>);

impl<E: Pairing> FieldElement for ArkScalar<E> {
    fn zero() -> Self {
        ArkScalar(<E::ScalarField as Zero>::zero())
    }

    fn one() -> Self {
        ArkScalar(<E::ScalarField as One>::one())
    }

    fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        ArkScalar(<E::ScalarField as UniformRand>::rand(rng))
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn add(&self, other: &Self) -> Self {
        ArkScalar(self.0 + other.0)
    }

    fn sub(&self, other: &Self) -> Self {
        ArkScalar(self.0 - other.0)
    }

    fn negate(&self) -> Self {
        ArkScalar(-self.0)
    }

    fn mul(&self, other: &Self) -> Self {
        ArkScalar(self.0 * other.0)
    }

    fn invert(&self) -> Option<Self> {
        Field::inverse(&self.0).map(ArkScalar)
    }
}

macro_rules! impl_ark_curve_point {
    ($wrapper:ident, $group:ident, $affine:ident) => {
        impl<E: Pairing> CurvePoint<ArkScalar<E>> for $wrapper<E> {
            type Affine = E::$affine;

            fn identity() -> Self {
                $wrapper(E::$group::zero())
            }

            fn generator() -> Self {
                $wrapper(<E::$group as PrimeGroup>::generator())
            }

            fn is_identity(&self) -> bool {
                self.0.is_zero()
            }

            fn to_affine(&self) -> Self::Affine {
                self.0.into_affine()
            }

            fn add(&self, other: &Self) -> Self {
                $wrapper(self.0 + other.0)
            }

            fn sub(&self, other: &Self) -> Self {
                $wrapper(self.0 - other.0)
            }

            fn negate(&self) -> Self {
                $wrapper(-self.0)
            }

            fn mul_scalar(&self, scalar: &ArkScalar<E>) -> Self {
                $wrapper(self.0.mul_bigint(scalar.0.into_bigint()))
            }
        }
    };
}

impl_ark_curve_point!(ArkG1, G1, G1Affine);
impl_ark_curve_point!(ArkG2, G2, G2Affine);

// arkworks writes GT additively; translate to multiplicative names.
impl<E: Pairing> TargetGroup for ArkGt<E> {
    type Scalar = ArkScalar<E>;

    fn identity() -> Self {
        ArkGt(PairingOutput::<E>::zero())
    }

    fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    fn combine(&self, other: &Self) -> Self {
        ArkGt(self.0 + other.0)
    }

    fn divide(&self, other: &Self) -> Self {
        ArkGt(self.0 - other.0)
    }

    fn inverse(&self) -> Self {
        ArkGt(-self.0)
    }

    fn pow(&self, scalar: &Self::Scalar) -> Self {
        ArkGt(self.0.mul_bigint(scalar.0.into_bigint()))
    }
}

/// Arkworks pairing engine `E` exposed as a [`PairingBackend`].
#[derive(Debug)]
pub struct ArkworksEngine<E: Pairing>(PhantomData<E>);

impl<E: Pairing> PairingBackend for ArkworksEngine<E> {
    type Scalar = ArkScalar<E>;
    type G1 = ArkG1<E>;
    type G2 = ArkG2<E>;
    type Target = ArkGt<E>;

    fn pairing(g1: &E::G1Affine, g2: &E::G2Affine) -> Self::Target {
        ArkGt(E::pairing(*g1, *g2))
    }
}

/// BN254 via arkworks.
pub type ArkworksBn254 = ArkworksEngine<ark_bn254::Bn254>;
/// BLS12-381 via arkworks.
pub type ArkworksBls12_381 = ArkworksEngine<ark_bls12_381::Bls12_381>;
/// MNT4-298 via arkworks.
pub type ArkworksMnt4_298 = ArkworksEngine<ark_mnt4_298::MNT4_298>;
/// MNT6-298 via arkworks.
pub type ArkworksMnt6_298 = ArkworksEngine<ark_mnt6_298::MNT6_298>;
