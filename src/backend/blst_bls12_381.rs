//! blst-backed concrete implementation for BLS12-381 operations.
//!
//! Implements [`FieldElement`], [`CurvePoint`], [`TargetGroup`] and
//! [`PairingBackend`] directly on the `blstrs` types.
//!
//! # Feature
//!
//! Compiled when the Cargo feature `blst` is enabled.

use blstrs::{G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};
use ff::Field;
use group::{Curve, Group};
use rand_core::{CryptoRng, RngCore};

use crate::backend::{CurvePoint, FieldElement, PairingBackend, TargetGroup};

impl FieldElement for Scalar {
    fn zero() -> Self {
        Scalar::ZERO
    }

    fn one() -> Self {
        Scalar::ONE
    }

    fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self {
        <Scalar as Field>::random(rng)
    }

    fn is_zero(&self) -> bool {
        Field::is_zero(self).into()
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    fn sub(&self, other: &Self) -> Self {
        *self - *other
    }

    fn negate(&self) -> Self {
        -*self
    }

    fn mul(&self, other: &Self) -> Self {
        *self * *other
    }

    fn invert(&self) -> Option<Self> {
        Field::invert(self).into()
    }
}

impl CurvePoint<Scalar> for G1Projective {
    type Affine = G1Affine;

    fn identity() -> Self {
        <G1Projective as Group>::identity()
    }

    fn generator() -> Self {
        <G1Projective as Group>::generator()
    }

    fn is_identity(&self) -> bool {
        <Self as Group>::is_identity(self).into()
    }

    fn to_affine(&self) -> Self::Affine {
        Curve::to_affine(self)
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    fn sub(&self, other: &Self) -> Self {
        *self - *other
    }

    fn negate(&self) -> Self {
        -*self
    }

    fn mul_scalar(&self, scalar: &Scalar) -> Self {
        *self * *scalar
    }
}

impl CurvePoint<Scalar> for G2Projective {
    type Affine = G2Affine;

    fn identity() -> Self {
        <G2Projective as Group>::identity()
    }

    fn generator() -> Self {
        <G2Projective as Group>::generator()
    }

    fn is_identity(&self) -> bool {
        <Self as Group>::is_identity(self).into()
    }

    fn to_affine(&self) -> Self::Affine {
        Curve::to_affine(self)
    }

    fn add(&self, other: &Self) -> Self {
        *self + *other
    }

    fn sub(&self, other: &Self) -> Self {
        *self - *other
    }

    fn negate(&self) -> Self {
        -*self
    }

    fn mul_scalar(&self, scalar: &Scalar) -> Self {
        *self * *scalar
    }
}

// blstrs writes GT additively; translate to multiplicative names.
impl TargetGroup for Gt {
    type Scalar = Scalar;

    fn identity() -> Self {
        <Gt as Group>::identity()
    }

    fn is_identity(&self) -> bool {
        <Gt as Group>::is_identity(self).into()
    }

    fn combine(&self, other: &Self) -> Self {
        *self + *other
    }

    fn divide(&self, other: &Self) -> Self {
        *self - *other
    }

    fn inverse(&self) -> Self {
        -*self
    }

    fn pow(&self, scalar: &Self::Scalar) -> Self {
        *self * *scalar
    }
}

/// blst-backed `PairingBackend` implementation for BLS12-381.
#[derive(Debug)]
pub struct BlstBackend;

impl PairingBackend for BlstBackend {
    type Scalar = Scalar;
    type G1 = G1Projective;
    type G2 = G2Projective;
    type Target = Gt;

    fn pairing(g1: &G1Affine, g2: &G2Affine) -> Self::Target {
        blstrs::pairing(g1, g2)
    }
}
