//! Backend trait abstractions for pairing-friendly curves.
//!
//! This module defines the trait hierarchy that lets the harness measure
//! several cryptographic libraries (Arkworks, blstrs) through one interface.
//! The traits cover exactly the operations being measured: scalar field
//! arithmetic, curve group law, target group arithmetic and the pairing.
//!
//! # Architecture
//!
//! - **[`FieldElement`]**: scalar field Zr (add, sub, neg, mul, div, invert)
//! - **[`CurvePoint`]**: G1/G2 points (add, sub, neg, scalar multiplication)
//! - **[`TargetGroup`]**: the multiplicative group GT (mul, div, invert, exp)
//! - **[`PairingBackend`]**: umbrella trait tying the groups to the pairing
//!
//! # Available Backends
//!
//! | Feature | Type | Curve |
//! |---------|------|-------|
//! | `arkworks` | [`ArkworksBn254`] | BN254 |
//! | `arkworks` | [`ArkworksBls12_381`] | BLS12-381 |
//! | `arkworks` | [`ArkworksMnt4_298`] | MNT4-298 |
//! | `arkworks` | [`ArkworksMnt6_298`] | MNT6-298 |
//! | `blst` | [`BlstBackend`] | BLS12-381 |
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "blst")]
//! # {
//! use opcost::backend::{BlstBackend, CurvePoint, FieldElement, PairingBackend};
//! use rand::thread_rng;
//!
//! type Scalar = <BlstBackend as PairingBackend>::Scalar;
//! type G1 = <BlstBackend as PairingBackend>::G1;
//! type G2 = <BlstBackend as PairingBackend>::G2;
//!
//! let mut rng = thread_rng();
//! let p = G1::generator().mul_scalar(&Scalar::random(&mut rng));
//! let q = G2::generator();
//! let gt = BlstBackend::pairing(&p.to_affine(), &q.to_affine());
//! # }
//! ```

use core::fmt::Debug;

use rand_core::{CryptoRng, RngCore};

/// Scalar field (Zr) abstraction.
///
/// Elements are `Copy`: every operation returns a new value and never
/// mutates its inputs.
pub trait FieldElement: Copy + Clone + Send + Sync + Debug + 'static {
    /// Returns the additive identity (zero) element.
    fn zero() -> Self;

    /// Returns the multiplicative identity (one) element.
    fn one() -> Self;

    /// Generates a uniformly random field element.
    fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Self;

    fn is_zero(&self) -> bool;

    fn add(&self, other: &Self) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn negate(&self) -> Self;

    fn mul(&self, other: &Self) -> Self;

    /// Computes the multiplicative inverse, returning `None` for zero.
    fn invert(&self) -> Option<Self>;

    /// Computes `self / other`, returning `None` when `other` is zero.
    fn divide(&self, other: &Self) -> Option<Self> {
        other.invert().map(|inv| self.mul(&inv))
    }
}

/// Elliptic curve point abstraction for G1 and G2 groups.
///
/// Points live in projective coordinates; the affine form is what the
/// pairing consumes.
pub trait CurvePoint<F: FieldElement>: Copy + Clone + Send + Sync + Debug + 'static {
    /// Associated affine representation.
    type Affine: Copy + Clone + Debug + Send + Sync + 'static;

    /// Returns the point at infinity (identity element).
    fn identity() -> Self;

    /// Returns the standard generator for this group.
    fn generator() -> Self;

    /// Checks if this point is the identity element.
    fn is_identity(&self) -> bool;

    /// Converts from projective to affine coordinates.
    fn to_affine(&self) -> Self::Affine;

    /// Performs elliptic curve point addition.
    fn add(&self, other: &Self) -> Self;

    /// Performs elliptic curve point subtraction.
    fn sub(&self, other: &Self) -> Self;

    /// Returns the additive inverse of this point.
    fn negate(&self) -> Self;

    /// Performs scalar multiplication: returns `scalar * self`.
    fn mul_scalar(&self, scalar: &F) -> Self;
}

/// Pairing target group (GT) abstraction.
///
/// GT is a multiplicative subgroup of an extension field, so the group law
/// is written multiplicatively here even where the underlying library uses
/// additive notation.
pub trait TargetGroup: Copy + Clone + Send + Sync + Debug + 'static {
    /// Scalar field type for exponentiation.
    type Scalar: FieldElement;

    /// Returns the multiplicative identity element.
    fn identity() -> Self;

    fn is_identity(&self) -> bool;

    /// Combines (multiplies) two target group elements.
    fn combine(&self, other: &Self) -> Self;

    /// Multiplies by the inverse of `other`.
    fn divide(&self, other: &Self) -> Self;

    /// Returns the multiplicative inverse.
    fn inverse(&self) -> Self;

    /// Raises this element to the power `scalar`.
    fn pow(&self, scalar: &Self::Scalar) -> Self;
}

/// Main backend trait that ties the groups of one curve together.
///
/// # Example
///
/// ```rust,no_run
/// # #[cfg(feature = "arkworks")]
/// # {
/// use opcost::backend::{ArkworksBn254, CurvePoint, PairingBackend, TargetGroup};
///
/// type G1 = <ArkworksBn254 as PairingBackend>::G1;
/// type G2 = <ArkworksBn254 as PairingBackend>::G2;
///
/// let gt = ArkworksBn254::pairing(&G1::generator().to_affine(), &G2::generator().to_affine());
/// assert!(!gt.is_identity());
/// # }
/// ```
pub trait PairingBackend: Send + Sync + Debug + Sized + 'static {
    /// Scalar field type (Fr).
    type Scalar: FieldElement;
    /// First curve group (G1).
    type G1: CurvePoint<Self::Scalar>;
    /// Second curve group (G2).
    type G2: CurvePoint<Self::Scalar>;
    /// Pairing target group (GT).
    type Target: TargetGroup<Scalar = Self::Scalar>;

    /// Computes the bilinear pairing: `e(g1, g2) -> GT`.
    ///
    /// The pairing satisfies bilinearity: `e(a*P, b*Q) = e(P, Q)^(ab)`.
    fn pairing(
        g1: &<Self::G1 as CurvePoint<Self::Scalar>>::Affine,
        g2: &<Self::G2 as CurvePoint<Self::Scalar>>::Affine,
    ) -> Self::Target;
}

#[cfg(feature = "arkworks")]
mod arkworks;
#[cfg(feature = "blst")]
mod blst_bls12_381;

#[cfg(feature = "arkworks")]
pub use arkworks::*;
#[cfg(feature = "blst")]
pub use blst_bls12_381::*;
