//! Pairing-curve domains: the scalar field, G1, G2, GT and the pairing itself.
//!
//! All five domains of one curve share a [`PairingBackend`]. Curve parameters
//! are fixed by the library; what [`PairingCurveBackend::prepare`] randomizes
//! are the base points operands are derived from: `g1 = G1::generator() * r1`,
//! `g2 = G2::generator() * r2` and `gt = e(g1, g2)`. Every trial then draws
//! `base * s` for a fresh scalar `s`.

use std::marker::PhantomData;
use std::sync::Arc;

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};

use super::{AlgebraicBackend, BackendState, Lifecycle};
use crate::backend::{CurvePoint, FieldElement, PairingBackend, TargetGroup};
use crate::domain::{
    AlgebraicDomain, BackendDescriptor, DomainId, DomainParameters, Notation, Operands, Operation,
    Samplable,
};
use crate::errors::{BackendError, Error};
use crate::sampler::RandomSampler;
use crate::suite::BenchTarget;

type G1Affine<P> = <<P as PairingBackend>::G1 as CurvePoint<<P as PairingBackend>::Scalar>>::Affine;
type G2Affine<P> = <<P as PairingBackend>::G2 as CurvePoint<<P as PairingBackend>::Scalar>>::Affine;

const FIELD_OPERATIONS: [Operation; 6] = [
    Operation::Add,
    Operation::Sub,
    Operation::Neg,
    Operation::Mul,
    Operation::Div,
    Operation::Invert,
];

const CURVE_OPERATIONS: [Operation; 4] = [
    Operation::Add,
    Operation::Sub,
    Operation::Neg,
    Operation::ScalarMultiply,
];

const TARGET_OPERATIONS: [Operation; 4] = [
    Operation::Mul,
    Operation::Div,
    Operation::Invert,
    Operation::ScalarMultiply,
];

const PAIRING_OPERATIONS: [Operation; 1] = [Operation::Pair];

fn unsupported(operation: Operation) -> Error {
    Error::Operation {
        operation,
        source: BackendError::UnsupportedFeature("operation not defined on this domain"),
    }
}

/// The scalar field `Zr` of a pairing curve.
#[derive(Debug)]
pub struct ScalarField<P: PairingBackend> {
    id: DomainId,
    _backend: PhantomData<P>,
}

impl<P: PairingBackend> ScalarField<P> {
    pub fn new(id: DomainId) -> Self {
        Self {
            id,
            _backend: PhantomData,
        }
    }
}

impl<P: PairingBackend> Samplable for ScalarField<P> {
    type Element = P::Scalar;

    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> P::Scalar {
        P::Scalar::random(rng)
    }
}

impl<P: PairingBackend> AlgebraicDomain for ScalarField<P> {
    type Operands = Operands<P::Scalar, P::Scalar>;
    type Output = P::Scalar;

    fn id(&self) -> &DomainId {
        &self.id
    }

    fn notation(&self) -> Notation {
        Notation::Additive
    }

    fn operations(&self) -> &[Operation] {
        &FIELD_OPERATIONS
    }

    fn operands(&self, operation: Operation, sampler: &RandomSampler) -> Result<Self::Operands, Error> {
        let mut rng = sampler.rng()?;
        let a = self.random_element(&mut rng);
        match operation {
            Operation::Neg | Operation::Invert => Ok(Operands::Unary(a)),
            Operation::Add | Operation::Sub | Operation::Mul | Operation::Div => {
                Ok(Operands::Binary(a, self.random_element(&mut rng)))
            }
            other => Err(unsupported(other)),
        }
    }

    fn apply(&self, operation: Operation, operands: &Self::Operands) -> Result<P::Scalar, Error> {
        let by_zero = || Error::Operation {
            operation,
            source: BackendError::Math("inverse of zero"),
        };
        match (operation, operands) {
            (Operation::Add, Operands::Binary(a, b)) => Ok(a.add(b)),
            (Operation::Sub, Operands::Binary(a, b)) => Ok(a.sub(b)),
            (Operation::Neg, Operands::Unary(a)) => Ok(a.negate()),
            (Operation::Mul, Operands::Binary(a, b)) => Ok(a.mul(b)),
            (Operation::Div, Operands::Binary(a, b)) => a.divide(b).ok_or_else(by_zero),
            (Operation::Invert, Operands::Unary(a)) => a.invert().ok_or_else(by_zero),
            (other, _) => Err(unsupported(other)),
        }
    }
}

/// G1 or G2 of a pairing curve, written additively.
#[derive(Debug)]
pub struct CurveGroup<P: PairingBackend, C: CurvePoint<P::Scalar>> {
    id: DomainId,
    base: C,
    scalars: Arc<ScalarField<P>>,
}

impl<P: PairingBackend, C: CurvePoint<P::Scalar>> CurveGroup<P, C> {
    pub fn new(id: DomainId, base: C, scalars: Arc<ScalarField<P>>) -> Self {
        Self { id, base, scalars }
    }

    pub fn base(&self) -> &C {
        &self.base
    }
}

impl<P: PairingBackend, C: CurvePoint<P::Scalar>> Samplable for CurveGroup<P, C> {
    type Element = C;

    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> C {
        self.base.mul_scalar(&self.scalars.random_element(rng))
    }
}

impl<P: PairingBackend, C: CurvePoint<P::Scalar>> AlgebraicDomain for CurveGroup<P, C> {
    type Operands = Operands<C, P::Scalar>;
    type Output = C;

    fn id(&self) -> &DomainId {
        &self.id
    }

    fn notation(&self) -> Notation {
        Notation::Additive
    }

    fn operations(&self) -> &[Operation] {
        &CURVE_OPERATIONS
    }

    fn operands(&self, operation: Operation, sampler: &RandomSampler) -> Result<Self::Operands, Error> {
        let mut rng = sampler.rng()?;
        let p = self.random_element(&mut rng);
        match operation {
            Operation::Neg => Ok(Operands::Unary(p)),
            Operation::Add | Operation::Sub => Ok(Operands::Binary(p, self.random_element(&mut rng))),
            Operation::ScalarMultiply => {
                Ok(Operands::Scaled(p, self.scalars.random_element(&mut rng)))
            }
            other => Err(unsupported(other)),
        }
    }

    fn apply(&self, operation: Operation, operands: &Self::Operands) -> Result<C, Error> {
        match (operation, operands) {
            (Operation::Add, Operands::Binary(p, q)) => Ok(p.add(q)),
            (Operation::Sub, Operands::Binary(p, q)) => Ok(p.sub(q)),
            (Operation::Neg, Operands::Unary(p)) => Ok(p.negate()),
            (Operation::ScalarMultiply, Operands::Scaled(p, s)) => Ok(p.mul_scalar(s)),
            (other, _) => Err(unsupported(other)),
        }
    }
}

/// The pairing target group GT, written multiplicatively.
#[derive(Debug)]
pub struct TargetField<P: PairingBackend> {
    id: DomainId,
    base: P::Target,
    scalars: Arc<ScalarField<P>>,
}

impl<P: PairingBackend> TargetField<P> {
    pub fn new(id: DomainId, base: P::Target, scalars: Arc<ScalarField<P>>) -> Self {
        Self { id, base, scalars }
    }
}

impl<P: PairingBackend> Samplable for TargetField<P> {
    type Element = P::Target;

    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> P::Target {
        self.base.pow(&self.scalars.random_element(rng))
    }
}

impl<P: PairingBackend> AlgebraicDomain for TargetField<P> {
    type Operands = Operands<P::Target, P::Scalar>;
    type Output = P::Target;

    fn id(&self) -> &DomainId {
        &self.id
    }

    fn notation(&self) -> Notation {
        Notation::Multiplicative
    }

    fn operations(&self) -> &[Operation] {
        &TARGET_OPERATIONS
    }

    fn operands(&self, operation: Operation, sampler: &RandomSampler) -> Result<Self::Operands, Error> {
        let mut rng = sampler.rng()?;
        let x = self.random_element(&mut rng);
        match operation {
            Operation::Invert => Ok(Operands::Unary(x)),
            Operation::Mul | Operation::Div => Ok(Operands::Binary(x, self.random_element(&mut rng))),
            Operation::ScalarMultiply => {
                Ok(Operands::Scaled(x, self.scalars.random_element(&mut rng)))
            }
            other => Err(unsupported(other)),
        }
    }

    fn apply(&self, operation: Operation, operands: &Self::Operands) -> Result<P::Target, Error> {
        match (operation, operands) {
            (Operation::Mul, Operands::Binary(x, y)) => Ok(x.combine(y)),
            (Operation::Div, Operands::Binary(x, y)) => Ok(x.divide(y)),
            (Operation::Invert, Operands::Unary(x)) => Ok(x.inverse()),
            (Operation::ScalarMultiply, Operands::Scaled(x, s)) => Ok(x.pow(s)),
            (other, _) => Err(unsupported(other)),
        }
    }
}

/// The bilinear map `e: G1 x G2 -> GT`, on operands drawn from the curve's
/// own G1 and G2 domains.
#[derive(Debug)]
pub struct PairingMap<P: PairingBackend> {
    id: DomainId,
    g1: Arc<CurveGroup<P, P::G1>>,
    g2: Arc<CurveGroup<P, P::G2>>,
}

impl<P: PairingBackend> Samplable for PairingMap<P> {
    type Element = (G1Affine<P>, G2Affine<P>);

    fn random_element<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Self::Element {
        (
            self.g1.random_element(rng).to_affine(),
            self.g2.random_element(rng).to_affine(),
        )
    }
}

impl<P: PairingBackend> AlgebraicDomain for PairingMap<P> {
    type Operands = (G1Affine<P>, G2Affine<P>);
    type Output = P::Target;

    fn id(&self) -> &DomainId {
        &self.id
    }

    fn notation(&self) -> Notation {
        Notation::Multiplicative
    }

    fn operations(&self) -> &[Operation] {
        &PAIRING_OPERATIONS
    }

    fn operands(&self, operation: Operation, sampler: &RandomSampler) -> Result<Self::Operands, Error> {
        match operation {
            Operation::Pair => sampler.sample(self),
            other => Err(unsupported(other)),
        }
    }

    fn apply(&self, operation: Operation, operands: &Self::Operands) -> Result<P::Target, Error> {
        match operation {
            Operation::Pair => Ok(P::pairing(&operands.0, &operands.1)),
            other => Err(unsupported(other)),
        }
    }
}

#[derive(Debug)]
struct CurveDomains<P: PairingBackend> {
    scalars: Arc<ScalarField<P>>,
    g1: Arc<CurveGroup<P, P::G1>>,
    g2: Arc<CurveGroup<P, P::G2>>,
    gt: TargetField<P>,
    pairing: PairingMap<P>,
}

/// All domains of one pairing curve as implemented by backend `P`.
#[derive(Debug)]
pub struct PairingCurveBackend<P: PairingBackend> {
    descriptor: BackendDescriptor,
    lifecycle: Lifecycle,
    domains: Option<CurveDomains<P>>,
}

impl<P: PairingBackend> PairingCurveBackend<P> {
    pub fn new(descriptor: BackendDescriptor) -> Self {
        Self {
            descriptor,
            lifecycle: Lifecycle::default(),
            domains: None,
        }
    }

    fn domain_id(&self, name: &str) -> DomainId {
        DomainId::new(self.descriptor.name.clone(), name)
    }
}

impl<P: PairingBackend> AlgebraicBackend for PairingCurveBackend<P> {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn state(&self) -> BackendState {
        self.lifecycle.state()
    }

    fn generate_parameters(&mut self, _sampler: &RandomSampler) -> Result<(), Error> {
        let parameters = &self.descriptor.parameters;
        self.lifecycle.transition(BackendState::ParametersGenerated, || match parameters {
            DomainParameters::PairingCurve(config) => Ok(config.ensure_supported()?),
            DomainParameters::IntegerRing { .. } => Err(Error::ParameterGeneration(
                BackendError::UnsupportedFeature("not a pairing curve"),
            )),
        })
    }

    #[instrument(skip_all, fields(backend = %self.descriptor.name))]
    fn prepare(&mut self, sampler: &RandomSampler) -> Result<(), Error> {
        let scalars = Arc::new(ScalarField::<P>::new(self.domain_id("Zr")));
        let ids = [
            self.domain_id("G1"),
            self.domain_id("G2"),
            self.domain_id("GT"),
            self.domain_id("pairing"),
        ];
        let domains = self.lifecycle.transition(BackendState::Ready, || {
            let [g1_id, g2_id, gt_id, pairing_id] = ids;
            let g1 = P::G1::generator().mul_scalar(&sampler.sample(&*scalars)?);
            let g2 = P::G2::generator().mul_scalar(&sampler.sample(&*scalars)?);
            let gt = P::pairing(&g1.to_affine(), &g2.to_affine());
            if g1.is_identity() || g2.is_identity() || gt.is_identity() {
                return Err(Error::ParameterGeneration(BackendError::Math(
                    "degenerate base point",
                )));
            }
            let g1 = Arc::new(CurveGroup::new(g1_id, g1, scalars.clone()));
            let g2 = Arc::new(CurveGroup::new(g2_id, g2, scalars.clone()));
            Ok(CurveDomains {
                gt: TargetField::new(gt_id, gt, scalars.clone()),
                pairing: PairingMap {
                    id: pairing_id,
                    g1: g1.clone(),
                    g2: g2.clone(),
                },
                scalars,
                g1,
                g2,
            })
        })?;
        debug!("derived randomized base points");
        self.domains = Some(domains);
        Ok(())
    }

    fn start(&mut self) -> Result<(), Error> {
        self.lifecycle.transition(BackendState::Running, || Ok(()))
    }

    fn domains(&self) -> Result<Vec<&dyn BenchTarget>, Error> {
        self.lifecycle.require(BackendState::Running)?;
        Ok(match &self.domains {
            Some(d) => vec![&*d.scalars as &dyn BenchTarget, &*d.g1, &*d.g2, &d.gt, &d.pairing],
            None => Vec::new(),
        })
    }

    fn finalize(&mut self) {
        self.lifecycle.finalize();
    }
}

#[cfg(all(test, feature = "arkworks"))]
mod tests {
    use super::*;
    use crate::backend::ArkworksBn254;
    use crate::config::{BackendConfig, BackendId, CurveId};
    use crate::suite::{BenchmarkSuite, OperationOutcome};

    fn ready_backend() -> PairingCurveBackend<ArkworksBn254> {
        let sampler = RandomSampler::new();
        let config = BackendConfig::new(BackendId::Arkworks, CurveId::Bn254);
        let mut backend = PairingCurveBackend::new(BackendDescriptor::pairing(config));
        backend.generate_parameters(&sampler).expect("params");
        backend.prepare(&sampler).expect("prepare");
        backend.start().expect("start");
        backend
    }

    #[test]
    fn exposes_five_domains_in_order() {
        let backend = ready_backend();
        let names: Vec<_> = backend
            .domains()
            .expect("running")
            .iter()
            .map(|d| d.domain_id().name.clone())
            .collect();
        assert_eq!(names, ["Zr", "G1", "G2", "GT", "pairing"]);
    }

    #[test]
    fn base_points_are_randomized() {
        let a = ready_backend();
        let b = ready_backend();
        let (a, b) = (a.domains.expect("prepared"), b.domains.expect("prepared"));
        assert_ne!(a.g1.base(), b.g1.base());
    }

    #[test]
    fn field_division_by_zero_fails() {
        type Scalar = <ArkworksBn254 as PairingBackend>::Scalar;
        let field = ScalarField::<ArkworksBn254>::new(DomainId::new("t", "Zr"));
        let err = field
            .apply(
                Operation::Div,
                &Operands::Binary(Scalar::one(), Scalar::zero()),
            )
            .expect_err("zero");
        assert!(matches!(err, Error::Operation { operation: Operation::Div, .. }));
    }

    #[test]
    fn pairing_is_bilinear_on_randomized_bases() {
        let backend = ready_backend();
        let domains = backend.domains.as_ref().expect("prepared");
        let sampler = RandomSampler::new();
        let a = sampler.sample(&*domains.scalars).expect("a");
        let b = sampler.sample(&*domains.scalars).expect("b");
        let p = domains.g1.base().mul_scalar(&a).to_affine();
        let q = domains.g2.base().mul_scalar(&b).to_affine();
        let lhs = domains.pairing.apply(Operation::Pair, &(p, q)).expect("pair");
        let rhs = domains.gt.base.pow(&a.mul(&b));
        assert!(!lhs.is_identity());
        assert!(lhs.divide(&rhs).is_identity());
        assert!(domains.gt.operands(Operation::Add, &sampler).is_err());
    }

    #[test]
    fn suite_measures_every_curve_operation() {
        let sampler = RandomSampler::new();
        let config = BackendConfig::new(BackendId::Arkworks, CurveId::Bn254);
        let mut backend =
            PairingCurveBackend::<ArkworksBn254>::new(BackendDescriptor::pairing(config));
        let report = BenchmarkSuite::new(3).expect("suite").run(&mut backend, &sampler);
        assert_eq!(report.failure, None);

        let layout: Vec<(String, Vec<Operation>)> = report
            .domains
            .iter()
            .map(|d| (d.domain.name.clone(), d.outcomes.keys().copied().collect()))
            .collect();
        let expected: Vec<(String, Vec<Operation>)> = [
            ("Zr", FIELD_OPERATIONS.to_vec()),
            ("G1", CURVE_OPERATIONS.to_vec()),
            ("G2", CURVE_OPERATIONS.to_vec()),
            ("GT", TARGET_OPERATIONS.to_vec()),
            ("pairing", PAIRING_OPERATIONS.to_vec()),
        ]
        .into_iter()
        .map(|(name, ops)| (name.to_owned(), ops))
        .collect();
        assert_eq!(layout, expected);

        for domain in &report.domains {
            for (op, outcome) in &domain.outcomes {
                assert!(
                    matches!(outcome, OperationOutcome::Complete(r) if r.trials == 3),
                    "{} {op:?}: {outcome:?}",
                    domain.domain.name
                );
            }
        }
        assert_eq!(backend.state(), BackendState::Finalized);
    }
}
