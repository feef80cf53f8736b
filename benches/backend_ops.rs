use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use num_bigint::{BigInt, RandBigInt};
use num_traits::Zero;
use opcost::adapter::random_prime;
use opcost::backend::{CurvePoint, FieldElement, PairingBackend, TargetGroup};
use rand::{SeedableRng, rngs::StdRng};

// Cross-check for the harness's own numbers on a few representative operations.
fn bench_backend<B: PairingBackend>(c: &mut Criterion, name: &str) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = B::Scalar::random(&mut rng);
    let b = B::Scalar::random(&mut rng);
    let p = B::G1::generator().mul_scalar(&a);
    let q = B::G2::generator().mul_scalar(&b);
    let (p_affine, q_affine) = (p.to_affine(), q.to_affine());
    let gt = B::pairing(&p_affine, &q_affine);

    let mut group = c.benchmark_group(name);
    group.bench_function("zr_mul", |bench| bench.iter(|| black_box(&a).mul(black_box(&b))));
    group.bench_function("zr_inv", |bench| bench.iter(|| black_box(&a).invert()));
    group.bench_function("g1_scalar_mul", |bench| {
        bench.iter(|| black_box(&p).mul_scalar(black_box(&b)))
    });
    group.bench_function("g2_scalar_mul", |bench| {
        bench.iter(|| black_box(&q).mul_scalar(black_box(&a)))
    });
    group.bench_function("gt_exp", |bench| bench.iter(|| black_box(&gt).pow(black_box(&a))));
    group.bench_function("pair", |bench| {
        bench.iter(|| B::pairing(black_box(&p_affine), black_box(&q_affine)))
    });
    group.finish();
}

fn bench_modexp(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut group = c.benchmark_group("integer_ring/modexp");
    for bits in [256usize, 1024, 3072] {
        let p = BigInt::from(random_prime(bits, &mut rng).expect("prime"));
        let base = rng.gen_bigint_range(&BigInt::zero(), &p);
        let exponent = rng.gen_bigint_range(&BigInt::zero(), &p);
        group.bench_with_input(BenchmarkId::from_parameter(bits), &bits, |bench, _| {
            bench.iter(|| black_box(&base).modpow(black_box(&exponent), &p))
        });
    }
    group.finish();
}

fn criterion_benches(c: &mut Criterion) {
    #[cfg(feature = "arkworks")]
    {
        bench_backend::<opcost::backend::ArkworksBn254>(c, "arkworks/bn254");
        bench_backend::<opcost::backend::ArkworksBls12_381>(c, "arkworks/bls12-381");
    }
    #[cfg(feature = "blst")]
    bench_backend::<opcost::backend::BlstBackend>(c, "blst/bls12-381");
    bench_modexp(c);
}

criterion_group!(benches, criterion_benches);
criterion_main!(benches);
