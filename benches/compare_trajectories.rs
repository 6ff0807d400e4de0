use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wellpath::comparison::{compare, ComparisonParams};
use wellpath::survey::{min_curvature::MinimumCurvature, Station};

/// Random-walk survey: `n` stations with irregular spacing around `mean_step`.
fn random_survey(rng: &mut StdRng, n: usize, mean_step: f64) -> Vec<Station> {
    let mut depth = 0.0;
    let mut inc: f64 = 0.0;
    let mut azi: f64 = rng.random_range(0.0..360.0);

    (0..n)
        .map(|_| {
            let s = Station::new(depth, inc, azi);
            depth += mean_step * rng.random_range(0.5..1.5);
            inc = (inc + rng.random_range(-0.5..2.0)).clamp(0.0, 95.0);
            azi = (azi + rng.random_range(-3.0..3.0)).rem_euclid(360.0);
            s
        })
        .collect()
}

/// Typical field case: two surveys of a few hundred stations on a 10 m grid.
fn bench_compare_typical(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let reference = random_survey(&mut rng, 300, 30.0);
    let candidate = random_survey(&mut rng, 250, 36.0);
    let params = ComparisonParams::builder().step(10.0).build().unwrap();

    c.bench_function("compare/typical_10m_grid", |b| {
        b.iter(|| {
            let result = compare(
                &MinimumCurvature,
                black_box(&reference),
                black_box(&candidate),
                &params,
            )
            .unwrap();
            black_box(result.summary);
        })
    });
}

/// Fine grid: same surveys, 1 m step, dominated by interpolation and the service.
fn bench_compare_fine_grid(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xFEED);

    c.bench_function("compare/fine_1m_grid", |b| {
        b.iter_batched(
            || {
                (
                    random_survey(&mut rng, 300, 30.0),
                    random_survey(&mut rng, 300, 30.0),
                )
            },
            |(reference, candidate)| {
                let params = ComparisonParams::builder().step(1.0).build().unwrap();
                black_box(compare(&MinimumCurvature, &reference, &candidate, &params).ok());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(30);
    targets = bench_compare_typical, bench_compare_fine_grid
);
criterion_main!(benches);
