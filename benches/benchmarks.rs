use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use normplot::{
    curve::{generate_curve, CurveKind},
    params::DistributionParams,
    renderer::NullRenderer,
    state::{DistributionState, StateConfig, StepPolicy, Tail},
    stats::DEFAULT_STEP,
};

pub fn bench_generate_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate curve");
    let kind = CurveKind::Density { mean: 0.0, sd: 1.0 };
    for width in [6, 60, 600] {
        let half = width as f64 / 2.0;
        group.bench_with_input(BenchmarkId::new("fixed step", width), &half, |b, half| {
            b.iter(|| generate_curve(kind, -half, *half, black_box(DEFAULT_STEP)))
        });
    }
    group.finish();
}

pub fn bench_handle(c: &mut Criterion) {
    use rand::prelude::*;
    use rand_distr::Uniform;
    use rand_xoshiro::Xoshiro256PlusPlus;

    let rng = Xoshiro256PlusPlus::seed_from_u64(12344);
    let xs: Vec<f64> = rng.sample_iter(Uniform::new(-3.0, 3.0)).take(1000).collect();

    let mut group = c.benchmark_group("handle update");
    group.bench_function("drag (interpolated)", |b| {
        let mut state = DistributionState::with_defaults(NullRenderer);
        b.iter(|| {
            for x in &xs {
                state.on_drag(black_box(*x));
            }
        })
    });
    group.bench_function("probability edit (exact)", |b| {
        let mut state = DistributionState::with_defaults(NullRenderer);
        b.iter(|| {
            for pct in 1..100 {
                let _ = state.set_from_probability(black_box(pct as f64), Tail::LessThan);
            }
        })
    });
    group.finish();
}

pub fn bench_wide_range_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide range drag");
    let params = DistributionParams::new(0.0, 50.0, -500.0, 500.0);
    for (name, step) in [("fixed", StepPolicy::default()), ("adaptive", StepPolicy::Adaptive)] {
        group.bench_function(name, |b| {
            let config = StateConfig {
                step,
                ..Default::default()
            };
            let mut state = DistributionState::new(params, 0.0, config, NullRenderer);
            b.iter(|| {
                for i in 0..100 {
                    state.on_drag(black_box(-500.0 + i as f64 * 10.0));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate_curve, bench_handle, bench_wide_range_drag);
criterion_main!(benches);
