use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{expanding, expanding_by_group, Phase, PhaseAssigner};

fn bench_expanding(c: &mut Criterion) {
    let values: Vec<f64> = (0..365).map(|i| 20.0 + (i as f64 * 0.1).sin() * 4.0).collect();
    let days: Vec<u32> = (0..365).collect();
    let phases: Vec<Phase> = PhaseAssigner::assign(&days);

    c.bench_function("expanding_365_days", |b| {
        b.iter(|| expanding(black_box(&values)))
    });

    c.bench_function("expanding_by_phase_365_days", |b| {
        b.iter(|| expanding_by_group(black_box(&values), black_box(&phases)))
    });
}

criterion_group!(benches, bench_expanding);
criterion_main!(benches);
