//! Discrete PID filter micro-benchmark, mirroring the teacher's
//! `pid_benchmark.rs`: measure one axis's `march`/`saturate` pair in
//! isolation, then the three-axis cascade the attitude core actually
//! runs each cycle.

use criterion::{criterion_group, criterion_main, Criterion};

use flight_core::control::constants::{DT, MAX_ROLL_COMPONENT, MAX_YAW_COMPONENT};
use flight_core::control::pid::{DiscreteFilter, DERIVATIVE_TAU};

fn reference_filter() -> DiscreteFilter {
    DiscreteFilter::generate(4.0, 0.5, 0.05, DERIVATIVE_TAU, DT)
}

fn bench_march_only(c: &mut Criterion) {
    let mut filter = reference_filter();
    let mut cycle = 0u64;

    c.bench_function("pid_march", |b| {
        b.iter(|| {
            cycle += 1;
            let t = cycle as f32 * DT;
            let error = 0.2 * t.sin();
            filter.march(error);
        });
    });
}

fn bench_march_gated_and_saturate(c: &mut Criterion) {
    let mut filter = reference_filter();
    let mut cycle = 0u64;

    c.bench_function("pid_march_gated_and_saturate", |b| {
        b.iter(|| {
            cycle += 1;
            let t = cycle as f32 * DT;
            let error = 0.3 * t.cos();
            filter.march_gated(error, error.abs() > 0.1);
            filter.saturate(-MAX_ROLL_COMPONENT, MAX_ROLL_COMPONENT);
        });
    });
}

fn bench_three_axis_cascade(c: &mut Criterion) {
    let mut roll = reference_filter();
    let mut pitch = reference_filter();
    let mut yaw = reference_filter();
    let mut cycle = 0u64;

    c.bench_function("pid_three_axis_cascade", |b| {
        b.iter(|| {
            cycle += 1;
            let t = cycle as f32 * DT;

            roll.march_gated(0.2 * t.sin(), true);
            roll.saturate(-MAX_ROLL_COMPONENT, MAX_ROLL_COMPONENT);

            pitch.march_gated(0.2 * t.cos(), true);
            pitch.saturate(-MAX_ROLL_COMPONENT, MAX_ROLL_COMPONENT);

            yaw.march_gated(0.1 * t.sin(), true);
            yaw.saturate(-MAX_YAW_COMPONENT, MAX_YAW_COMPONENT);
        });
    });
}

criterion_group!(
    benches,
    bench_march_only,
    bench_march_gated_and_saturate,
    bench_three_axis_cascade,
);
criterion_main!(benches);
