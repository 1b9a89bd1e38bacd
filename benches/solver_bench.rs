//! Benchmarks for the bridge solver

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bridge_fea::prelude::*;

fn three_span_bridge(elements: usize) -> BridgeConfig {
    BridgeConfig::new(60.0, elements)
        .with_span_ratios(vec![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])
        .with_piers(vec![
            PierConfig::fixed_pin(0.0, 8.0),
            PierConfig::roller(1.0 / 3.0, 6.0),
            PierConfig::roller(2.0 / 3.0, 7.0),
            PierConfig::roller(1.0, 8.0),
        ])
        .with_loads(vec![
            Load::uniform(-25e3),
            Load::point(-200e3, 27.5),
            Load::distributed(-10e3, 5.0, 18.0),
        ])
}

fn benchmark_three_span(c: &mut Criterion) {
    let config = three_span_bridge(60);
    c.bench_function("three_span_60_elements", |b| {
        b.iter(|| black_box(analyze(&config).unwrap()))
    });
}

fn benchmark_fine_mesh(c: &mut Criterion) {
    let config = three_span_bridge(3000);
    c.bench_function("three_span_3000_elements", |b| {
        b.iter(|| black_box(analyze(&config).unwrap()))
    });
}

fn benchmark_elastic_piers(c: &mut Criterion) {
    let config = three_span_bridge(60).with_options(AnalysisOptions::elastic_pier());
    c.bench_function("three_span_elastic_piers", |b| {
        b.iter(|| black_box(analyze(&config).unwrap()))
    });
}

fn benchmark_envelope(c: &mut Criterion) {
    let config = three_span_bridge(60);
    let truck = VehicleLoad::new(vec![-120e3, -140e3, -140e3], 4.0, 0.0);
    c.bench_function("moving_load_sweep_30_steps", |b| {
        b.iter(|| black_box(moving_load_envelope(&config, &truck, 30).unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_three_span,
    benchmark_fine_mesh,
    benchmark_elastic_piers,
    benchmark_envelope,
);

criterion_main!(benches);
