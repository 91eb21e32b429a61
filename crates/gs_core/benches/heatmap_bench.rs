use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gs_core::{
    ev_heatmap, monte_carlo_samples, risk_averse_heatmap, voi_heatmap, BeliefGrid, GameConfig,
    MonteCarloConfig, SensorType, SpatialFieldGenerator,
};

fn analysis_grid() -> (BeliefGrid, GameConfig) {
    let config = GameConfig {
        width: 24,
        height: 24,
        seed: 7,
        ..Default::default()
    };
    let truth = SpatialFieldGenerator::generate(
        config.width,
        config.height,
        &config.spatial,
        &config.beta_priors,
        config.seed,
    )
    .expect("field generation");
    (BeliefGrid::from_truth(&truth), config)
}

fn bench_ev_heatmap(c: &mut Criterion) {
    let (grid, config) = analysis_grid();
    c.bench_function("ev_heatmap_24x24_r1", |b| {
        b.iter(|| ev_heatmap(black_box(&grid), 1, &config))
    });
}

fn bench_voi_heatmap(c: &mut Criterion) {
    let (grid, config) = analysis_grid();
    c.bench_function("voi_heatmap_24x24_r1", |b| {
        b.iter(|| voi_heatmap(black_box(&grid), SensorType::Drone, &config, 1, config.seed))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let (grid, config) = analysis_grid();
    let mc = MonteCarloConfig {
        num_samples: 500,
        seed: 3,
        ..Default::default()
    };
    c.bench_function("monte_carlo_500_24x24", |b| {
        b.iter(|| monte_carlo_samples(black_box(&grid), &mc).unwrap())
    });

    let samples = monte_carlo_samples(&grid, &mc).unwrap();
    c.bench_function("risk_averse_heatmap_500_24x24", |b| {
        b.iter(|| risk_averse_heatmap(black_box(&grid), &samples, 1, &config, mc.cvar_tail))
    });
}

criterion_group!(benches, bench_ev_heatmap, bench_voi_heatmap, bench_monte_carlo);
criterion_main!(benches);
