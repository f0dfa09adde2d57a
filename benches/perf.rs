use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fmp_terminal::match_history::parse_history_csv;
use fmp_terminal::predict::predict_match;
use fmp_terminal::team_rates::estimate_rates;
use fmp_terminal::win_prob::simulate;

static EPL_SAMPLE: &str = include_str!("../tests/fixtures/epl_sample.csv");

fn bench_parse_history(c: &mut Criterion) {
    c.bench_function("parse_history", |b| {
        b.iter(|| {
            let history = parse_history_csv(black_box(EPL_SAMPLE)).unwrap();
            black_box(history.len());
        })
    });
}

fn bench_estimate_rates(c: &mut Criterion) {
    let history = parse_history_csv(EPL_SAMPLE).unwrap();
    c.bench_function("estimate_rates", |b| {
        b.iter(|| {
            let rates = estimate_rates(black_box("Arsenal"), black_box("Chelsea"), &history);
            black_box(rates);
        })
    });
}

fn bench_simulate_grid(c: &mut Criterion) {
    c.bench_function("simulate_cap5", |b| {
        b.iter(|| {
            let result = simulate(black_box(1.8), black_box(1.2), 5).unwrap();
            black_box(result.home_win);
        })
    });
    c.bench_function("simulate_cap10", |b| {
        b.iter(|| {
            let result = simulate(black_box(1.8), black_box(1.2), 10).unwrap();
            black_box(result.home_win);
        })
    });
}

fn bench_predict_match(c: &mut Criterion) {
    let history = parse_history_csv(EPL_SAMPLE).unwrap();
    c.bench_function("predict_match", |b| {
        b.iter(|| {
            let result =
                predict_match(black_box("Man City"), black_box("Everton"), &history, 5).unwrap();
            black_box(result.draw);
        })
    });
}

criterion_group!(
    perf,
    bench_parse_history,
    bench_estimate_rates,
    bench_simulate_grid,
    bench_predict_match
);
criterion_main!(perf);
