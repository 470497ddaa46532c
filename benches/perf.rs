use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use simfut_terminal::config::MatchConfig;
use simfut_terminal::history::{History, HistoryRecord};
use simfut_terminal::poisson::{outcome_probs, sample_goal_count};
use simfut_terminal::ratings::ClimateId;
use simfut_terminal::rng::RngSource;
use simfut_terminal::{simulate_match, simulate_quick};

fn knockout_config() -> MatchConfig {
    MatchConfig {
        extra_time: true,
        penalties: true,
        climate: ClimateId::Lluvia,
        ..MatchConfig::for_teams("Colo-Colo", "Universidad de Chile")
    }
}

fn bench_sample_goal_count(c: &mut Criterion) {
    let mut rng = RngSource::seeded(7);
    c.bench_function("sample_goal_count", |b| {
        b.iter(|| {
            let goals = sample_goal_count(black_box(1.36), &mut rng).unwrap();
            black_box(goals);
        })
    });
}

fn bench_simulate_quick(c: &mut Criterion) {
    let cfg = MatchConfig::for_teams("Colo-Colo", "Palestino");
    let mut rng = RngSource::seeded(11);
    c.bench_function("simulate_quick", |b| {
        b.iter(|| {
            let res = simulate_quick(black_box(&cfg), &mut rng).unwrap();
            black_box(res.events.len());
        })
    });
}

fn bench_simulate_match(c: &mut Criterion) {
    let cfg = knockout_config();
    let mut rng = RngSource::seeded(13);
    c.bench_function("simulate_match_knockout", |b| {
        b.iter(|| {
            let res = simulate_match(black_box(&cfg), &mut rng).unwrap();
            black_box(res.events.len());
        })
    });
}

fn bench_outcome_probs(c: &mut Criterion) {
    c.bench_function("outcome_probs", |b| {
        b.iter(|| {
            let probs = outcome_probs(black_box(1.36), black_box(1.3), 12);
            black_box(probs);
        })
    });
}

fn bench_history_serialize(c: &mut Criterion) {
    let cfg = knockout_config();
    let mut rng = RngSource::seeded(17);
    let mut history = History::new();
    for _ in 0..200 {
        let res = simulate_match(&cfg, &mut rng).unwrap();
        history.push(HistoryRecord::from_result(&res, chrono::Utc::now()));
    }
    c.bench_function("history_serialize_200", |b| {
        b.iter(|| {
            let json = serde_json::to_string(black_box(&history)).unwrap();
            black_box(json.len());
        })
    });
}

criterion_group!(
    perf,
    bench_sample_goal_count,
    bench_simulate_quick,
    bench_simulate_match,
    bench_outcome_probs,
    bench_history_serialize
);
criterion_main!(perf);
