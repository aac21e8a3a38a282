//! Criterion benchmarks for the evaluation hot paths.
//!
//! Benchmarks:
//! 1. Indicator series (VWAP, ORB, close slope) over growing sessions
//! 2. One full evaluation cycle (indicators → levels → risk → confidence → decision)
//! 3. A 100-symbol pass through the shared evaluation function

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradegate_core::config::EngineConfig;
use tradegate_core::domain::Candle;
use tradegate_core::evaluation::{evaluate, EvaluationContext};
use tradegate_core::indicators::{CloseSlope, Indicator, Orb, Vwap};
use tradegate_core::provider::MarketSnapshot;
use tradegate_core::risk::{DayRiskState, RiskProfile};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_session(n: usize, phase: f64) -> Vec<Candle> {
    let open_time = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.2 + phase).sin() * 3.0 + i as f64 * 0.02;
            let open = close - 0.15;
            Candle {
                timestamp: open_time + chrono::Duration::minutes(3 * i as i64),
                open,
                high: close + 0.6,
                low: open - 0.6,
                close,
                volume: 20_000 + (i as u64 % 7) * 1_500,
            }
        })
        .collect()
}

// ── 1. Indicator Series ──────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_series");

    // 125 candles = one full 3-minute session
    for &candle_count in &[25, 60, 125] {
        let candles = make_session(candle_count, 0.0);
        let stack: Vec<Box<dyn Indicator>> = vec![
            Box::new(Vwap::new()),
            Box::new(Orb::high(5)),
            Box::new(Orb::low(5)),
            Box::new(CloseSlope::new(5)),
        ];
        group.bench_with_input(
            BenchmarkId::new("session_stack", candle_count),
            &candle_count,
            |b, _| {
                b.iter(|| {
                    for indicator in &stack {
                        black_box(indicator.compute(black_box(&candles)));
                    }
                });
            },
        );
    }

    group.finish();
}

// ── 2. Single Evaluation Cycle ───────────────────────────────────────

fn bench_evaluation(c: &mut Criterion) {
    let config = EngineConfig::default();
    let profile = RiskProfile::default();
    let day = DayRiskState::default();
    let ctx = EvaluationContext {
        config: &config,
        profile: &profile,
        day: &day,
    };

    let mut group = c.benchmark_group("evaluation_cycle");
    for &candle_count in &[25, 125] {
        let market = MarketSnapshot::from_candles("BENCH", make_session(candle_count, 0.0));
        group.bench_with_input(
            BenchmarkId::new("evaluate", candle_count),
            &candle_count,
            |b, _| b.iter(|| evaluate(black_box(&market), Some(1.1), None, &ctx)),
        );
    }
    group.finish();
}

// ── 3. Universe Pass ─────────────────────────────────────────────────

fn bench_universe_pass(c: &mut Criterion) {
    let config = EngineConfig::default();
    let profile = RiskProfile::default();
    let day = DayRiskState::default();
    let ctx = EvaluationContext {
        config: &config,
        profile: &profile,
        day: &day,
    };
    let markets: Vec<MarketSnapshot> = (0..100)
        .map(|i| MarketSnapshot::from_candles(format!("SYM{i}"), make_session(60, i as f64)))
        .collect();

    c.bench_function("universe_pass_100", |b| {
        b.iter(|| {
            markets
                .iter()
                .filter(|m| {
                    evaluate(black_box(m), None, None, &ctx)
                        .map(|e| e.decision.allowed)
                        .unwrap_or(false)
                })
                .count()
        })
    });
}

criterion_group!(benches, bench_indicators, bench_evaluation, bench_universe_pass);
criterion_main!(benches);
