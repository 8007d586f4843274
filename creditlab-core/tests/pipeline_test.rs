//! Integration tests: the five components wired together in one pass.
//!
//! Tests:
//! 1. Merged price/macro sources canonicalize into a signal table.
//! 2. TWAP fills feed attribution; execution + market equals realized PnL.
//! 3. Risk and stress run on their own inputs alongside.
//! 4. The signal table survives a Parquet round-trip for the presentation side.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use creditlab_core::attribution::{
    cumulative_pnl, realized_pnl, AttributionSummary, Enrichment, FillFrame, PnLAttributor,
};
use creditlab_core::data::{read_parquet, write_parquet, Canonicalizer, TimeSeriesTable};
use creditlab_core::domain::{PortfolioSnapshot, Position};
use creditlab_core::execution::{AdaptiveTwap, ExecutionSummary, ManualClock, TerminationReason, TwapConfig};
use creditlab_core::risk::{RiskLimitEngine, RiskMetric};
use creditlab_core::rng::SeedHierarchy;
use creditlab_core::signal::{SignalConfig, SignalProcessor, SIGNAL};
use creditlab_core::stress::StressSimulator;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap() + Duration::days(n)
}

fn wave(n: usize, level: f64, amp: f64, freq: f64) -> Vec<f64> {
    (0..n)
        .map(|i| level + amp * (i as f64 * freq).sin() + 0.0005 * i as f64)
        .collect()
}

/// ETF closes on every day, macro series with a gap every seventh day.
fn sources(n: usize) -> (TimeSeriesTable, TimeSeriesTable) {
    let dates: Vec<NaiveDate> = (0..n as i64).map(day).collect();
    let prices = TimeSeriesTable::new(
        dates.clone(),
        vec![
            ("SPY".into(), wave(n, 400.0, 20.0, 0.05)),
            ("TLT".into(), wave(n, 120.0, 5.0, 0.03)),
            ("HYG".into(), wave(n, 80.0, 2.0, 0.04)),
            ("LQD".into(), wave(n, 110.0, 3.0, 0.02)),
        ],
    )
    .unwrap();

    let macro_dates: Vec<NaiveDate> = dates.iter().copied().filter(|d| d.day0() % 7 != 3).collect();
    let m = macro_dates.len();
    let macro_ = TimeSeriesTable::new(
        macro_dates,
        vec![
            ("baa_10y".into(), wave(m, 5.5, 0.4, 0.11)),
            ("aaa_10y".into(), wave(m, 4.2, 0.2, 0.07)),
            ("10y_yield".into(), wave(m, 3.0, 0.3, 0.05)),
            ("2y_yield".into(), wave(m, 2.0, 0.5, 0.09)),
            ("vix".into(), wave(m, 20.0, 6.0, 0.13)),
        ],
    )
    .unwrap();
    (prices, macro_)
}

// ──────────────────────────────────────────────
// 1. Data → signal
// ──────────────────────────────────────────────

#[test]
fn merged_sources_produce_signal() {
    let (prices, macro_) = sources(300);
    let merged = Canonicalizer::merge(&[&prices, &macro_]).unwrap();
    let prepared = Canonicalizer::prepare(&merged);
    assert!(prepared.dates().windows(2).all(|w| w[0] < w[1]));
    assert!((0..prepared.len()).all(|r| prepared.row_is_complete(r)));

    let signal = SignalProcessor::new(SignalConfig::default())
        .unwrap()
        .process(&prepared)
        .unwrap();
    assert_eq!(signal.len(), prepared.len() - 125);
    assert!(signal.column(SIGNAL).unwrap().iter().all(|v| v.is_finite()));
    // instrument prices carried through
    assert!(signal.has_column("LQD"));
}

// ──────────────────────────────────────────────
// 2. Execution → attribution
// ──────────────────────────────────────────────

#[test]
fn execution_feeds_attribution() {
    let seeds = SeedHierarchy::new(42);
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 15, 0, 0).unwrap()));
    let mut twap = AdaptiveTwap::seeded("LQD", 10_000, TwapConfig::default(), &seeds)
        .unwrap()
        .with_clock(clock);
    let fills = twap.execute().unwrap();
    assert_eq!(fills.iter().map(|f| f.shares).sum::<u64>(), 10_000);
    assert!(fills.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    let summary = ExecutionSummary::from_fills("LQD", 10_000, &fills, twap.termination());
    assert_eq!(summary.termination, Some(TerminationReason::Completed));
    assert!((summary.vwap.unwrap() - 100.0).abs() < 1.0);

    let frame = FillFrame::from_fills(&fills).enrich(&Enrichment::default());
    let rows = PnLAttributor::default().attribute(&frame);
    assert_eq!(rows.len(), fills.len());

    let total = AttributionSummary::from_rows(&rows).total;
    let entry = fills[0].mid;
    assert!((total - realized_pnl(&fills, entry)).abs() < 1e-6);
    let running = cumulative_pnl(&rows);
    assert!((running[running.len() - 1] - total).abs() < 1e-6);
}

// ──────────────────────────────────────────────
// 3. Risk and stress
// ──────────────────────────────────────────────

#[test]
fn reference_risk_and_stress() {
    let flags = RiskLimitEngine::default().check_limits(&Position::new(5_000_000.0, 4.2, 3.8));
    assert!(!flags[&RiskMetric::MaxNotional]);
    assert!(!flags[&RiskMetric::Dv01]);
    assert!(!flags[&RiskMetric::Cs01]);

    let baseline = PortfolioSnapshot::sample();
    let report = StressSimulator::default().run(&baseline);
    assert_eq!(report.outcomes.len(), 3);
    assert!(report.impacts().all(|(_, v)| v < 0.0));
    assert_eq!(baseline, PortfolioSnapshot::sample());
}

// ──────────────────────────────────────────────
// 4. Presentation hand-off
// ──────────────────────────────────────────────

#[test]
fn signal_table_parquet_round_trip() {
    let (prices, macro_) = sources(200);
    let prepared = Canonicalizer::prepare(&Canonicalizer::merge(&[&prices, &macro_]).unwrap());
    let signal = SignalProcessor::new(SignalConfig {
        window: 20,
        ..SignalConfig::default()
    })
    .unwrap()
    .process(&prepared)
    .unwrap();

    let dir = std::env::temp_dir().join(format!("creditlab-core-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("signals.parquet");
    write_parquet(&signal, &path).unwrap();
    let back = read_parquet(&path).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert_eq!(back.dates(), signal.dates());
    assert_eq!(back.column(SIGNAL), signal.column(SIGNAL));
}
