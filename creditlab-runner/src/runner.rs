//! Pipeline runner: wires configuration, data and the five components.
//!
//! Stage order:
//! 1. Build and validate components from the config (fails before any work).
//! 2. Canonicalize the input table (forward-fill, drop incomplete rows).
//! 3. Signal construction and the risk check, concurrently.
//! 4. TWAP execution of the configured parent order.
//! 5. Attribution of the fills and the performance summary.
//! 6. Stress scenarios, evaluated in parallel, reported in scenario order.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use creditlab_core::attribution::{cumulative_pnl, AttributionRow, AttributionSummary, FillFrame};
use creditlab_core::data::{AnomalyReport, Canonicalizer, SchemaError, TimeSeriesTable};
use creditlab_core::domain::{Fill, RunId};
use creditlab_core::execution::{
    AdaptiveTwap, CancellationToken, ExecutionError, ExecutionSummary, ManualClock,
};
use creditlab_core::risk::{Exposure, LimitStatus, RiskMetric};
use creditlab_core::stress::StressReport;

use crate::config::{ConfigError, PipelineConfig};
use crate::data_loader::LoadedData;
use crate::metrics::PerformanceSummary;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] crate::data_loader::LoadError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Execution-time knobs that are not part of the run identity.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Drive the TWAP on a virtual clock instead of sleeping.
    pub fast: bool,
    pub cancel: CancellationToken,
}

/// Complete result of a single pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub schema_version: u32,
    pub run_id: RunId,
    pub has_synthetic: bool,
    pub input_rows: usize,
    pub data_quality_warnings: Vec<AnomalyReport>,

    pub signals: TimeSeriesTable,

    pub exposure: Exposure,
    pub limit_flags: BTreeMap<RiskMetric, bool>,
    pub limit_report: Vec<LimitStatus>,

    pub fills: Vec<Fill>,
    pub execution: ExecutionSummary,

    pub attribution: Vec<AttributionRow>,
    pub attribution_summary: AttributionSummary,
    pub cumulative_pnl: Vec<f64>,
    pub performance: PerformanceSummary,

    pub stress: StressReport,
}

impl PipelineResult {
    pub fn any_limit_violated(&self) -> bool {
        self.limit_flags.values().any(|v| *v)
    }
}

/// Run the full pipeline on pre-loaded data.
pub fn run_pipeline(
    config: &PipelineConfig,
    data: &LoadedData,
    opts: &RunOptions,
) -> Result<PipelineResult, RunError> {
    let components = config.build()?;
    let run_id = RunId::new(
        config.config_hash()?,
        data.dataset_hash.clone(),
        config.run.seed,
    );
    info!(run_id = %run_id, synthetic = data.has_synthetic, "starting pipeline run");

    // ── Input ──
    let data_quality_warnings = Canonicalizer::detect_anomalies(&data.table);
    for anomaly in &data_quality_warnings {
        warn!(column = %anomaly.column, kind = ?anomaly.anomaly_type, count = anomaly.count, "data quality");
    }
    let windowed = slice_window(&data.table, config.run.start_date, config.run.end_date);
    let prepared = Canonicalizer::prepare(&windowed);
    if prepared.is_empty() {
        warn!(
            rows = data.table.len(),
            "no complete rows in the date window; signal will be empty"
        );
    }
    info!(rows = prepared.len(), dropped = windowed.len() - prepared.len(), "input prepared");

    // ── Signal + risk ──
    let (signals, (exposure, limit_flags, limit_report)) = rayon::join(
        || components.signal.process(&prepared),
        || {
            let position = &components.position;
            (
                components.risk.calculate_exposures(position),
                components.risk.check_limits(position),
                components.risk.limit_report(position),
            )
        },
    );
    let signals = signals?;
    info!(rows = signals.len(), "signals computed");
    info!(
        violations = limit_flags.values().filter(|v| **v).count(),
        "risk limits checked"
    );

    // ── Execution ──
    let mut twap = AdaptiveTwap::seeded(
        config.run.symbol.as_str(),
        config.run.quantity,
        components.twap.clone(),
        &components.seeds,
    )?
    .with_cancellation(opts.cancel.clone());
    if opts.fast {
        let last = prepared.last_date().or_else(|| data.table.last_date());
        let anchor = session_open(last.unwrap_or_default());
        twap = twap.with_clock(Arc::new(ManualClock::new(anchor)));
    }
    let fills = twap.execute()?;
    let execution = ExecutionSummary::from_fills(
        &config.run.symbol,
        config.run.quantity,
        &fills,
        twap.termination(),
    );
    info!(
        fills = execution.fill_count,
        filled = execution.filled,
        termination = ?execution.termination,
        "execution finished"
    );

    // ── Attribution ──
    let frame = FillFrame::from_fills(&fills).enrich(&components.enrichment);
    let attribution = components.attributor.attribute(&frame);
    let attribution_summary = AttributionSummary::from_rows(&attribution);
    let cumulative = cumulative_pnl(&attribution);
    let pnl: Vec<f64> = attribution.iter().map(AttributionRow::total).collect();
    let performance = PerformanceSummary::compute(&pnl, config.run.initial_capital);
    info!(
        model = components.attributor.market_model(),
        total = attribution_summary.total,
        "attribution finished"
    );

    // ── Stress ──
    let stress = components.stress.run(&components.portfolio);

    Ok(PipelineResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        has_synthetic: data.has_synthetic,
        input_rows: prepared.len(),
        data_quality_warnings,
        signals,
        exposure,
        limit_flags,
        limit_report,
        fills,
        execution,
        attribution,
        attribution_summary,
        cumulative_pnl: cumulative,
        performance,
        stress,
    })
}

fn slice_window(
    table: &TimeSeriesTable,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> TimeSeriesTable {
    match (start, end) {
        (None, None) => table.clone(),
        (start, end) => table.slice_dates(
            start.unwrap_or(NaiveDate::MIN),
            end.unwrap_or(NaiveDate::MAX),
        ),
    }
}

/// 14:30 UTC on `date`, the US cash open.
fn session_open(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(14, 30, 0).unwrap_or_default();
    Utc.from_utc_datetime(&naive)
}
