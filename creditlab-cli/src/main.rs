//! CreditLab CLI: pipeline runs, one-off risk checks and stress scenarios.
//!
//! Commands:
//! - `run`: execute the full pipeline on CSV or synthetic data and save artifacts
//! - `risk`: exposures and limit status for a single position
//! - `stress`: evaluate the configured scenarios against the configured portfolio
//! - `scenarios`: list the configured stress scenarios

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use creditlab_core::domain::Position;
use creditlab_core::risk::RiskLimitEngine;
use creditlab_core::stress::StressReport;
use creditlab_runner::{
    generate_synthetic, load_csv_files, run_pipeline, ArtifactManager, PipelineConfig,
    PipelineResult, RunOptions,
};

const DEFAULT_LOG_DIRECTIVE: &str = "creditlab=info";

#[derive(Parser)]
#[command(
    name = "creditlab",
    about = "CreditLab CLI: credit-spread signal, risk, execution and stress pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and save artifacts.
    Run {
        /// Path to a TOML config file. Defaults reproduce the reference pipeline.
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV input file(s) with a `date` column; repeat to merge sources.
        #[arg(long = "data")]
        data: Vec<PathBuf>,

        /// Generate seeded synthetic data instead of reading CSV input.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Start date for synthetic data (YYYY-MM-DD). Defaults to 2018-01-02.
        #[arg(long)]
        start: Option<String>,

        /// End date for synthetic data (YYYY-MM-DD). Defaults to 2024-12-31.
        #[arg(long)]
        end: Option<String>,

        /// Override the master seed from the config.
        #[arg(long)]
        seed: Option<u64>,

        /// Drive execution on a virtual clock instead of sleeping between slices.
        #[arg(long, default_value_t = false)]
        fast: bool,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "runs")]
        output_dir: PathBuf,
    },
    /// Exposures and limit status for one position.
    Risk {
        /// Position notional.
        #[arg(long)]
        notional: Option<f64>,

        /// Modified duration (DV01 input).
        #[arg(long)]
        duration: Option<f64>,

        /// Spread duration (CS01 input).
        #[arg(long)]
        spread_duration: Option<f64>,

        /// Config file to take limits from.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Evaluate stress scenarios against the portfolio.
    Stress {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List the configured stress scenarios.
    Scenarios {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            data,
            synthetic,
            start,
            end,
            seed,
            fast,
            output_dir,
        } => run_cmd(
            config.as_deref(),
            &data,
            synthetic,
            start.as_deref(),
            end.as_deref(),
            seed,
            fast,
            &output_dir,
        ),
        Commands::Risk {
            notional,
            duration,
            spread_duration,
            config,
        } => risk_cmd(notional, duration, spread_duration, config.as_deref()),
        Commands::Stress { config } => stress_cmd(config.as_deref()),
        Commands::Scenarios { config } => scenarios_cmd(config.as_deref()),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn parse_date(
    value: Option<&str>,
    fallback: Option<NaiveDate>,
    default: (i32, u32, u32),
) -> Result<NaiveDate> {
    if let Some(s) = value {
        return NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"));
    }
    if let Some(d) = fallback {
        return Ok(d);
    }
    let (y, m, d) = default;
    NaiveDate::from_ymd_opt(y, m, d).context("invalid default date")
}

#[allow(clippy::too_many_arguments)]
fn run_cmd(
    config_path: Option<&Path>,
    data: &[PathBuf],
    synthetic: bool,
    start: Option<&str>,
    end: Option<&str>,
    seed: Option<u64>,
    fast: bool,
    output_dir: &Path,
) -> Result<()> {
    if synthetic && !data.is_empty() {
        bail!("--data and --synthetic are mutually exclusive");
    }
    if !synthetic && data.is_empty() {
        bail!("one of --data or --synthetic is required");
    }

    let mut config = load_config(config_path)?;
    if let Some(seed) = seed {
        config.run.seed = seed;
    }

    let loaded = if synthetic {
        let start = parse_date(start, config.run.start_date, (2018, 1, 2))?;
        let end = parse_date(end, config.run.end_date, (2024, 12, 31))?;
        generate_synthetic(&config.signal.schema, start, end, config.run.seed)?
    } else {
        load_csv_files(data)?
    };

    let opts = RunOptions {
        fast,
        ..RunOptions::default()
    };
    let result = run_pipeline(&config, &loaded, &opts)?;
    print_summary(&result);

    let paths = ArtifactManager::new(output_dir)?.save_run(&result, &config)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());
    Ok(())
}

fn risk_cmd(
    notional: Option<f64>,
    duration: Option<f64>,
    spread_duration: Option<f64>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let position = if notional.is_none() && duration.is_none() && spread_duration.is_none() {
        config.position
    } else {
        Position {
            notional,
            duration,
            spread_duration,
        }
    };
    let engine = RiskLimitEngine::new(config.risk_limits()?);

    println!();
    println!("=== Risk Check ===");
    for (metric, value) in engine.calculate_exposures(&position).iter() {
        println!("{:<14}{:>18.2}", format!("{metric}:"), value);
    }
    println!();
    println!("--- Limits ---");
    for status in engine.limit_report(&position) {
        println!(
            "{:<14}{:>18.2} / {:<18.2}{}",
            format!("{}:", status.metric),
            status.value,
            status.limit,
            if status.violated { "VIOLATION" } else { "ok" }
        );
    }
    println!();
    Ok(())
}

fn stress_cmd(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let components = config.build()?;
    let report = components.stress.run(&components.portfolio);
    print_stress(&report);
    Ok(())
}

fn scenarios_cmd(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let scenarios = config.scenario_set()?;
    println!("{:<20}{:>14}{:>14}", "Scenario", "Equity", "Spread");
    for s in scenarios.scenarios() {
        println!(
            "{:<20}{:>13.1}%{:>14.2}",
            s.name,
            s.shock.equity_shock * 100.0,
            s.shock.credit_spread_widen
        );
    }
    Ok(())
}

fn print_stress(report: &StressReport) {
    println!();
    println!("--- Stress ---");
    for o in &report.outcomes {
        println!(
            "{:<20}{:>16.2} -> {:>16.2}  ({:+.2})",
            o.scenario, o.baseline_value, o.stressed_value, o.pnl_impact
        );
    }
    if let (Some(name), Some(pnl)) = (&report.worst_case_scenario, report.worst_case_pnl) {
        println!("Worst case:     {name} ({pnl:+.2})");
    }
    println!();
}

fn print_summary(result: &PipelineResult) {
    println!();
    println!("=== Pipeline Result ===");
    println!("Run:            {}", result.run_id);
    println!("Input rows:     {}", result.input_rows);
    println!("Signal rows:    {}", result.signals.len());
    println!();
    println!("--- Risk ---");
    for status in &result.limit_report {
        println!(
            "{:<16}{:.2} (limit {:.2}){}",
            format!("{}:", status.metric),
            status.value,
            status.limit,
            if status.violated { "  VIOLATION" } else { "" }
        );
    }
    println!();
    println!("--- Execution ---");
    let exec = &result.execution;
    println!("Filled:         {} / {} {}", exec.filled, exec.requested, exec.symbol);
    println!("Slices:         {}", exec.fill_count);
    if let Some(vwap) = exec.vwap {
        println!("VWAP:           {vwap:.4}");
    }
    println!("Shortfall:      {:.2}", exec.shortfall);
    if let Some(reason) = exec.termination {
        println!("Termination:    {reason}");
    }
    println!();
    println!("--- Attribution ---");
    println!("Execution:      {:.2}", result.attribution_summary.execution);
    println!("Market:         {:.2}", result.attribution_summary.market);
    println!("Total:          {:.2}", result.attribution_summary.total);
    println!();
    println!("--- Performance ---");
    let perf = &result.performance;
    println!("Total Return:   {:.4}%", perf.total_return * 100.0);
    println!("Sharpe:         {:.3}", perf.sharpe);
    println!("Max Drawdown:   {:.4}%", perf.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", perf.win_rate * 100.0);
    print_stress(&result.stress);
    if result.has_synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for anomaly in &result.data_quality_warnings {
        println!(
            "WARNING: {} {:?} ({} rows)",
            anomaly.column, anomaly.anomaly_type, anomaly.count
        );
    }
    println!();
}
