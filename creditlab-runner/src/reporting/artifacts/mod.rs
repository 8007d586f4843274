//! Artifact manager for persisting run outputs.

mod manifest;
mod tables;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use creditlab_core::risk::{LimitStatus, RiskMetric};
use tracing::info;

use crate::config::PipelineConfig;
use crate::runner::PipelineResult;

pub use manifest::{read_manifest, RunManifest};

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub config: PathBuf,
    pub signals_csv: PathBuf,
    pub signals_parquet: PathBuf,
    pub fills_csv: PathBuf,
    pub attribution_csv: PathBuf,
    pub risk_json: PathBuf,
    pub stress_json: PathBuf,
}

/// Manages writing all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactManager {
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct RiskArtifact<'a> {
    exposure: BTreeMap<RiskMetric, f64>,
    limits: &'a [LimitStatus],
}

impl ArtifactManager {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)
            .context("Failed to create artifact output directory")?;
        Ok(Self { output_dir })
    }

    /// Directory a run's artifacts land in: `<output_dir>/<short run id>`.
    pub fn run_dir(&self, result: &PipelineResult) -> PathBuf {
        self.output_dir.join(result.run_id.short())
    }

    /// Save complete run artifacts.
    pub fn save_run(&self, result: &PipelineResult, config: &PipelineConfig) -> Result<ArtifactPaths> {
        let run_dir = self.run_dir(result);
        std::fs::create_dir_all(&run_dir).context("Failed to create run artifact directory")?;

        let manifest_path = run_dir.join("manifest.json");
        manifest::write_manifest(&manifest_path, result)?;

        let config_path = run_dir.join("config.toml");
        let config_toml = config.to_toml().context("Failed to serialize run config")?;
        std::fs::write(&config_path, config_toml)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        let signals_csv = run_dir.join("signals.csv");
        let signals_parquet = run_dir.join("signals.parquet");
        tables::write_signals_csv(&signals_csv, &result.signals)?;
        tables::write_signals_parquet(&signals_parquet, &result.signals)?;

        let fills_csv = run_dir.join("fills.csv");
        tables::write_fills_csv(&fills_csv, &result.fills)?;

        let attribution_csv = run_dir.join("attribution.csv");
        tables::write_attribution_csv(&attribution_csv, &result.attribution, &result.cumulative_pnl)?;

        let risk_json = run_dir.join("risk.json");
        let risk = RiskArtifact {
            exposure: result.exposure.iter().collect(),
            limits: &result.limit_report,
        };
        write_json(&risk_json, &risk)?;

        let stress_json = run_dir.join("stress.json");
        write_json(&stress_json, &result.stress)?;

        info!(dir = %run_dir.display(), "artifacts saved");
        Ok(ArtifactPaths {
            run_dir,
            manifest: manifest_path,
            config: config_path,
            signals_csv,
            signals_parquet,
            fills_csv,
            attribution_csv,
            risk_json,
            stress_json,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
