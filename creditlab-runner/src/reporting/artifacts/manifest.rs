//! Run manifest export (JSON).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use creditlab_core::execution::TerminationReason;

use crate::metrics::PerformanceSummary;
use crate::runner::PipelineResult;

/// Identity, provenance and headline numbers of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub run_id: String,
    pub config_hash: String,
    pub dataset_hash: String,
    pub seed: u64,
    pub has_synthetic: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub input_rows: usize,
    pub signal_rows: usize,
    pub fill_count: usize,
    pub filled_shares: u64,
    pub termination: Option<TerminationReason>,
    pub limit_violations: Vec<String>,
    pub worst_case_scenario: Option<String>,
    pub data_quality_warnings: usize,
    pub performance: PerformanceSummary,
}

impl RunManifest {
    pub fn from_result(result: &PipelineResult) -> Self {
        Self {
            schema_version: result.schema_version,
            run_id: result.run_id.digest(),
            config_hash: result.run_id.config_hash.to_string(),
            dataset_hash: result.run_id.dataset_hash.to_string(),
            seed: result.run_id.seed,
            has_synthetic: result.has_synthetic,
            timestamp: chrono::Utc::now(),
            input_rows: result.input_rows,
            signal_rows: result.signals.len(),
            fill_count: result.execution.fill_count,
            filled_shares: result.execution.filled,
            termination: result.execution.termination,
            limit_violations: result
                .limit_flags
                .iter()
                .filter(|(_, violated)| **violated)
                .map(|(metric, _)| metric.to_string())
                .collect(),
            worst_case_scenario: result.stress.worst_case_scenario.clone(),
            data_quality_warnings: result.data_quality_warnings.len(),
            performance: result.performance,
        }
    }
}

pub fn write_manifest(path: &Path, result: &PipelineResult) -> Result<RunManifest> {
    let manifest = RunManifest::from_result(result);
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write manifest to {}", path.display()))?;
    Ok(manifest)
}

pub fn read_manifest(path: &Path) -> Result<RunManifest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).context("Failed to parse run manifest")
}
