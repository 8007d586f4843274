//! CreditLab Runner: pipeline orchestration, configuration, data loading,
//! metrics and artifact export.
//!
//! This crate builds on `creditlab-core` to provide:
//! - TOML pipeline configuration with reference defaults and a config hash
//! - CSV input loading and a seeded synthetic data generator
//! - The end-to-end pipeline run (signal, risk, execution, attribution, stress)
//! - Performance summary metrics over the attributed PnL
//! - Per-run artifact export (CSV, Parquet, JSON manifest)

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod reporting;
pub mod runner;

pub use config::{ConfigError, PipelineConfig};
pub use data_loader::{generate_synthetic, load_csv_files, LoadError, LoadedData};
pub use metrics::PerformanceSummary;
pub use reporting::{ArtifactManager, ArtifactPaths, RunManifest};
pub use runner::{run_pipeline, PipelineResult, RunError, RunOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn pipeline_config_is_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn pipeline_result_is_send_sync() {
        assert_send::<PipelineResult>();
        assert_sync::<PipelineResult>();
    }

    #[test]
    fn loaded_data_is_send_sync() {
        assert_send::<LoadedData>();
        assert_sync::<LoadedData>();
    }

    #[test]
    fn run_options_is_send_sync() {
        assert_send::<RunOptions>();
        assert_sync::<RunOptions>();
    }

    #[test]
    fn performance_summary_is_send_sync() {
        assert_send::<PerformanceSummary>();
        assert_sync::<PerformanceSummary>();
    }

    #[test]
    fn components_are_send_sync() {
        assert_send::<config::Components>();
        assert_sync::<config::Components>();
    }
}
