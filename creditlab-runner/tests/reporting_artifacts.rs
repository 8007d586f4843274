use chrono::NaiveDate;

use creditlab_core::data::{read_parquet, MacroSchema};
use creditlab_core::signal::SIGNAL;
use creditlab_runner::reporting::artifacts::read_manifest;
use creditlab_runner::{
    generate_synthetic, run_pipeline, ArtifactManager, PipelineConfig, PipelineResult, RunOptions,
};

fn run(config: &PipelineConfig) -> PipelineResult {
    let data = generate_synthetic(
        &MacroSchema::default(),
        NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        NaiveDate::from_ymd_opt(2023, 9, 29).unwrap(),
        config.run.seed,
    )
    .unwrap();
    let opts = RunOptions {
        fast: true,
        ..RunOptions::default()
    };
    run_pipeline(config, &data, &opts).unwrap()
}

#[test]
fn test_artifact_manager_exports() {
    let temp_dir = tempfile::tempdir().unwrap();
    let manager = ArtifactManager::new(temp_dir.path()).unwrap();
    let config = PipelineConfig::default();
    let result = run(&config);

    let paths = manager.save_run(&result, &config).unwrap();
    assert_eq!(paths.run_dir, temp_dir.path().join(result.run_id.short()));
    assert!(paths.manifest.exists());
    assert!(paths.config.exists());
    assert!(paths.signals_csv.exists());
    assert!(paths.signals_parquet.exists());
    assert!(paths.fills_csv.exists());
    assert!(paths.attribution_csv.exists());
    assert!(paths.risk_json.exists());
    assert!(paths.stress_json.exists());
}

#[test]
fn test_manifest_round_trip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();
    let result = run(&config);
    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&result, &config)
        .unwrap();

    let manifest = read_manifest(&paths.manifest).unwrap();
    assert_eq!(manifest.run_id, result.run_id.digest());
    assert_eq!(manifest.config_hash, config.config_hash().unwrap().0);
    assert!(manifest.has_synthetic);
    assert_eq!(manifest.seed, 42);
    assert_eq!(manifest.fill_count, result.fills.len());
    assert_eq!(manifest.filled_shares, 10_000);
    assert!(manifest.limit_violations.is_empty());
    assert_eq!(manifest.worst_case_scenario.as_deref(), Some("2008 Crisis"));
}

#[test]
fn test_saved_config_reloads_identically() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::default();
    config.signal.window = 40;
    let result = run(&config);
    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&result, &config)
        .unwrap();

    let reloaded = PipelineConfig::from_file(&paths.config).unwrap();
    assert_eq!(reloaded, config);
    assert_eq!(reloaded.config_hash().unwrap(), result.run_id.config_hash);
}

#[test]
fn test_tabular_artifacts_match_result() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();
    let result = run(&config);
    let paths = ArtifactManager::new(temp_dir.path())
        .unwrap()
        .save_run(&result, &config)
        .unwrap();

    let signals = read_parquet(&paths.signals_parquet).unwrap();
    assert_eq!(signals.dates(), result.signals.dates());
    assert_eq!(signals.column(SIGNAL), result.signals.column(SIGNAL));

    let mut reader = csv::Reader::from_path(&paths.signals_csv).unwrap();
    assert_eq!(reader.headers().unwrap().get(0), Some("date"));
    assert_eq!(reader.records().count(), result.signals.len());

    let mut fills = csv::Reader::from_path(&paths.fills_csv).unwrap();
    assert_eq!(
        fills.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["timestamp", "symbol", "price", "shares", "mid"]
    );
    let shares: u64 = fills
        .records()
        .map(|r| r.unwrap()[3].parse::<u64>().unwrap())
        .sum();
    assert_eq!(shares, 10_000);

    let attribution = csv::Reader::from_path(&paths.attribution_csv)
        .unwrap()
        .records()
        .count();
    assert_eq!(attribution, result.attribution.len());

    let stress: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.stress_json).unwrap()).unwrap();
    assert_eq!(stress["outcomes"].as_array().unwrap().len(), 3);
    let risk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.risk_json).unwrap()).unwrap();
    assert!((risk["exposure"]["DV01"].as_f64().unwrap() - 2_100.0).abs() < 1e-6);
}

#[test]
fn test_same_run_same_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::default();
    let manager = ArtifactManager::new(temp_dir.path()).unwrap();
    let a = manager.save_run(&run(&config), &config).unwrap();
    let b = manager.save_run(&run(&config), &config).unwrap();
    assert_eq!(a.run_dir, b.run_dir);
}
