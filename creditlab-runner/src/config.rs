//! Serializable pipeline configuration.
//!
//! One TOML file describes a full run. Every section has defaults that
//! reproduce the reference research pipeline, so an empty file is valid.
//! Validation happens once, in [`PipelineConfig::build`]; the component
//! configs it hands out are immutable afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use creditlab_core::attribution::{
    BenchmarkMove, EntryReference, Enrichment, MarketMoveModel, NoMarketMove, PnLAttributor,
    SimulatedMove,
};
use creditlab_core::domain::{ConfigHash, Holding, PortfolioSnapshot, Position};
use creditlab_core::execution::TwapConfig;
use creditlab_core::risk::{RiskLimitEngine, RiskLimits};
use creditlab_core::rng::SeedHierarchy;
use creditlab_core::signal::{SignalConfig, SignalProcessor};
use creditlab_core::stress::{Scenario, ScenarioSet, StressSimulator};

/// Errors from loading or validating a pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] creditlab_core::ConfigError),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Complete configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub run: RunSection,
    pub signal: SignalConfig,
    pub risk: RiskSection,
    pub position: Position,
    pub execution: TwapConfig,
    pub attribution: AttributionSection,
    pub scenarios: Vec<Scenario>,
    pub portfolio: Vec<Holding>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            run: RunSection::default(),
            signal: SignalConfig::default(),
            risk: RiskSection::default(),
            position: Position::new(5_000_000.0, 4.2, 3.8),
            execution: TwapConfig::default(),
            attribution: AttributionSection::default(),
            scenarios: ScenarioSet::crisis_presets().scenarios().to_vec(),
            portfolio: PortfolioSnapshot::sample().holdings().to_vec(),
        }
    }
}

/// `[run]`: identity of the run and the parent order it executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub seed: u64,
    pub initial_capital: f64,
    /// Instrument the TWAP parent order trades.
    pub symbol: String,
    pub quantity: i64,
    /// Optional date window applied to the loaded table.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            seed: 42,
            initial_capital: 1_000_000.0,
            symbol: "LQD".into(),
            quantity: 10_000,
            start_date: None,
            end_date: None,
        }
    }
}

/// `[risk]`: absolute limits per metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub dv01: f64,
    pub cs01: f64,
    pub max_notional: f64,
}

impl Default for RiskSection {
    fn default() -> Self {
        let limits = RiskLimits::default();
        Self {
            dv01: limits.limit(creditlab_core::risk::RiskMetric::Dv01),
            cs01: limits.limit(creditlab_core::risk::RiskMetric::Cs01),
            max_notional: limits.limit(creditlab_core::risk::RiskMetric::MaxNotional),
        }
    }
}

/// How the market factor of the attribution is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketModelKind {
    /// `(mid - entry) * shares`.
    #[default]
    Benchmark,
    None,
    /// Seeded N(0, market_std_dev) draw per fill.
    Simulated,
}

/// `[attribution]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributionSection {
    pub entry: EntryReference,
    pub market_model: MarketModelKind,
    pub market_std_dev: f64,
    pub enrichment: Enrichment,
}

impl Default for AttributionSection {
    fn default() -> Self {
        Self {
            entry: EntryReference::default(),
            market_model: MarketModelKind::default(),
            market_std_dev: SimulatedMove::DEFAULT_STD_DEV,
            enrichment: Enrichment::default(),
        }
    }
}

/// Validated, ready-to-use components built from a [`PipelineConfig`].
pub struct Components {
    pub seeds: SeedHierarchy,
    pub signal: SignalProcessor,
    pub risk: RiskLimitEngine,
    pub position: Position,
    pub twap: TwapConfig,
    pub attributor: PnLAttributor,
    pub enrichment: Enrichment,
    pub stress: StressSimulator,
    pub portfolio: PortfolioSnapshot,
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string. Missing sections take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize back to TOML (used to record the effective config of a run).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deterministic BLAKE3 hash over the canonical JSON form.
    pub fn config_hash(&self) -> Result<ConfigHash, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(ConfigHash(blake3::hash(json.as_bytes()).to_hex().to_string()))
    }

    pub fn risk_limits(&self) -> Result<RiskLimits, ConfigError> {
        Ok(RiskLimits::new(
            self.risk.dv01,
            self.risk.cs01,
            self.risk.max_notional,
        )?)
    }

    pub fn scenario_set(&self) -> Result<ScenarioSet, ConfigError> {
        Ok(ScenarioSet::new(self.scenarios.clone())?)
    }

    pub fn portfolio_snapshot(&self) -> PortfolioSnapshot {
        PortfolioSnapshot::new(self.portfolio.clone())
    }

    /// Validate every section and build the components.
    pub fn build(&self) -> Result<Components, ConfigError> {
        let seeds = SeedHierarchy::new(self.run.seed);
        let signal = SignalProcessor::new(self.signal.clone())?;
        let risk = RiskLimitEngine::new(self.risk_limits()?);
        self.execution.validate()?;
        let stress = StressSimulator::new(self.scenario_set()?);

        let market: Box<dyn MarketMoveModel> = match self.attribution.market_model {
            MarketModelKind::Benchmark => Box::new(BenchmarkMove::new(self.attribution.entry)),
            MarketModelKind::None => Box::new(NoMarketMove),
            MarketModelKind::Simulated => Box::new(SimulatedMove::new(
                seeds.sub_seed("attribution", &self.run.symbol),
                self.attribution.market_std_dev,
            )?),
        };

        Ok(Components {
            seeds,
            signal,
            risk,
            position: self.position,
            twap: self.execution.clone(),
            attributor: PnLAttributor::new(market),
            enrichment: self.attribution.enrichment.clone(),
            stress,
            portfolio: self.portfolio_snapshot(),
        })
    }
}
