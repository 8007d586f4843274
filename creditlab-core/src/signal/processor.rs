//! SignalProcessor: spreads, rolling z-scores and the composite signal.
//!
//! Output columns, appended to the input table:
//! `quality_spread`, `term_spread`, `quality_spread_z`, `term_spread_z`,
//! `{volatility_index}_z` and `signal`. Rows where any column is undefined
//! are dropped, so the first `window - 1` rows never survive. An input shorter
//! than the window yields an empty table, which is a valid result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::rolling::rolling_zscore;
use super::{zscore_column, QUALITY_SPREAD, QUALITY_SPREAD_Z, SIGNAL, TERM_SPREAD, TERM_SPREAD_Z};
use crate::config::ConfigError;
use crate::data::{MacroSchema, SchemaError, TimeSeriesTable};

/// Parameters of the signal construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Trailing observations per rolling statistic, current row included.
    pub window: usize,
    pub quality_weight: f64,
    pub term_weight: f64,
    pub schema: MacroSchema,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            window: 126,
            quality_weight: 0.7,
            term_weight: 0.3,
            schema: MacroSchema::default(),
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window < 2 {
            return Err(ConfigError::param(
                "signal.window",
                format!("must be at least 2, got {}", self.window),
            ));
        }
        if !self.quality_weight.is_finite() {
            return Err(ConfigError::param("signal.quality_weight", "must be finite"));
        }
        if !self.term_weight.is_finite() {
            return Err(ConfigError::param("signal.term_weight", "must be finite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SignalProcessor {
    config: SignalConfig,
}

impl SignalProcessor {
    pub fn new(config: SignalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Names of the columns this processor appends.
    pub fn derived_columns(&self) -> Vec<String> {
        vec![
            QUALITY_SPREAD.to_string(),
            TERM_SPREAD.to_string(),
            QUALITY_SPREAD_Z.to_string(),
            TERM_SPREAD_Z.to_string(),
            zscore_column(&self.config.schema.volatility_index),
            SIGNAL.to_string(),
        ]
    }

    /// Derive the signal columns and drop every row left undefined.
    ///
    /// Fails only when a required macro series is missing.
    pub fn process(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable, SchemaError> {
        let schema = &self.config.schema;
        schema.validate(table)?;

        let window = self.config.window;
        if table.len() < window {
            warn!(
                rows = table.len(),
                window, "insufficient history for rolling statistics; signal is empty"
            );
        }

        let quality: Vec<f64> = difference(
            table.require(&schema.baa_yield)?,
            table.require(&schema.aaa_yield)?,
        );
        let term: Vec<f64> = difference(
            table.require(&schema.long_yield)?,
            table.require(&schema.short_yield)?,
        );
        let vol = table.require(&schema.volatility_index)?;

        let quality_z = rolling_zscore(&quality, window);
        let term_z = rolling_zscore(&term, window);
        let vol_z = rolling_zscore(vol, window);

        let (wq, wt) = (self.config.quality_weight, self.config.term_weight);
        let signal: Vec<f64> = quality_z
            .iter()
            .zip(&term_z)
            .map(|(q, t)| wq * q + wt * t)
            .collect();

        let vol_z_name = zscore_column(&schema.volatility_index);
        let out = table
            .clone()
            .with_column(QUALITY_SPREAD, quality)?
            .with_column(TERM_SPREAD, term)?
            .with_column(QUALITY_SPREAD_Z, quality_z)?
            .with_column(TERM_SPREAD_Z, term_z)?
            .with_column(vol_z_name, vol_z)?
            .with_column(SIGNAL, signal)?
            .drop_incomplete();

        debug!(
            input_rows = table.len(),
            output_rows = out.len(),
            "signal processed"
        );
        Ok(out)
    }
}

fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
