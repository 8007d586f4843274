//! Columnar fill table handed to the attributor.
//!
//! Built from a fill sequence (`price`, `mid`, `shares`) and optionally
//! enriched with factor sensitivities. Extra columns ride along unused by the
//! baseline decomposition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::SchemaError;
use crate::domain::Fill;

pub const PRICE: &str = "price";
pub const MID: &str = "mid";
pub const SHARES: &str = "shares";
pub const NOTIONAL: &str = "notional";

/// Constant factor sensitivities stamped onto every fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enrichment {
    pub credit_duration: f64,
    pub vega: f64,
    pub beta: f64,
    /// `notional = notional_multiplier * price`.
    pub notional_multiplier: f64,
}

impl Default for Enrichment {
    fn default() -> Self {
        Self {
            credit_duration: 3.8,
            vega: 25_000.0,
            beta: 0.8,
            notional_multiplier: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FillFrame {
    timestamps: Vec<DateTime<Utc>>,
    columns: Vec<(String, Vec<f64>)>,
}

impl FillFrame {
    pub fn from_fills(fills: &[Fill]) -> Self {
        let timestamps = fills.iter().map(|f| f.timestamp).collect();
        let columns = vec![
            (PRICE.to_string(), fills.iter().map(|f| f.price).collect()),
            (MID.to_string(), fills.iter().map(|f| f.mid).collect()),
            (
                SHARES.to_string(),
                fills.iter().map(|f| f.shares as f64).collect(),
            ),
        ];
        Self {
            timestamps,
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Add or replace a column.
    pub fn with_column(
        self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(SchemaError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        Ok(self.set(name, values))
    }

    pub fn with_constant(self, name: impl Into<String>, value: f64) -> Self {
        let values = vec![value; self.len()];
        self.set(name.into(), values)
    }

    pub fn without_column(mut self, name: &str) -> Self {
        self.columns.retain(|(n, _)| n != name);
        self
    }

    /// Stamp the sensitivities on every row and derive `notional` from price.
    pub fn enrich(self, enrichment: &Enrichment) -> Self {
        let notional: Option<Vec<f64>> = self
            .column(PRICE)
            .map(|p| p.iter().map(|x| enrichment.notional_multiplier * x).collect());
        let frame = self
            .with_constant("credit_duration", enrichment.credit_duration)
            .with_constant("vega", enrichment.vega)
            .with_constant("beta", enrichment.beta);
        match notional {
            Some(notional) => frame.set(NOTIONAL.to_string(), notional),
            None => frame,
        }
    }

    fn set(mut self, name: String, values: Vec<f64>) -> Self {
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, col)) => *col = values,
            None => self.columns.push((name, values)),
        }
        self
    }
}
