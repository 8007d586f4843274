//! Required columns of the merged market/macro table, and the schema error type.

use chrono::NaiveDate;

/// Column names the signal pipeline reads from the merged table.
///
/// Defaults match the merged FRED/ETF layout: `baa_10y`, `aaa_10y`,
/// `10y_yield`, `2y_yield`, `vix`, plus the four ETF closes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MacroSchema {
    pub baa_yield: String,
    pub aaa_yield: String,
    pub long_yield: String,
    pub short_yield: String,
    pub volatility_index: String,
    pub instruments: Vec<String>,
}

impl Default for MacroSchema {
    fn default() -> Self {
        Self {
            baa_yield: "baa_10y".into(),
            aaa_yield: "aaa_10y".into(),
            long_yield: "10y_yield".into(),
            short_yield: "2y_yield".into(),
            volatility_index: "vix".into(),
            instruments: vec!["SPY".into(), "TLT".into(), "HYG".into(), "LQD".into()],
        }
    }
}

impl MacroSchema {
    /// Macro series the spread computation cannot do without.
    pub fn macro_columns(&self) -> [&str; 5] {
        [
            &self.baa_yield,
            &self.aaa_yield,
            &self.long_yield,
            &self.short_yield,
            &self.volatility_index,
        ]
    }

    /// Every column the merged table is expected to carry.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = self.instruments.iter().map(String::as_str).collect();
        cols.extend(self.macro_columns());
        cols
    }

    /// Check that a table carries every macro series.
    ///
    /// Instrument prices are carried through untouched, so only the macro
    /// series are mandatory for signal construction.
    pub fn validate(&self, table: &super::TimeSeriesTable) -> Result<(), SchemaError> {
        for name in self.macro_columns() {
            if !table.has_column(name) {
                return Err(SchemaError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Column {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Timestamps must be strictly increasing: {current} follows {previous} at row {index}")]
    NonMonotonicDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Type mismatch in column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Null date at row {0}")]
    NullDate(usize),

    #[error("polars error: {0}")]
    Polars(String),
}
