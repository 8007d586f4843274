//! Validation errors for the immutable component configurations.
//!
//! Every configuration struct (risk limits, scenario set, signal and TWAP
//! parameters) is validated once when it is built. A `ConfigError` is fatal:
//! nothing is computed with a configuration that failed validation.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("limit {metric} must be finite and non-negative, got {value}")]
    InvalidLimit { metric: String, value: f64 },

    #[error("scenario set is empty")]
    EmptyScenarioSet,

    #[error("duplicate scenario name: {0}")]
    DuplicateScenario(String),

    #[error("scenario '{scenario}': {field} must be finite, got {value}")]
    InvalidShock {
        scenario: String,
        field: &'static str,
        value: f64,
    },

    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn param(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let e = ConfigError::param("window", "must be at least 2");
        assert_eq!(e.to_string(), "invalid parameter window: must be at least 2");

        let e = ConfigError::InvalidShock {
            scenario: "2008 Crisis".into(),
            field: "equity_shock",
            value: f64::NAN,
        };
        assert!(e.to_string().contains("2008 Crisis"));
    }
}
