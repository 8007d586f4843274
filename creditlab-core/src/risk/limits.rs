use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;

/// Risk metric names, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskMetric {
    #[serde(rename = "DV01")]
    Dv01,
    #[serde(rename = "CS01")]
    Cs01,
    MaxNotional,
}

impl RiskMetric {
    pub const ALL: [RiskMetric; 3] = [RiskMetric::Dv01, RiskMetric::Cs01, RiskMetric::MaxNotional];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskMetric::Dv01 => "DV01",
            RiskMetric::Cs01 => "CS01",
            RiskMetric::MaxNotional => "MaxNotional",
        }
    }
}

impl fmt::Display for RiskMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute thresholds per metric. Built once, validated, then read-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskLimits {
    dv01: f64,
    cs01: f64,
    max_notional: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            dv01: 100_000.0,
            cs01: 50_000.0,
            max_notional: 100_000_000.0,
        }
    }
}

impl RiskLimits {
    /// Every threshold must be finite and non-negative.
    pub fn new(dv01: f64, cs01: f64, max_notional: f64) -> Result<Self, ConfigError> {
        let limits = Self {
            dv01,
            cs01,
            max_notional,
        };
        for metric in RiskMetric::ALL {
            let value = limits.limit(metric);
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidLimit {
                    metric: metric.to_string(),
                    value,
                });
            }
        }
        Ok(limits)
    }

    pub fn limit(&self, metric: RiskMetric) -> f64 {
        match metric {
            RiskMetric::Dv01 => self.dv01,
            RiskMetric::Cs01 => self.cs01,
            RiskMetric::MaxNotional => self.max_notional,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskMetric, f64)> + '_ {
        RiskMetric::ALL.into_iter().map(|m| (m, self.limit(m)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let l = RiskLimits::default();
        assert_eq!(l.limit(RiskMetric::Dv01), 100_000.0);
        assert_eq!(l.limit(RiskMetric::Cs01), 50_000.0);
        assert_eq!(l.limit(RiskMetric::MaxNotional), 1e8);
    }

    #[test]
    fn rejects_non_finite_and_negative() {
        assert!(matches!(
            RiskLimits::new(f64::NAN, 1.0, 1.0),
            Err(ConfigError::InvalidLimit { ref metric, .. }) if metric == "DV01"
        ));
        assert!(matches!(
            RiskLimits::new(1.0, 1.0, -5.0),
            Err(ConfigError::InvalidLimit { ref metric, .. }) if metric == "MaxNotional"
        ));
        assert!(RiskLimits::new(0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn metric_names_serialize_as_report_labels() {
        assert_eq!(serde_json::to_string(&RiskMetric::Dv01).unwrap(), "\"DV01\"");
        assert_eq!(
            serde_json::to_string(&RiskMetric::MaxNotional).unwrap(),
            "\"MaxNotional\""
        );
    }
}
