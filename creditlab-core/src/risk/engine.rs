//! RiskLimitEngine: exposures from a position and limit-violation flags.
//!
//! Pure and total. A metric whose inputs are missing is left out of the
//! exposure and reported as "no violation" by the limit check.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use super::limits::{RiskLimits, RiskMetric};
use super::BASIS_POINT;
use crate::domain::Position;

/// Signed monetary exposure per metric, recomputed on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Exposure(BTreeMap<RiskMetric, f64>);

impl Exposure {
    pub fn get(&self, metric: RiskMetric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    pub fn contains(&self, metric: RiskMetric) -> bool {
        self.0.contains_key(&metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskMetric, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One line of the limit monitoring report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitStatus {
    pub metric: RiskMetric,
    /// Current exposure; 0 when the metric could not be computed.
    pub value: f64,
    pub limit: f64,
    pub violated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RiskLimitEngine {
    limits: RiskLimits,
}

impl RiskLimitEngine {
    pub fn new(limits: RiskLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    pub fn calculate_exposures(&self, position: &Position) -> Exposure {
        let mut exposure = BTreeMap::new();
        exposure.insert(RiskMetric::MaxNotional, position.notional.unwrap_or(0.0));

        if let (Some(notional), Some(duration)) = (position.notional, position.duration) {
            exposure.insert(RiskMetric::Dv01, notional * BASIS_POINT * duration);
        }
        if let (Some(notional), Some(spread_duration)) =
            (position.notional, position.spread_duration)
        {
            exposure.insert(RiskMetric::Cs01, notional * BASIS_POINT * spread_duration);
        }
        Exposure(exposure)
    }

    /// `true` per metric iff the exposure is present and `|exposure| > limit`.
    ///
    /// Every limited metric appears in the result.
    pub fn check_limits(&self, position: &Position) -> BTreeMap<RiskMetric, bool> {
        let exposure = self.calculate_exposures(position);
        self.limits
            .iter()
            .map(|(metric, limit)| {
                let violated = exposure.get(metric).is_some_and(|v| v.abs() > limit);
                (metric, violated)
            })
            .collect()
    }

    /// Value, limit and status for every limited metric.
    pub fn limit_report(&self, position: &Position) -> Vec<LimitStatus> {
        let exposure = self.calculate_exposures(position);
        self.limits
            .iter()
            .map(|(metric, limit)| {
                let current = exposure.get(metric);
                let violated = current.is_some_and(|v| v.abs() > limit);
                let value = current.unwrap_or(0.0);
                if violated {
                    warn!(%metric, value, limit, "risk limit breached");
                }
                LimitStatus {
                    metric,
                    value,
                    limit,
                    violated,
                }
            })
            .collect()
    }
}
