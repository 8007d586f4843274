use serde::Serialize;

use super::twap::TerminationReason;
use crate::domain::Fill;

/// Aggregate view of one parent order's fills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionSummary {
    pub symbol: String,
    pub requested: i64,
    pub filled: u64,
    pub fill_count: usize,
    /// Volume-weighted fill price; `None` without fills.
    pub vwap: Option<f64>,
    pub avg_mid: Option<f64>,
    /// Total paid above mid across all slices.
    pub shortfall: f64,
    pub termination: Option<TerminationReason>,
}

impl ExecutionSummary {
    pub fn from_fills(
        symbol: &str,
        requested: i64,
        fills: &[Fill],
        termination: Option<TerminationReason>,
    ) -> Self {
        let filled: u64 = fills.iter().map(|f| f.shares).sum();
        let (vwap, avg_mid) = if filled > 0 {
            let shares = filled as f64;
            let px: f64 = fills.iter().map(|f| f.price * f.shares as f64).sum();
            let mid: f64 = fills.iter().map(|f| f.mid * f.shares as f64).sum();
            (Some(px / shares), Some(mid / shares))
        } else {
            (None, None)
        };
        Self {
            symbol: symbol.to_string(),
            requested,
            filled,
            fill_count: fills.len(),
            vwap,
            avg_mid,
            shortfall: fills.iter().map(Fill::slippage_vs_mid).sum(),
            termination,
        }
    }

    /// Share of the requested quantity that was filled (0 for empty orders).
    pub fn fill_ratio(&self) -> f64 {
        if self.requested <= 0 {
            0.0
        } else {
            self.filled as f64 / self.requested as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn fill(price: f64, mid: f64, shares: u64) -> Fill {
        Fill {
            timestamp: Utc::now(),
            symbol: "LQD".into(),
            price,
            shares,
            mid,
        }
    }

    #[test]
    fn vwap_weights_by_shares() {
        let fills = [fill(100.0, 100.0, 100), fill(101.0, 100.5, 300)];
        let s = ExecutionSummary::from_fills("LQD", 400, &fills, Some(TerminationReason::Completed));
        assert!((s.vwap.unwrap() - 100.75).abs() < 1e-12);
        assert!((s.avg_mid.unwrap() - 100.375).abs() < 1e-12);
        assert!((s.shortfall - 150.0).abs() < 1e-9);
        assert_eq!(s.fill_ratio(), 1.0);
    }

    #[test]
    fn empty_order_has_no_prices() {
        let s = ExecutionSummary::from_fills("LQD", 0, &[], Some(TerminationReason::NothingToDo));
        assert_eq!(s.vwap, None);
        assert_eq!(s.filled, 0);
        assert_eq!(s.fill_ratio(), 0.0);
    }
}
