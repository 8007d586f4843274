//! PnLAttributor: per-fill decomposition into Execution and Market.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::frame::{FillFrame, MID, PRICE, SHARES};
use super::market_move::{BenchmarkMove, MarketMoveModel};
use crate::domain::Fill;

/// One fill's PnL split into mutually exclusive factor buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttributionRow {
    pub timestamp: DateTime<Utc>,
    pub execution: f64,
    pub market: f64,
}

impl AttributionRow {
    pub fn total(&self) -> f64 {
        self.execution + self.market
    }
}

pub struct PnLAttributor {
    market: Box<dyn MarketMoveModel>,
}

impl Default for PnLAttributor {
    fn default() -> Self {
        Self::new(Box::new(BenchmarkMove::default()))
    }
}

impl std::fmt::Debug for PnLAttributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PnLAttributor")
            .field("market", &self.market.name())
            .finish()
    }
}

impl PnLAttributor {
    pub fn new(market: Box<dyn MarketMoveModel>) -> Self {
        Self { market }
    }

    pub fn market_model(&self) -> &str {
        self.market.name()
    }

    /// One row per fill, rows with an undefined factor dropped.
    ///
    /// `Execution = (price - mid) * shares` when the frame carries all three
    /// columns; when any of them is absent it is zero for every row.
    pub fn attribute(&self, frame: &FillFrame) -> Vec<AttributionRow> {
        let execution = execution_component(frame);
        let market = self.market.market_moves(frame);

        let rows: Vec<AttributionRow> = frame
            .timestamps()
            .iter()
            .zip(execution)
            .zip(market)
            .filter(|((_, e), m)| e.is_finite() && m.is_finite())
            .map(|((ts, execution), market)| AttributionRow {
                timestamp: *ts,
                execution,
                market,
            })
            .collect();

        debug!(
            fills = frame.len(),
            rows = rows.len(),
            market_model = self.market.name(),
            "pnl attributed"
        );
        rows
    }
}

fn execution_component(frame: &FillFrame) -> Vec<f64> {
    match (frame.column(PRICE), frame.column(MID), frame.column(SHARES)) {
        (Some(price), Some(mid), Some(shares)) => price
            .iter()
            .zip(mid)
            .zip(shares)
            .map(|((p, m), s)| (p - m) * s)
            .collect(),
        _ => vec![0.0; frame.len()],
    }
}

/// Realized PnL of the fills against an entry price: `sum((price - entry) * shares)`.
pub fn realized_pnl(fills: &[Fill], entry_reference: f64) -> f64 {
    fills
        .iter()
        .map(|f| (f.price - entry_reference) * f.shares as f64)
        .sum()
}

/// Factor totals over an attribution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AttributionSummary {
    pub rows: usize,
    pub execution: f64,
    pub market: f64,
    pub total: f64,
}

impl AttributionSummary {
    pub fn from_rows(rows: &[AttributionRow]) -> Self {
        let execution: f64 = rows.iter().map(|r| r.execution).sum();
        let market: f64 = rows.iter().map(|r| r.market).sum();
        Self {
            rows: rows.len(),
            execution,
            market,
            total: execution + market,
        }
    }
}

/// Running sum of per-row total PnL.
pub fn cumulative_pnl(rows: &[AttributionRow]) -> Vec<f64> {
    rows.iter()
        .scan(0.0, |acc, r| {
            *acc += r.total();
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::market_move::{EntryReference, NoMarketMove, SimulatedMove};
    use chrono::TimeZone;

    fn fill(i: i64, price: f64, mid: f64, shares: u64) -> Fill {
        Fill {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap()
                + chrono::Duration::milliseconds(100 * i),
            symbol: "LQD".into(),
            price,
            shares,
            mid,
        }
    }

    fn sample() -> Vec<Fill> {
        vec![
            fill(0, 100.01, 100.00, 500),
            fill(1, 99.98, 100.05, 500),
            fill(2, 100.12, 100.10, 234),
        ]
    }

    #[test]
    fn execution_is_price_minus_mid_times_shares() {
        let rows = PnLAttributor::new(Box::new(NoMarketMove))
            .attribute(&FillFrame::from_fills(&sample()));
        assert_eq!(rows.len(), 3);
        assert!((rows[0].execution - 5.0).abs() < 1e-9);
        assert!((rows[1].execution + 35.0).abs() < 1e-9);
        assert!(rows.iter().all(|r| r.market == 0.0));
    }

    #[test]
    fn price_at_mid_means_zero_execution() {
        let fills: Vec<Fill> = (0..4).map(|i| fill(i, 100.3, 100.3, 700)).collect();
        let rows = PnLAttributor::default().attribute(&FillFrame::from_fills(&fills));
        assert!(rows.iter().all(|r| r.execution == 0.0));
    }

    #[test]
    fn missing_column_zeroes_execution_everywhere() {
        let frame = FillFrame::from_fills(&sample()).without_column(PRICE);
        let rows = PnLAttributor::default().attribute(&frame);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.execution == 0.0));
    }

    #[test]
    fn missing_mid_keeps_every_row() {
        let frame = FillFrame::from_fills(&sample()).without_column(MID);
        let rows = PnLAttributor::default().attribute(&frame);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.execution == 0.0 && r.market == 0.0));
    }

    #[test]
    fn missing_shares_keeps_every_row() {
        let frame = FillFrame::from_fills(&sample()).without_column(SHARES);
        let rows = PnLAttributor::new(Box::new(BenchmarkMove::new(EntryReference::Price(99.9))))
            .attribute(&frame);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.execution == 0.0 && r.market == 0.0));
        assert_eq!(rows[2].timestamp, sample()[2].timestamp);
    }

    #[test]
    fn factors_sum_to_realized_pnl() {
        let fills = sample();
        let entry = 99.9;
        let rows = PnLAttributor::new(Box::new(BenchmarkMove::new(EntryReference::Price(entry))))
            .attribute(&FillFrame::from_fills(&fills));
        let summary = AttributionSummary::from_rows(&rows);
        assert!((summary.total - realized_pnl(&fills, entry)).abs() < 1e-9);
    }

    #[test]
    fn undefined_rows_are_dropped() {
        let frame = FillFrame::from_fills(&sample())
            .with_column(MID, vec![100.0, f64::NAN, 100.1])
            .unwrap();
        let rows = PnLAttributor::default().attribute(&frame);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].timestamp, sample()[2].timestamp);
    }

    #[test]
    fn enrichment_does_not_change_decomposition() {
        let plain = FillFrame::from_fills(&sample());
        let enriched = plain.clone().enrich(&Default::default());
        let a = PnLAttributor::default();
        assert_eq!(a.attribute(&plain), a.attribute(&enriched));
    }

    #[test]
    fn simulated_market_is_seeded() {
        let frame = FillFrame::from_fills(&sample());
        let a = PnLAttributor::new(Box::new(SimulatedMove::new(7, 50.0).unwrap()));
        assert_eq!(a.attribute(&frame), a.attribute(&frame));
    }

    #[test]
    fn cumulative_pnl_is_running_total() {
        let rows = PnLAttributor::new(Box::new(NoMarketMove))
            .attribute(&FillFrame::from_fills(&sample()));
        let cum = cumulative_pnl(&rows);
        assert_eq!(cum.len(), 3);
        assert!((cum[2] - AttributionSummary::from_rows(&rows).total).abs() < 1e-12);
    }

    #[test]
    fn empty_input_empty_output() {
        let rows = PnLAttributor::default().attribute(&FillFrame::from_fills(&[]));
        assert!(rows.is_empty());
        assert_eq!(AttributionSummary::from_rows(&rows).total, 0.0);
    }
}
