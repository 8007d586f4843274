//! Performance metrics: pure functions over the attributed PnL series.
//!
//! The equity curve is `initial_capital` plus the cumulative PnL of the
//! attribution rows. Every metric is a pure function: series in, scalar out.

use serde::{Deserialize, Serialize};

/// Aggregate performance of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_pnl: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    /// See [`sharpe_ratio`].
    pub sharpe: f64,
    pub win_rate: f64,
    pub rows: usize,
}

impl PerformanceSummary {
    /// Compute all metrics from per-row PnL values.
    pub fn compute(pnl: &[f64], initial_capital: f64) -> Self {
        let equity = equity_curve(pnl, initial_capital);
        Self {
            total_pnl: pnl.iter().sum(),
            total_return: total_return(&equity),
            max_drawdown: max_drawdown(&equity),
            sharpe: sharpe_ratio(&equity, 0.0),
            win_rate: win_rate(pnl),
            rows: pnl.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// `initial_capital` followed by the running total of `pnl`.
pub fn equity_curve(pnl: &[f64], initial_capital: f64) -> Vec<f64> {
    let mut curve = Vec::with_capacity(pnl.len() + 1);
    let mut equity = initial_capital;
    curve.push(equity);
    for p in pnl {
        equity += p;
        curve.push(equity);
    }
    curve
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&initial), Some(&final_eq)) if equity_curve.len() >= 2 && initial > 0.0 => {
            (final_eq - initial) / initial
        }
        _ => 0.0,
    }
}

/// Annualized Sharpe ratio (sqrt(252) scaling). 0.0 for flat or short curves.
///
/// Computed on the step returns of the equity curve, not on the raw per-row
/// PnL: each row's PnL is divided by the equity before it, so the ratio is
/// relative to `initial_capital` as the curve grows or shrinks.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let daily_rf = risk_free_rate / 252.0;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();
    let mean = mean_f64(&excess);
    let std = std_dev(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * (252.0_f64).sqrt()
}

/// Maximum drawdown as a negative fraction (e.g. -0.2 for a 20% drawdown).
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Share of rows with strictly positive PnL.
pub fn win_rate(pnl: &[f64]) -> f64 {
    if pnl.is_empty() {
        return 0.0;
    }
    pnl.iter().filter(|p| **p > 0.0).count() as f64 / pnl.len() as f64
}

/// Step returns of an equity curve.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
