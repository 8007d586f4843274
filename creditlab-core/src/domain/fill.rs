use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One simulated partial execution of a parent order.
///
/// Fills are appended in execution order and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
    pub shares: u64,
    pub mid: f64,
}

impl Fill {
    /// Traded notional of the slice at the fill price.
    pub fn notional(&self) -> f64 {
        self.price * self.shares as f64
    }

    /// Signed cost versus mid for a buy slice (positive = paid above mid).
    pub fn slippage_vs_mid(&self) -> f64 {
        (self.price - self.mid) * self.shares as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn notional_uses_fill_price() {
        assert_eq!(fill(100.5, 100.0, 200).notional(), 20_100.0);
    }

    #[test]
    fn slippage_sign_follows_price_minus_mid() {
        assert!(fill(100.01, 100.0, 500).slippage_vs_mid() > 0.0);
        assert!(fill(99.99, 100.0, 500).slippage_vs_mid() < 0.0);
        assert_eq!(fill(100.0, 100.0, 500).slippage_vs_mid(), 0.0);
    }
}
