//! Portfolio snapshot: the holdings a stress run is evaluated against.

use serde::{Deserialize, Serialize};

/// One line of a portfolio snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: f64,
    pub price: f64,
    /// Credit spread in the same units the scenarios widen it by.
    pub spread: f64,
    #[serde(default = "default_liquidity_factor")]
    pub liquidity_factor: f64,
}

fn default_liquidity_factor() -> f64 {
    1.0
}

impl Holding {
    pub fn new(symbol: impl Into<String>, shares: f64, price: f64, spread: f64) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            price,
            spread,
            liquidity_factor: default_liquidity_factor(),
        }
    }

    pub fn with_liquidity_factor(mut self, liquidity_factor: f64) -> Self {
        self.liquidity_factor = liquidity_factor;
        self
    }

    pub fn market_value(&self) -> f64 {
        self.price * self.shares
    }
}

/// Ordered holdings. Shocks produce a new snapshot; the baseline is never
/// modified in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    holdings: Vec<Holding>,
}

impl PortfolioSnapshot {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Sum of `price * shares` over all holdings.
    pub fn market_value(&self) -> f64 {
        self.holdings.iter().map(Holding::market_value).sum()
    }

    /// Build a new snapshot by transforming every holding of this one.
    pub fn map_holdings<F>(&self, f: F) -> Self
    where
        F: Fn(&Holding) -> Holding,
    {
        Self {
            holdings: self.holdings.iter().map(f).collect(),
        }
    }

    /// The two-line SPY/TLT book the reference stress run uses.
    pub fn sample() -> Self {
        Self::new(vec![
            Holding::new("SPY", 1000.0, 400.0, 0.01).with_liquidity_factor(0.95),
            Holding::new("TLT", 2000.0, 120.0, 0.02).with_liquidity_factor(0.85),
        ])
    }
}

impl FromIterator<Holding> for PortfolioSnapshot {
    fn from_iter<I: IntoIterator<Item = Holding>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
