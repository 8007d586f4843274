//! Market factor of the PnL decomposition.
//!
//! The market component is what the position earned from the mid moving away
//! from the entry reference. `BenchmarkMove` measures it from the fills
//! themselves; `SimulatedMove` draws it from a seeded normal and exists to
//! reproduce exploratory runs.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::frame::{FillFrame, MID, SHARES};
use crate::config::ConfigError;

/// Per-row market PnL for a fill frame.
///
/// Always one value per row. NaN marks a row whose value is undefined; a
/// column the model needs being absent from the whole frame is not such a
/// row and yields zero instead.
pub trait MarketMoveModel: Send + Sync {
    fn market_moves(&self, frame: &FillFrame) -> Vec<f64>;

    fn name(&self) -> &str;
}

/// Price the market move is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum EntryReference {
    /// A fixed decision price.
    Price(f64),
    /// The mid observed at the first fill.
    #[default]
    FirstMid,
}

impl EntryReference {
    /// Resolve to a price for `frame`; `None` when it cannot be determined.
    pub fn resolve(&self, frame: &FillFrame) -> Option<f64> {
        match self {
            EntryReference::Price(p) => Some(*p),
            EntryReference::FirstMid => frame.column(MID).and_then(|m| m.first().copied()),
        }
    }
}

/// `(mid_i - entry_reference) * shares_i`, or zero for every row when the
/// frame carries no `mid` or no `shares` column.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BenchmarkMove {
    pub entry: EntryReference,
}

impl BenchmarkMove {
    pub fn new(entry: EntryReference) -> Self {
        Self { entry }
    }
}

impl MarketMoveModel for BenchmarkMove {
    fn market_moves(&self, frame: &FillFrame) -> Vec<f64> {
        let (Some(mid), Some(shares)) = (frame.column(MID), frame.column(SHARES)) else {
            return vec![0.0; frame.len()];
        };
        let Some(reference) = self.entry.resolve(frame) else {
            return vec![f64::NAN; frame.len()];
        };
        mid.iter()
            .zip(shares)
            .map(|(m, s)| (m - reference) * s)
            .collect()
    }

    fn name(&self) -> &str {
        "benchmark"
    }
}

/// Market factor switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarketMove;

impl MarketMoveModel for NoMarketMove {
    fn market_moves(&self, frame: &FillFrame) -> Vec<f64> {
        vec![0.0; frame.len()]
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Independent N(0, std_dev) draw per row from a fixed seed.
///
/// The same seed and frame length always give the same draws.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedMove {
    seed: u64,
    dist: Normal<f64>,
}

impl SimulatedMove {
    pub const DEFAULT_STD_DEV: f64 = 50.0;

    pub fn new(seed: u64, std_dev: f64) -> Result<Self, ConfigError> {
        let dist = Normal::new(0.0, std_dev).map_err(|e| {
            ConfigError::param("attribution.market_std_dev", format!("{e} (got {std_dev})"))
        })?;
        Ok(Self { seed, dist })
    }
}

impl MarketMoveModel for SimulatedMove {
    fn market_moves(&self, frame: &FillFrame) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..frame.len()).map(|_| self.dist.sample(&mut rng)).collect()
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
