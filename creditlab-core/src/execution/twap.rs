//! Adaptive TWAP simulator.
//!
//! One parent order per simulator. The state machine is
//! `Idle -> Slicing -> Done`: slicing continues while shares remain, the time
//! budget is not spent and nobody has cancelled. Each slice samples a mid,
//! sizes the slice from the participation heuristic, samples a fill price
//! around the mid and records a [`Fill`] stamped with the clock's time. The
//! loop then pauses for the pacing interval before the next slice.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::clock::{Clock, SystemClock};
use super::error::ExecutionError;
use super::market::{GaussianMarket, MarketModel};
use crate::config::ConfigError;
use crate::domain::Fill;
use crate::rng::SeedHierarchy;

/// Slicing and market parameters of a TWAP run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwapConfig {
    /// Wall-clock budget for the whole parent order.
    pub duration_ms: u64,
    /// Pacing interval between slices.
    pub pause_ms: u64,
    /// Fraction of expected volume taken per slice.
    pub participation_rate: f64,
    /// Nominal traded volume the participation rate applies to.
    pub expected_volume: f64,
    /// Smallest slice, in shares.
    pub min_slice: u64,
    pub reference_price: f64,
    /// Standard deviation of the mid around the reference price.
    pub mid_noise: f64,
    /// Fill price is drawn uniformly within this distance of the mid.
    pub impact_half_width: f64,
}

impl Default for TwapConfig {
    fn default() -> Self {
        Self {
            duration_ms: 5 * 60 * 1000,
            pause_ms: 100,
            participation_rate: 0.0005,
            expected_volume: 1_000_000.0,
            min_slice: 100,
            reference_price: 100.0,
            mid_noise: 0.1,
            impact_half_width: 0.01,
        }
    }
}

impl TwapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_ms == 0 {
            return Err(ConfigError::param("execution.duration_ms", "must be positive"));
        }
        if self.pause_ms == 0 {
            return Err(ConfigError::param("execution.pause_ms", "must be positive"));
        }
        if !(self.participation_rate.is_finite() && self.participation_rate > 0.0) {
            return Err(ConfigError::param(
                "execution.participation_rate",
                format!("must be finite and positive, got {}", self.participation_rate),
            ));
        }
        if !(self.expected_volume.is_finite() && self.expected_volume > 0.0) {
            return Err(ConfigError::param(
                "execution.expected_volume",
                format!("must be finite and positive, got {}", self.expected_volume),
            ));
        }
        if self.min_slice == 0 {
            return Err(ConfigError::param("execution.min_slice", "must be at least 1 share"));
        }
        if !(self.mid_noise.is_finite() && self.mid_noise >= 0.0) {
            return Err(ConfigError::param(
                "execution.mid_noise",
                format!("must be finite and non-negative, got {}", self.mid_noise),
            ));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms as i64)
    }

    pub fn pause(&self) -> StdDuration {
        StdDuration::from_millis(self.pause_ms)
    }

    /// Target slice size before capping at the remaining quantity.
    ///
    /// `participation_rate * expected_volume`, rounded to whole shares and
    /// floored at `min_slice`.
    pub fn target_slice(&self) -> u64 {
        let target = (self.participation_rate * self.expected_volume).round();
        (target as u64).max(self.min_slice)
    }

    pub fn slice_size(&self, remaining: u64) -> u64 {
        remaining.min(self.target_slice())
    }

    /// The default Gaussian market model for this configuration.
    pub fn gaussian_market(
        &self,
        seeds: &SeedHierarchy,
        symbol: &str,
    ) -> Result<GaussianMarket, ConfigError> {
        GaussianMarket::new(
            self.reference_price,
            self.mid_noise,
            self.impact_half_width,
            seeds.rng_for("execution", symbol),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every share was filled.
    Completed,
    TimeBudgetExhausted,
    Cancelled,
    /// Quantity was zero or negative; nothing was sliced.
    NothingToDo,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationReason::Completed => "completed",
            TerminationReason::TimeBudgetExhausted => "time budget exhausted",
            TerminationReason::Cancelled => "cancelled",
            TerminationReason::NothingToDo => "nothing to do",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwapState {
    Idle,
    Slicing,
    Done(TerminationReason),
    Failed,
}

pub struct AdaptiveTwap {
    symbol: String,
    quantity: i64,
    config: TwapConfig,
    market: Box<dyn MarketModel>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    state: TwapState,
    fills: Vec<Fill>,
}

impl fmt::Debug for AdaptiveTwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveTwap")
            .field("symbol", &self.symbol)
            .field("quantity", &self.quantity)
            .field("market", &self.market.name())
            .field("state", &self.state)
            .field("fills", &self.fills.len())
            .finish()
    }
}

impl AdaptiveTwap {
    /// New simulator in the `Idle` state, on the system clock.
    pub fn new(
        symbol: impl Into<String>,
        quantity: i64,
        config: TwapConfig,
        market: Box<dyn MarketModel>,
    ) -> Result<Self, ExecutionError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(ExecutionError::EmptySymbol);
        }
        config.validate()?;
        Ok(Self {
            symbol,
            quantity,
            config,
            market,
            clock: Arc::new(SystemClock),
            cancel: CancellationToken::new(),
            state: TwapState::Idle,
            fills: Vec::new(),
        })
    }

    /// Simulator with the Gaussian market seeded for this symbol.
    pub fn seeded(
        symbol: impl Into<String>,
        quantity: i64,
        config: TwapConfig,
        seeds: &SeedHierarchy,
    ) -> Result<Self, ExecutionError> {
        let symbol = symbol.into();
        let market = config.gaussian_market(seeds, &symbol)?;
        Self::new(symbol, quantity, config, Box::new(market))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn state(&self) -> TwapState {
        self.state
    }

    /// Fills recorded so far, including those of a run that failed.
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        match self.state {
            TwapState::Done(reason) => Some(reason),
            _ => None,
        }
    }

    /// Run the parent order to completion and return its fills.
    ///
    /// A backwards clock aborts the run with [`ExecutionError::ClockAnomaly`];
    /// fills recorded before that remain available through [`fills`](Self::fills).
    pub fn execute(&mut self) -> Result<Vec<Fill>, ExecutionError> {
        if self.state != TwapState::Idle {
            return Err(ExecutionError::AlreadyExecuted);
        }
        if self.quantity <= 0 {
            debug!(symbol = %self.symbol, quantity = self.quantity, "nothing to execute");
            self.state = TwapState::Done(TerminationReason::NothingToDo);
            return Ok(Vec::new());
        }

        self.state = TwapState::Slicing;
        let mut remaining = self.quantity as u64;
        let budget = self.config.duration();
        let start = self.clock.now();
        let mut last = start;

        let reason = loop {
            let now = self.clock.now();
            if now < last {
                self.state = TwapState::Failed;
                return Err(ExecutionError::ClockAnomaly {
                    previous: last,
                    current: now,
                });
            }
            last = now;

            if remaining == 0 {
                break TerminationReason::Completed;
            }
            if self.cancel.is_cancelled() {
                break TerminationReason::Cancelled;
            }
            if now - start >= budget {
                break TerminationReason::TimeBudgetExhausted;
            }

            let mid = self.market.sample_mid();
            let shares = self.config.slice_size(remaining);
            let price = self.market.sample_fill(mid);
            self.fills.push(Fill {
                timestamp: now,
                symbol: self.symbol.clone(),
                price,
                shares,
                mid,
            });
            remaining -= shares;
            debug!(
                symbol = %self.symbol,
                slice = self.fills.len(),
                shares,
                price,
                mid,
                remaining,
                "slice filled"
            );

            if remaining > 0 {
                self.clock.pause(self.config.pause());
            }
        };

        self.state = TwapState::Done(reason);
        match reason {
            TerminationReason::Completed => info!(
                symbol = %self.symbol,
                fills = self.fills.len(),
                "parent order completed"
            ),
            _ => warn!(
                symbol = %self.symbol,
                fills = self.fills.len(),
                remaining,
                %reason,
                "parent order stopped early"
            ),
        }
        Ok(self.fills.clone())
    }
}
