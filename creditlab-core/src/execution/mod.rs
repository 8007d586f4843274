//! Simulated execution of a parent order against a paper venue.
//!
//! - `twap`: the adaptive TWAP state machine
//! - `market`: mid and fill price models
//! - `clock`: injectable time source
//! - `cancel`: cooperative cancellation

pub mod cancel;
pub mod clock;
pub mod error;
pub mod market;
pub mod summary;
pub mod twap;

pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ExecutionError;
pub use market::{FixedMarket, GaussianMarket, MarketModel};
pub use summary::ExecutionSummary;
pub use twap::{AdaptiveTwap, TerminationReason, TwapConfig, TwapState};
