//! Position exposures and limit checks.

pub mod engine;
pub mod limits;

pub use engine::{Exposure, LimitStatus, RiskLimitEngine};
pub use limits::{RiskLimits, RiskMetric};

/// Value of one basis point.
pub const BASIS_POINT: f64 = 0.0001;
