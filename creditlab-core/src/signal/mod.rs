//! Regime-normalized credit signal construction.

pub mod processor;
pub mod rolling;

pub use processor::{SignalConfig, SignalProcessor};
pub use rolling::{rolling_zscore, RollingWindow};

/// Derived column: Baa minus Aaa yield.
pub const QUALITY_SPREAD: &str = "quality_spread";
/// Derived column: long minus short treasury yield.
pub const TERM_SPREAD: &str = "term_spread";
pub const QUALITY_SPREAD_Z: &str = "quality_spread_z";
pub const TERM_SPREAD_Z: &str = "term_spread_z";
/// Composite signal column.
pub const SIGNAL: &str = "signal";

/// Name of the z-score column derived from `column`.
pub fn zscore_column(column: &str) -> String {
    format!("{column}_z")
}
