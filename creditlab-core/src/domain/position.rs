use serde::{Deserialize, Serialize};

/// One rates/credit exposure submitted for a risk check.
///
/// Every field is optional: the risk engine omits the metrics whose inputs are
/// missing instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub notional: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub spread_duration: Option<f64>,
}

impl Position {
    pub fn new(notional: f64, duration: f64, spread_duration: f64) -> Self {
        Self {
            notional: Some(notional),
            duration: Some(duration),
            spread_duration: Some(spread_duration),
        }
    }

    pub fn notional_only(notional: f64) -> Self {
        Self {
            notional: Some(notional),
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_spread_duration(mut self, spread_duration: f64) -> Self {
        self.spread_duration = Some(spread_duration);
        self
    }
}
