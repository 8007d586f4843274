//! Market models: where mid prices and fill prices come from.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::ConfigError;

/// Source of mid and fill prices for one simulated parent order.
pub trait MarketModel: Send + Sync {
    /// Sample the mid price for the next slice.
    fn sample_mid(&mut self) -> f64;

    /// Sample the execution price of a slice given its mid.
    fn sample_fill(&mut self, mid: f64) -> f64;

    fn name(&self) -> &str;
}

/// Mid = reference + N(0, mid_noise); fill = mid + U(-half_width, half_width).
#[derive(Debug, Clone)]
pub struct GaussianMarket {
    reference: f64,
    half_width: f64,
    noise: Normal<f64>,
    rng: StdRng,
}

impl GaussianMarket {
    pub fn new(
        reference: f64,
        mid_noise: f64,
        half_width: f64,
        rng: StdRng,
    ) -> Result<Self, ConfigError> {
        if !reference.is_finite() || reference <= 0.0 {
            return Err(ConfigError::param(
                "execution.reference_price",
                format!("must be finite and positive, got {reference}"),
            ));
        }
        if !half_width.is_finite() || half_width < 0.0 {
            return Err(ConfigError::param(
                "execution.impact_half_width",
                format!("must be finite and non-negative, got {half_width}"),
            ));
        }
        let noise = Normal::new(0.0, mid_noise).map_err(|e| {
            ConfigError::param("execution.mid_noise", format!("{e} (got {mid_noise})"))
        })?;
        Ok(Self {
            reference,
            half_width,
            noise,
            rng,
        })
    }
}

impl MarketModel for GaussianMarket {
    fn sample_mid(&mut self) -> f64 {
        self.reference + self.noise.sample(&mut self.rng)
    }

    fn sample_fill(&mut self, mid: f64) -> f64 {
        if self.half_width == 0.0 {
            return mid;
        }
        mid + self.rng.gen_range(-self.half_width..=self.half_width)
    }

    fn name(&self) -> &str {
        "gaussian"
    }
}

/// Constant mid with a fixed price offset per fill.
#[derive(Debug, Clone, Copy)]
pub struct FixedMarket {
    pub mid: f64,
    pub offset: f64,
}

impl FixedMarket {
    pub fn at_mid(mid: f64) -> Self {
        Self { mid, offset: 0.0 }
    }
}

impl MarketModel for FixedMarket {
    fn sample_mid(&mut self) -> f64 {
        self.mid
    }

    fn sample_fill(&mut self, mid: f64) -> f64 {
        mid + self.offset
    }

    fn name(&self) -> &str {
        "fixed"
    }
}
