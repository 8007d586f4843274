use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ConfigError;

/// Shock applied to every holding of a portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShockParams {
    /// Relative price move: price becomes `price * (1 + equity_shock)`.
    pub equity_shock: f64,
    /// Additive spread widening, in the units of `Holding::spread`.
    pub credit_spread_widen: f64,
}

impl ShockParams {
    pub fn new(equity_shock: f64, credit_spread_widen: f64) -> Self {
        Self {
            equity_shock,
            credit_spread_widen,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(flatten)]
    pub shock: ShockParams,
}

impl Scenario {
    pub fn new(name: impl Into<String>, equity_shock: f64, credit_spread_widen: f64) -> Self {
        Self {
            name: name.into(),
            shock: ShockParams::new(equity_shock, credit_spread_widen),
        }
    }
}

/// Named scenarios in evaluation order. Non-empty, unique names, finite shocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, ConfigError> {
        if scenarios.is_empty() {
            return Err(ConfigError::EmptyScenarioSet);
        }
        let mut seen = HashSet::new();
        for s in &scenarios {
            if !seen.insert(s.name.as_str()) {
                return Err(ConfigError::DuplicateScenario(s.name.clone()));
            }
            for (field, value) in [
                ("equity_shock", s.shock.equity_shock),
                ("credit_spread_widen", s.shock.credit_spread_widen),
            ] {
                if !value.is_finite() {
                    return Err(ConfigError::InvalidShock {
                        scenario: s.name.clone(),
                        field,
                        value,
                    });
                }
            }
        }
        Ok(Self { scenarios })
    }

    /// 2008, 2020 and 2022 drawdowns.
    pub fn crisis_presets() -> Self {
        Self {
            scenarios: vec![
                Scenario::new("2008 Crisis", -0.45, 0.35),
                Scenario::new("2020 COVID", -0.35, 0.25),
                Scenario::new("2022 Inflation", -0.25, 0.15),
            ],
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, name: &str) -> Option<&ShockParams> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .map(|s| &s.shock)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self::crisis_presets()
    }
}
