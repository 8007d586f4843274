//! StressSimulator: revalue a portfolio under each shock scenario.
//!
//! Every scenario shocks its own copy of the baseline, so outcomes do not
//! depend on evaluation order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::scenario::{Scenario, ScenarioSet, ShockParams};
use crate::domain::{Holding, PortfolioSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub baseline_value: f64,
    pub stressed_value: f64,
    pub pnl_impact: f64,
}

/// Outcomes in scenario order plus the worst case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressReport {
    pub outcomes: Vec<ScenarioOutcome>,
    pub worst_case_scenario: Option<String>,
    pub worst_case_pnl: Option<f64>,
}

impl StressReport {
    pub fn from_outcomes(outcomes: Vec<ScenarioOutcome>) -> Self {
        let worst = outcomes
            .iter()
            .min_by(|a, b| a.pnl_impact.total_cmp(&b.pnl_impact));
        let worst_case_scenario = worst.map(|o| o.scenario.clone());
        let worst_case_pnl = worst.map(|o| o.pnl_impact);
        Self {
            outcomes,
            worst_case_scenario,
            worst_case_pnl,
        }
    }

    pub fn impact(&self, scenario: &str) -> Option<f64> {
        self.outcomes
            .iter()
            .find(|o| o.scenario == scenario)
            .map(|o| o.pnl_impact)
    }

    /// `(scenario, pnl_impact)` pairs in scenario order.
    pub fn impacts(&self) -> impl Iterator<Item = (&str, f64)> {
        self.outcomes
            .iter()
            .map(|o| (o.scenario.as_str(), o.pnl_impact))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StressSimulator {
    scenarios: ScenarioSet,
}

impl StressSimulator {
    pub fn new(scenarios: ScenarioSet) -> Self {
        Self { scenarios }
    }

    pub fn scenarios(&self) -> &ScenarioSet {
        &self.scenarios
    }

    /// A shocked copy of `baseline`; `baseline` itself is untouched.
    pub fn apply_shocks(baseline: &PortfolioSnapshot, shock: &ShockParams) -> PortfolioSnapshot {
        baseline.map_holdings(|h| Holding {
            price: h.price * (1.0 + shock.equity_shock),
            spread: h.spread + shock.credit_spread_widen,
            ..h.clone()
        })
    }

    pub fn evaluate(baseline: &PortfolioSnapshot, scenario: &Scenario) -> ScenarioOutcome {
        let baseline_value = baseline.market_value();
        let stressed_value = Self::apply_shocks(baseline, &scenario.shock).market_value();
        let pnl_impact = stressed_value - baseline_value;
        debug!(scenario = %scenario.name, pnl_impact, "scenario evaluated");
        ScenarioOutcome {
            scenario: scenario.name.clone(),
            baseline_value,
            stressed_value,
            pnl_impact,
        }
    }

    /// Evaluate every scenario in parallel; outcomes keep scenario order.
    pub fn run(&self, baseline: &PortfolioSnapshot) -> StressReport {
        let outcomes = self
            .scenarios
            .scenarios()
            .par_iter()
            .map(|s| Self::evaluate(baseline, s))
            .collect();
        let report = StressReport::from_outcomes(outcomes);
        info!(
            scenarios = report.outcomes.len(),
            worst = report.worst_case_scenario.as_deref().unwrap_or("-"),
            "stress test complete"
        );
        report
    }
}
