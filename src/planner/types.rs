//! Entities flowing through the planning pipeline.
//!
//! Each stage exclusively produces its own output entity; downstream stages
//! read it and never mutate it. `CombinedResult` serializes to the nested
//! mapping consumed by persistence/export/display collaborators, with the
//! top-level keys `crop_plan`, `ops_plan`, `market_plan` and `weather`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Planning goal selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    Balanced,
    MaximizeYield,
    MinimizeCost,
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Goal::Balanced => write!(f, "balanced"),
            Goal::MaximizeYield => write!(f, "maximize_yield"),
            Goal::MinimizeCost => write!(f, "minimize_cost"),
        }
    }
}

impl std::str::FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balanced" => Ok(Goal::Balanced),
            "maximize_yield" => Ok(Goal::MaximizeYield),
            "minimize_cost" => Ok(Goal::MinimizeCost),
            _ => Err(format!("Unknown goal: {}", s)),
        }
    }
}

/// User constraints driving a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInputs {
    pub location: String,
    pub area_m2: f64,
    pub season: String,
    pub goal: Goal,
    pub organic: bool,
}

/// Seasonal weather summary for the location. Absence is valid and simply
/// disables the weather adjustment in the operations stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherContext {
    pub avg_temp_c: f64,
    pub avg_precip_mm: f64,
}

/// One chosen crop with its share of the greenhouse area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    pub name: String,
    pub area_m2: f64,
    pub cycle_days: i64,
}

/// Diagnostics attached by the crop selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    /// Wall-clock latency of the generation call, seconds to 3 decimals.
    /// Not populated when the fixed fallback plan was used.
    pub generation_secs: Option<f64>,
    pub used_fallback: bool,
}

/// Output of the crop selector. Sum of crop areas never exceeds
/// `greenhouse_area_m2` (enforced by the repair pass).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPlan {
    pub location: String,
    pub greenhouse_area_m2: f64,
    pub season: String,
    pub crops: Vec<CropSelection>,
    pub rationale: String,
    #[serde(default)]
    pub diagnostics: PlanDiagnostics,
}

/// Resource cadence and expected yield for one crop over the fixed horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsCrop {
    pub name: String,
    pub watering_l_per_day: f64,
    pub fertilizer_g_per_week: f64,
    pub expected_yield_kg: f64,
}

/// Fixed cost category keys of an [`OperationsPlan`].
pub mod cost_categories {
    pub const WATER: &str = "water";
    pub const NUTRIENTS: &str = "nutrients";
    pub const LABOR: &str = "labor";
    pub const MISC: &str = "misc";

    /// Categories scaled by the what-if area factor. Labor and misc stay flat.
    pub const VARIABLE: [&str; 2] = [WATER, NUTRIENTS];
}

/// Output of the operations estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsPlan {
    pub crops: Vec<OperationsCrop>,
    /// Cost per category in USD, keyed by [`cost_categories`].
    pub costs: BTreeMap<String, f64>,
    pub notes: String,
}

impl OperationsPlan {
    pub fn total_costs_usd(&self) -> f64 {
        self.costs.values().sum()
    }
}

/// Unit price resolved for one crop of the operations plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingAssumption {
    pub crop: String,
    pub unit_price_usd_per_kg: f64,
}

/// Output of the market analyst.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPlan {
    pub revenue_usd: f64,
    pub cogs_usd: f64,
    pub margin_pct: f64,
    pub pricing_assumptions: Vec<PricingAssumption>,
    pub go_to_market: Vec<String>,
}

/// Terminal artifact of a pipeline run; consumed read-only by collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub crop_plan: CropPlan,
    pub ops_plan: OperationsPlan,
    pub market_plan: MarketPlan,
    pub weather: Option<WeatherContext>,
}

/// Everything one CLI invocation asks of the planner, beyond the static
/// configuration: the user constraints plus integration toggles.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub inputs: UserInputs,
    pub use_weather: bool,
    pub price_override: Option<PathBuf>,
    /// Display currency for the summary report; monetary results stay USD.
    pub currency: String,
    /// What-if area adjustment in percent (100 = unchanged).
    pub area_adjust_pct: u32,
    /// What-if price adjustment in percent (0 = unchanged).
    pub price_adjust_pct: i32,
}

impl PlanRequest {
    pub fn area_factor(&self) -> f64 {
        f64::from(self.area_adjust_pct) / 100.0
    }

    pub fn price_factor(&self) -> f64 {
        f64::from(self.price_adjust_pct) / 100.0
    }

    /// Whether the request asks for an adjusted scenario on top of the baseline.
    pub fn wants_what_if(&self) -> bool {
        self.area_adjust_pct != 100 || self.price_adjust_pct != 0
    }
}

/// Rounds to two decimals, the precision used for all plan quantities.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to four decimals, used for adjusted unit prices.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10000.0).round() / 10000.0
}
