//! Stage 2: operations estimation.
//!
//! Fully deterministic: per-crop water/fertilizer cadence, expected yield over
//! the fixed planning horizon, and itemized costs. Crops missing from the
//! lookup tables degrade to documented numeric defaults, so this stage cannot
//! fail on a well-formed crop plan.

use std::collections::BTreeMap;

use crate::catalog::{CropCatalog, normalize_name};
use crate::planner::types::{
    CropPlan, Goal, OperationsCrop, OperationsPlan, UserInputs, WeatherContext, cost_categories,
    round2,
};

/// Fixed planning horizon: ~10 weeks.
pub const HORIZON_DAYS: f64 = 70.0;
pub const HORIZON_WEEKS: f64 = 10.0;

/// A crop is assumed to complete at least half a cycle within the horizon,
/// preventing zero-yield artifacts for slow crops.
pub const MIN_CYCLES_IN_HORIZON: f64 = 0.5;

/// Per-m² heuristics for crops we have tuned values for.
const WATER_L_PER_M2_DAY: &[(&str, f64)] = &[
    ("tomato", 3.0),
    ("basil", 1.2),
    ("cucumber", 2.8),
    ("lettuce", 1.5),
];
const FERT_G_PER_M2_WEEK: &[(&str, f64)] = &[
    ("tomato", 45.0),
    ("basil", 12.0),
    ("cucumber", 35.0),
    ("lettuce", 15.0),
];

const DEFAULT_WATER_L_PER_M2_DAY: f64 = 2.0;
const DEFAULT_FERT_G_PER_M2_WEEK: f64 = 15.0;
const DEFAULT_YIELD_KG_PER_M2: f64 = 3.0;

const WATER_PRICE_PER_L: f64 = 0.0010; // USD
const NUTRIENT_PRICE_PER_G: f64 = 0.01; // USD
const LABOR_COST_BASE: f64 = 120.0; // USD per cycle, flat
const MISC_COST: f64 = 25.0; // USD

/// Watering multiplier from seasonal temperature: 10% per 5°C deviation from
/// the 22°C baseline, capped at ±30%.
pub fn temp_water_factor(avg_temp_c: f64) -> f64 {
    1.0 + ((avg_temp_c - 22.0) / 5.0 * 0.10).clamp(-0.30, 0.30)
}

fn lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    table.iter().find(|(name, _)| *name == key).map(|(_, v)| *v)
}

/// Runs the operations estimation stage.
pub fn estimate_operations(
    crop_plan: &CropPlan,
    catalog: &CropCatalog,
    inputs: &UserInputs,
    weather: Option<&WeatherContext>,
) -> OperationsPlan {
    let temp_factor = match weather {
        Some(w) => temp_water_factor(w.avg_temp_c),
        None => 1.0,
    };

    let mut crops_out = Vec::with_capacity(crop_plan.crops.len());
    let mut total_water_cost = 0.0;
    let mut total_nutrient_cost = 0.0;

    for item in &crop_plan.crops {
        let key = normalize_name(&item.name);
        let area = item.area_m2;
        let yield_per_m2 = catalog
            .get(&item.name)
            .map(|e| e.yield_kg_per_m2)
            .unwrap_or(DEFAULT_YIELD_KG_PER_M2);

        let cycles_in_horizon =
            (HORIZON_DAYS / item.cycle_days.max(1) as f64).max(MIN_CYCLES_IN_HORIZON);
        let expected_yield = round2(yield_per_m2 * area * cycles_in_horizon);

        let mut water_per_m2_day =
            lookup(WATER_L_PER_M2_DAY, &key).unwrap_or(DEFAULT_WATER_L_PER_M2_DAY);
        let mut fert_per_m2_week =
            lookup(FERT_G_PER_M2_WEEK, &key).unwrap_or(DEFAULT_FERT_G_PER_M2_WEEK);

        match inputs.goal {
            Goal::MinimizeCost => {
                water_per_m2_day *= 0.9;
                fert_per_m2_week *= 0.85;
            }
            Goal::MaximizeYield => {
                water_per_m2_day *= 1.1;
                fert_per_m2_week *= 1.15;
            }
            Goal::Balanced => {}
        }

        if inputs.organic {
            fert_per_m2_week *= 0.9;
        }

        water_per_m2_day *= temp_factor;

        let water_l_day = round2(water_per_m2_day * area);
        let fert_g_week = round2(fert_per_m2_week * area);

        crops_out.push(OperationsCrop {
            name: item.name.clone(),
            watering_l_per_day: water_l_day,
            fertilizer_g_per_week: fert_g_week,
            expected_yield_kg: expected_yield,
        });

        total_water_cost += water_l_day * HORIZON_DAYS * WATER_PRICE_PER_L;
        total_nutrient_cost += fert_g_week * HORIZON_WEEKS * NUTRIENT_PRICE_PER_G;
    }

    let mut costs = BTreeMap::new();
    costs.insert(
        cost_categories::WATER.to_string(),
        round2(total_water_cost),
    );
    costs.insert(
        cost_categories::NUTRIENTS.to_string(),
        round2(total_nutrient_cost),
    );
    costs.insert(cost_categories::LABOR.to_string(), round2(LABOR_COST_BASE));
    costs.insert(cost_categories::MISC.to_string(), round2(MISC_COST));

    let notes = if weather.is_some() {
        "Parameters tuned for a ~10-week horizon. Weather-adjusted watering applied.".to_string()
    } else {
        "Parameters tuned for a ~10-week horizon.".to_string()
    };

    OperationsPlan {
        crops: crops_out,
        costs,
        notes,
    }
}
