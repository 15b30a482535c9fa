//! What-if transformation: recompute a combined result under scaled area and
//! price assumptions, without any generation calls and without mutating the
//! original. Consumed by the display layer for scenario sliders.

use std::collections::HashMap;

use crate::catalog::normalize_name;
use crate::planner::types::{CombinedResult, cost_categories, round2, round4};

/// Produces an adjusted copy of `base`.
///
/// `area_factor` scales yields, water/fertilizer cadence and the variable cost
/// categories; labor and misc stay flat. `price_factor` is a relative delta
/// applied to every unit price (0.0 = unchanged). Revenue, cost of goods and
/// margin are recomputed from the adjusted figures.
pub fn apply(base: &CombinedResult, area_factor: f64, price_factor: f64) -> CombinedResult {
    let mut plan = base.clone();

    // Scale ops crops: yields & variable cadences.
    for crop in &mut plan.ops_plan.crops {
        crop.expected_yield_kg = round2(crop.expected_yield_kg * area_factor);
        crop.watering_l_per_day = round2(crop.watering_l_per_day * area_factor);
        crop.fertilizer_g_per_week = round2(crop.fertilizer_g_per_week * area_factor);
    }

    // Scale variable costs; keep labor & misc constant.
    for category in cost_categories::VARIABLE {
        if let Some(cost) = plan.ops_plan.costs.get_mut(category) {
            *cost = round2(*cost * area_factor);
        }
    }

    // Apply the price delta to every assumption.
    for assumption in &mut plan.market_plan.pricing_assumptions {
        assumption.unit_price_usd_per_kg =
            round4(assumption.unit_price_usd_per_kg * (1.0 + price_factor));
    }

    // Recompute revenue from adjusted prices × adjusted yields.
    let price_map: HashMap<String, f64> = plan
        .market_plan
        .pricing_assumptions
        .iter()
        .map(|p| (normalize_name(&p.crop), p.unit_price_usd_per_kg))
        .collect();

    let mut revenue = 0.0;
    for crop in &plan.ops_plan.crops {
        revenue += price_map.get(&normalize_name(&crop.name)).copied().unwrap_or(0.0)
            * crop.expected_yield_kg;
    }

    let cogs = plan.ops_plan.total_costs_usd();
    plan.market_plan.revenue_usd = round2(revenue);
    plan.market_plan.cogs_usd = round2(cogs);
    plan.market_plan.margin_pct = if revenue > 0.0 {
        round2((revenue - cogs) / revenue * 100.0)
    } else {
        0.0
    };

    plan
}
