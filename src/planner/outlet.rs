//! Output stage: persists the combined result contract and renders a human
//! summary report. This is the only artifact crossing the core boundary.

use anyhow::{Context, Result};
use std::fs;

use crate::catalog::normalize_name;
use crate::config::Config;
use crate::planner::market::DEFAULT_UNIT_PRICE;
use crate::planner::types::{CombinedResult, PlanRequest, round2};
use crate::services::forex;

/// Per-crop profitability line: total cost of goods is allocated across crops
/// proportional to their share of the expected yield.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitabilityRow {
    pub crop: String,
    pub expected_yield_kg: f64,
    pub unit_price_usd_per_kg: f64,
    pub revenue_usd: f64,
    pub allocated_cogs_usd: f64,
    pub profit_usd: f64,
    pub margin_pct: f64,
}

/// Derives the per-crop profitability breakdown from a combined result.
pub fn profitability_rows(result: &CombinedResult) -> Vec<ProfitabilityRow> {
    let price_map: std::collections::HashMap<String, f64> = result
        .market_plan
        .pricing_assumptions
        .iter()
        .map(|p| (normalize_name(&p.crop), p.unit_price_usd_per_kg))
        .collect();

    let total_cogs = result.market_plan.cogs_usd;
    let total_yield: f64 = result
        .ops_plan
        .crops
        .iter()
        .map(|c| c.expected_yield_kg)
        .sum();
    // Guard the allocation against an all-zero yield plan.
    let total_yield = if total_yield > 0.0 { total_yield } else { 1.0 };

    result
        .ops_plan
        .crops
        .iter()
        .map(|crop| {
            let unit_price = price_map
                .get(&normalize_name(&crop.name))
                .copied()
                .unwrap_or(DEFAULT_UNIT_PRICE);
            let revenue = unit_price * crop.expected_yield_kg;
            let allocated_cogs = total_cogs * (crop.expected_yield_kg / total_yield);
            let profit = revenue - allocated_cogs;
            let margin_pct = if revenue > 0.0 {
                round2(profit / revenue * 100.0)
            } else {
                0.0
            };
            ProfitabilityRow {
                crop: crop.name.clone(),
                expected_yield_kg: round2(crop.expected_yield_kg),
                unit_price_usd_per_kg: round2(unit_price),
                revenue_usd: round2(revenue),
                allocated_cogs_usd: round2(allocated_cogs),
                profit_usd: round2(profit),
                margin_pct,
            }
        })
        .collect()
}

/// Writes `plan.json` (the combined-result contract), optionally
/// `what_if.json`, and a markdown summary into the output directory.
pub fn save(
    config: &Config,
    request: &PlanRequest,
    baseline: &CombinedResult,
    adjusted: Option<&CombinedResult>,
    fx_rate: f64,
) -> Result<()> {
    fs::create_dir_all(&config.output_path).context(format!(
        "Failed to create output directory: {:?}",
        config.output_path
    ))?;

    let plan_path = config.output_path.join("plan.json");
    fs::write(&plan_path, serde_json::to_string_pretty(baseline)?)
        .context(format!("Failed to write {:?}", plan_path))?;

    if let Some(adjusted) = adjusted {
        let what_if_path = config.output_path.join("what_if.json");
        fs::write(&what_if_path, serde_json::to_string_pretty(adjusted)?)
            .context(format!("Failed to write {:?}", what_if_path))?;
    }

    let summary_path = config.output_path.join("summary.md");
    let summary = render_summary(request, baseline, adjusted, fx_rate);
    fs::write(&summary_path, summary).context(format!("Failed to write {:?}", summary_path))?;

    println!("📄 Wrote plan to {:?}", config.output_path);
    Ok(())
}

fn money(amount_usd: f64, fx_rate: f64, currency: &str) -> String {
    if currency == forex::BASE_CURRENCY {
        format!("{:.2} USD", amount_usd)
    } else {
        format!(
            "{:.2} {} ({:.2} USD)",
            round2(amount_usd * fx_rate),
            currency,
            amount_usd
        )
    }
}

fn render_summary(
    request: &PlanRequest,
    baseline: &CombinedResult,
    adjusted: Option<&CombinedResult>,
    fx_rate: f64,
) -> String {
    let currency = request.currency.as_str();
    let mut out = String::new();

    out.push_str("# Greenhouse Plan\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let inputs = &request.inputs;
    out.push_str("## Inputs\n\n");
    out.push_str(&format!(
        "- Location: {}\n- Area: {} m²\n- Season: {}\n- Goal: {}\n- Organic: {}\n\n",
        inputs.location, inputs.area_m2, inputs.season, inputs.goal, inputs.organic
    ));
    if let Some(w) = &baseline.weather {
        out.push_str(&format!(
            "Weather context: avg {}°C, {}mm/day precipitation\n\n",
            w.avg_temp_c, w.avg_precip_mm
        ));
    }

    let mk = &baseline.market_plan;
    out.push_str("## Summary\n\n");
    out.push_str(&format!("- Revenue: {}\n", money(mk.revenue_usd, fx_rate, currency)));
    out.push_str(&format!("- COGS: {}\n", money(mk.cogs_usd, fx_rate, currency)));
    out.push_str(&format!("- Margin: {:.2}%\n\n", mk.margin_pct));

    out.push_str("## Crop Plan\n\n");
    if baseline.crop_plan.diagnostics.used_fallback {
        out.push_str("> Generated with the deterministic fallback plan.\n\n");
    }
    out.push_str("| Crop | Area (m²) | Cycle (days) |\n|---|---|---|\n");
    for crop in &baseline.crop_plan.crops {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            crop.name, crop.area_m2, crop.cycle_days
        ));
    }
    if !baseline.crop_plan.rationale.is_empty() {
        out.push_str(&format!("\nRationale: {}\n", baseline.crop_plan.rationale));
    }

    out.push_str("\n## Operations (~10 weeks)\n\n");
    out.push_str("| Crop | Water (L/day) | Fertilizer (g/week) | Expected Yield (kg) |\n|---|---|---|---|\n");
    for crop in &baseline.ops_plan.crops {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            crop.name, crop.watering_l_per_day, crop.fertilizer_g_per_week, crop.expected_yield_kg
        ));
    }
    out.push_str("\nCosts (USD): ");
    let costs: Vec<String> = baseline
        .ops_plan
        .costs
        .iter()
        .map(|(k, v)| format!("{} {:.2}", k, v))
        .collect();
    out.push_str(&costs.join(", "));
    out.push_str(&format!("\n\n{}\n", baseline.ops_plan.notes));

    out.push_str("\n## Market & Profitability\n\n");
    out.push_str("| Crop | Yield (kg) | Price (USD/kg) | Revenue | Allocated COGS | Profit | Margin (%) |\n|---|---|---|---|---|---|---|\n");
    for row in profitability_rows(baseline) {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            row.crop,
            row.expected_yield_kg,
            row.unit_price_usd_per_kg,
            row.revenue_usd,
            row.allocated_cogs_usd,
            row.profit_usd,
            row.margin_pct
        ));
    }

    out.push_str("\n### Go-to-market ideas\n\n");
    for idea in &mk.go_to_market {
        out.push_str(&format!("- {}\n", idea));
    }

    if let Some(adjusted) = adjusted {
        let amk = &adjusted.market_plan;
        out.push_str("\n## What-if scenario\n\n");
        out.push_str(&format!(
            "Area ×{}, price {:+}%:\n\n",
            request.area_factor(),
            request.price_adjust_pct
        ));
        out.push_str(&format!("- Revenue: {}\n", money(amk.revenue_usd, fx_rate, currency)));
        out.push_str(&format!("- COGS: {}\n", money(amk.cogs_usd, fx_rate, currency)));
        out.push_str(&format!("- Margin: {:.2}%\n", amk.margin_pct));
    }

    out
}
