//! Stage 3: market analysis.
//!
//! Revenue, cost of goods and margin are derived entirely from the operations
//! plan and the price table. The only generative part is the short list of
//! go-to-market ideas, which substitutes a fixed static list on any failure -
//! this stage never propagates an error to the caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::PriceTable;
use crate::llm::GenerationService;
use crate::planner::types::{MarketPlan, OperationsPlan, PricingAssumption, round2};

/// Unit price assumed for crops absent from the price table, USD per kg.
pub const DEFAULT_UNIT_PRICE: f64 = 2.0;

/// At most this many go-to-market ideas are kept.
pub const MAX_IDEAS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct RawGoToMarket {
    #[serde(default)]
    pub go_to_market: Vec<String>,
}

const SYSTEM_PROMPT: &str = r#"You are MarketAnalyst. Given the list of crops, expected yields, and a target market (retail),
propose 2-3 short go-to-market tactics focused on small to medium greenhouse businesses.
Return STRICT JSON with keys: go_to_market (list of strings)."#;

/// Runs the market analysis stage. Always returns a valid plan.
pub async fn analyze_market(
    generation: &dyn GenerationService,
    ops_plan: &OperationsPlan,
    prices: &PriceTable,
) -> MarketPlan {
    let (revenue, cogs, margin_pct, pricing_assumptions) = financials(ops_plan, prices);
    let go_to_market = request_ideas(generation, ops_plan).await;

    MarketPlan {
        revenue_usd: round2(revenue),
        cogs_usd: round2(cogs),
        margin_pct,
        pricing_assumptions,
        go_to_market,
    }
}

/// Deterministic financial summary: per-crop pricing assumptions, revenue,
/// cost of goods and margin (with the zero-revenue guard).
pub(crate) fn financials(
    ops_plan: &OperationsPlan,
    prices: &PriceTable,
) -> (f64, f64, f64, Vec<PricingAssumption>) {
    let mut pricing_assumptions = Vec::with_capacity(ops_plan.crops.len());
    let mut revenue = 0.0;

    for crop in &ops_plan.crops {
        let unit_price = prices.unit_price(&crop.name).unwrap_or(DEFAULT_UNIT_PRICE);
        pricing_assumptions.push(PricingAssumption {
            crop: crop.name.clone(),
            unit_price_usd_per_kg: unit_price,
        });
        revenue += unit_price * crop.expected_yield_kg;
    }

    let cogs = ops_plan.total_costs_usd();
    let margin_pct = if revenue > 0.0 {
        round2((revenue - cogs) / revenue * 100.0)
    } else {
        0.0
    };

    (revenue, cogs, margin_pct, pricing_assumptions)
}

async fn request_ideas(generation: &dyn GenerationService, ops_plan: &OperationsPlan) -> Vec<String> {
    let crop_yields: Vec<String> = ops_plan
        .crops
        .iter()
        .map(|c| format!("({}, {} kg)", c.name, c.expected_yield_kg))
        .collect();

    let user_prompt = format!(
        r#"Crops and expected yields:
{}

Constraints:
- Audience: retail and small HORECA (cafes, restaurants).
- Keep suggestions crisp and actionable.
- 2-3 ideas max.
Return JSON with key go_to_market: ["idea1", "idea2", ...]"#,
        crop_yields.join(", ")
    );

    match generation.generate_json(SYSTEM_PROMPT, &user_prompt).await {
        Ok(value) => match serde_json::from_value::<RawGoToMarket>(value) {
            Ok(raw) if !raw.go_to_market.is_empty() => {
                raw.go_to_market.into_iter().take(MAX_IDEAS).collect()
            }
            Ok(_) => fallback_ideas(),
            Err(e) => {
                eprintln!("⚠️ Go-to-market response did not match the schema: {}", e);
                fallback_ideas()
            }
        },
        Err(e) => {
            eprintln!("⚠️ Go-to-market generation unavailable: {}", e);
            fallback_ideas()
        }
    }
}

/// Static tactics used whenever the generation call fails.
pub(crate) fn fallback_ideas() -> Vec<String> {
    vec![
        "Bundle basil with tomatoes for caprese kits; sell to cafes.".to_string(),
        "Offer weekly CSA-style subscription boxes.".to_string(),
        "Target farm-to-table restaurants with consistent supply contracts.".to_string(),
    ]
}
