use anyhow::Result;

use crate::config::Config;
use crate::planner::context::PlannerContext;
use crate::planner::types::{CombinedResult, PlanRequest, UserInputs, WeatherContext};
use crate::planner::{crop_selector, market, operations, outlet, whatif};
use crate::services::{forex, weather};

/// Runs the three-stage pipeline once: crop selection → operations
/// estimation → market analysis. Stateless per call; given a constructed
/// context this cannot fail — every stage degrades to documented defaults.
pub async fn run(
    ctx: &PlannerContext,
    inputs: &UserInputs,
    weather: Option<&WeatherContext>,
) -> CombinedResult {
    println!("🌱 Selecting crops for {} ...", inputs.location);
    let crop_plan =
        crop_selector::select_crops(ctx.generation.as_ref(), &ctx.catalog, inputs, weather).await;
    if ctx.config.verbose {
        println!(
            "   {} crops, generation latency: {:?}s",
            crop_plan.crops.len(),
            crop_plan.diagnostics.generation_secs
        );
    }

    println!("💧 Estimating operations ...");
    let ops_plan = operations::estimate_operations(&crop_plan, &ctx.catalog, inputs, weather);

    println!("📈 Analyzing market ...");
    let market_plan = market::analyze_market(ctx.generation.as_ref(), &ops_plan, &ctx.prices).await;

    CombinedResult {
        crop_plan,
        ops_plan,
        market_plan,
        weather: weather.copied(),
    }
}

/// Full CLI entry: resolves the context, optional weather and FX rate, runs
/// the pipeline, applies the requested what-if adjustment and writes the
/// output artifacts. Only unavailable planning data aborts the run.
pub async fn launch(config: &Config, request: &PlanRequest) -> Result<()> {
    let ctx = PlannerContext::new(config.clone(), request.price_override.as_deref())?;

    let weather_ctx = if request.use_weather {
        match weather::fetch_weather_summary(&request.inputs.location).await {
            Ok(w) => {
                println!(
                    "🌤️ Weather for {}: avg {}°C, {}mm/day",
                    request.inputs.location, w.avg_temp_c, w.avg_precip_mm
                );
                Some(w)
            }
            Err(e) => {
                eprintln!("⚠️ Weather lookup failed, planning without it: {}", e);
                None
            }
        }
    } else {
        None
    };

    let result = run(&ctx, &request.inputs, weather_ctx.as_ref()).await;

    let adjusted = if request.wants_what_if() {
        println!(
            "🔀 Applying what-if adjustment (area ×{}, price {:+}%)",
            request.area_factor(),
            request.price_adjust_pct
        );
        Some(whatif::apply(
            &result,
            request.area_factor(),
            request.price_factor(),
        ))
    } else {
        None
    };

    let fx_rate = if request.currency == forex::BASE_CURRENCY {
        1.0
    } else {
        match forex::get_rate(forex::BASE_CURRENCY, &request.currency).await {
            Ok(rate) => rate,
            Err(e) => {
                eprintln!(
                    "⚠️ FX lookup for {} failed, reporting in {}: {}",
                    request.currency,
                    forex::BASE_CURRENCY,
                    e
                );
                1.0
            }
        }
    };

    outlet::save(config, request, &result, adjusted.as_ref(), fx_rate)?;

    println!(
        "✅ Plan complete: revenue {:.2} USD, margin {:.2}%",
        result.market_plan.revenue_usd, result.market_plan.margin_pct
    );
    Ok(())
}

// Include tests
#[cfg(test)]
mod tests;
