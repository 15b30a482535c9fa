//! Stage 1: crop selection.
//!
//! Asks the generation service for a 2-4 crop mix, then deterministically
//! repairs the answer: unknown crops are dropped and over-budget areas are
//! scaled back proportionally. The generation step is advisory only; the
//! repair pass is what guarantees the area invariant. This stage never fails
//! outward - any generation problem degrades to a fixed two-crop fallback.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::catalog::CropCatalog;
use crate::llm::GenerationService;
use crate::planner::types::{
    CropPlan, CropSelection, PlanDiagnostics, UserInputs, WeatherContext, round2,
};

/// Shape the generation service is asked to return. Extra keys are ignored;
/// missing header fields are backfilled from the user inputs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct RawCropPlan {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub greenhouse_area_m2: Option<f64>,
    #[serde(default)]
    pub season: Option<String>,
    pub crops: Vec<RawCropItem>,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub(crate) struct RawCropItem {
    pub name: String,
    pub area_m2: f64,
    pub cycle_days: i64,
}

const SYSTEM_PROMPT: &str = r#"You are CropAdvisor, planning greenhouse crops for a software-only simulator.
Pick 2-4 crops from the provided list. Respect total area. Prefer combos with compatible cycles and commercial demand.
Output STRICT JSON with: location, greenhouse_area_m2, season, crops[{name, area_m2, cycle_days}], rationale.
Do not include keys not in the schema."#;

/// Runs the crop selection stage. Always returns a valid plan.
pub async fn select_crops(
    generation: &dyn GenerationService,
    catalog: &CropCatalog,
    inputs: &UserInputs,
    weather: Option<&WeatherContext>,
) -> CropPlan {
    let user_prompt = build_user_prompt(catalog, inputs, weather);

    let started = Instant::now();
    let outcome = generation.generate_json(SYSTEM_PROMPT, &user_prompt).await;
    let elapsed_secs = (started.elapsed().as_secs_f64() * 1000.0).round() / 1000.0;

    let raw: RawCropPlan = match outcome {
        Ok(value) => match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("⚠️ Crop advisor response did not match the schema: {}", e);
                return fallback_plan(inputs);
            }
        },
        Err(e) => {
            eprintln!("⚠️ Crop advisor generation unavailable: {}", e);
            return fallback_plan(inputs);
        }
    };

    let crops = repair_crops(raw.crops, catalog, inputs.area_m2);
    if crops.is_empty() {
        // Nothing from the proposal survived the catalog filter.
        return fallback_plan(inputs);
    }

    CropPlan {
        location: raw.location.unwrap_or_else(|| inputs.location.clone()),
        greenhouse_area_m2: raw.greenhouse_area_m2.unwrap_or(inputs.area_m2),
        season: raw.season.unwrap_or_else(|| inputs.season.clone()),
        crops,
        rationale: raw.rationale,
        diagnostics: PlanDiagnostics {
            generation_secs: Some(elapsed_secs),
            used_fallback: false,
        },
    }
}

fn build_user_prompt(
    catalog: &CropCatalog,
    inputs: &UserInputs,
    weather: Option<&WeatherContext>,
) -> String {
    let crops_list = catalog.display_names().join(", ");

    let weather_note = match weather {
        Some(w) => format!(
            "\nWeather (approx): avg_temp={}°C, avg_precip={}mm\n",
            w.avg_temp_c, w.avg_precip_mm
        ),
        None => String::new(),
    };

    let schema = serde_json::to_string_pretty(&schemars::schema_for!(RawCropPlan))
        .unwrap_or_default();

    format!(
        r#"Available crops: {crops_list}
Total greenhouse area: {area} m2
Location: {location}
Season: {season}
User goal: {goal}
Organic preference: {organic}
{weather_note}
Rules:
- Choose only from the available crops list.
- Total of all area_m2 must be <= {area}.
- cycle_days should be roughly based on known cycle lengths; you may adapt slightly to align cycles.
- Prefer 2-4 crops.
- Keep rationale to 2-3 sentences.

Return JSON ONLY matching this schema:
{schema}"#,
        crops_list = crops_list,
        area = inputs.area_m2,
        location = inputs.location,
        season = inputs.season,
        goal = inputs.goal,
        organic = inputs.organic,
        weather_note = weather_note,
        schema = schema,
    )
}

/// The deterministic repair pass.
///
/// Drops crops absent from the catalog or with non-positive area, clamps cycle
/// lengths to at least one day, and scales every area by `budget / total` when
/// the proposal overshoots the budget. Relative ratios are preserved; results
/// are rounded to two decimals.
pub(crate) fn repair_crops(
    raw: Vec<RawCropItem>,
    catalog: &CropCatalog,
    budget_m2: f64,
) -> Vec<CropSelection> {
    let mut crops: Vec<CropSelection> = raw
        .into_iter()
        .filter(|c| catalog.contains(&c.name) && c.area_m2 > 0.0)
        .map(|c| CropSelection {
            name: c.name.trim().to_string(),
            area_m2: c.area_m2,
            cycle_days: c.cycle_days.max(1),
        })
        .collect();

    let total: f64 = crops.iter().map(|c| c.area_m2).sum();
    if total > budget_m2 && total > 0.0 {
        let ratio = budget_m2 / total;
        for crop in &mut crops {
            crop.area_m2 = round2(crop.area_m2 * ratio);
        }
    }

    crops
}

/// Fixed fallback plan: a 70/30 split of two high-commercial-demand crops.
/// Used whenever the generation outcome is unusable.
pub(crate) fn fallback_plan(inputs: &UserInputs) -> CropPlan {
    CropPlan {
        location: inputs.location.clone(),
        greenhouse_area_m2: inputs.area_m2,
        season: inputs.season.clone(),
        crops: vec![
            CropSelection {
                name: "Tomato".to_string(),
                area_m2: round2(inputs.area_m2 * 0.7),
                cycle_days: 75,
            },
            CropSelection {
                name: "Basil".to_string(),
                area_m2: round2(inputs.area_m2 * 0.3),
                cycle_days: 30,
            },
        ],
        rationale: "Fallback plan: crop advisor unavailable or returned an invalid proposal."
            .to_string(),
        diagnostics: PlanDiagnostics {
            generation_secs: None,
            used_fallback: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropCatalogEntry;
    use crate::llm::GenerationError;
    use crate::planner::types::Goal;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct ScriptedGeneration {
        response: Option<Value>,
    }

    #[async_trait]
    impl GenerationService for ScriptedGeneration {
        async fn generate_json(&self, _sys: &str, _user: &str) -> Result<Value, GenerationError> {
            self.response
                .clone()
                .ok_or_else(|| GenerationError::RequestFailed("connection refused".to_string()))
        }
    }

    fn test_catalog() -> CropCatalog {
        CropCatalog::from_entries(vec![
            CropCatalogEntry {
                name: "Tomato".to_string(),
                yield_kg_per_m2: 4.0,
                cycle_days: 75,
            },
            CropCatalogEntry {
                name: "Basil".to_string(),
                yield_kg_per_m2: 2.0,
                cycle_days: 30,
            },
        ])
    }

    fn test_inputs(area: f64) -> UserInputs {
        UserInputs {
            location: "Colombo, Sri Lanka".to_string(),
            area_m2: area,
            season: "Oct-Dec".to_string(),
            goal: Goal::Balanced,
            organic: true,
        }
    }

    #[tokio::test]
    async fn test_request_failure_returns_exact_fallback() {
        let generation = ScriptedGeneration { response: None };
        let catalog = test_catalog();
        let inputs = test_inputs(120.0);

        let plan = select_crops(&generation, &catalog, &inputs, None).await;

        assert!(plan.diagnostics.used_fallback);
        assert!(plan.diagnostics.generation_secs.is_none());
        assert_eq!(plan.crops.len(), 2);
        assert_eq!(plan.crops[0].name, "Tomato");
        assert_eq!(plan.crops[0].area_m2, 84.0);
        assert_eq!(plan.crops[0].cycle_days, 75);
        assert_eq!(plan.crops[1].name, "Basil");
        assert_eq!(plan.crops[1].area_m2, 36.0);
        assert_eq!(plan.crops[1].cycle_days, 30);
        assert!(plan.rationale.contains("Fallback"));

        // Deterministic across invocations.
        let again = select_crops(&generation, &catalog, &inputs, None).await;
        assert_eq!(again.crops, plan.crops);
    }

    #[tokio::test]
    async fn test_schema_invalid_returns_fallback() {
        let generation = ScriptedGeneration {
            response: Some(json!({"totally": "unrelated"})),
        };
        let plan = select_crops(&generation, &test_catalog(), &test_inputs(100.0), None).await;
        assert!(plan.diagnostics.used_fallback);
    }

    #[tokio::test]
    async fn test_unknown_crops_are_filtered() {
        let generation = ScriptedGeneration {
            response: Some(json!({
                "crops": [
                    {"name": "Tomato", "area_m2": 50.0, "cycle_days": 75},
                    {"name": "Dragonfruit", "area_m2": 50.0, "cycle_days": 200}
                ],
                "rationale": "mix"
            })),
        };
        let plan = select_crops(&generation, &test_catalog(), &test_inputs(120.0), None).await;

        assert!(!plan.diagnostics.used_fallback);
        assert!(plan.diagnostics.generation_secs.is_some());
        assert_eq!(plan.crops.len(), 1);
        assert_eq!(plan.crops[0].name, "Tomato");
        // Under budget, so no scaling either.
        assert_eq!(plan.crops[0].area_m2, 50.0);
    }

    #[tokio::test]
    async fn test_header_fields_backfilled_from_inputs() {
        let generation = ScriptedGeneration {
            response: Some(json!({
                "crops": [{"name": "Basil", "area_m2": 10.0, "cycle_days": 30}]
            })),
        };
        let inputs = test_inputs(80.0);
        let plan = select_crops(&generation, &test_catalog(), &inputs, None).await;

        assert_eq!(plan.location, inputs.location);
        assert_eq!(plan.greenhouse_area_m2, 80.0);
        assert_eq!(plan.season, inputs.season);
    }

    #[tokio::test]
    async fn test_all_unknown_crops_fall_back() {
        let generation = ScriptedGeneration {
            response: Some(json!({
                "crops": [{"name": "Durian", "area_m2": 60.0, "cycle_days": 180}]
            })),
        };
        let plan = select_crops(&generation, &test_catalog(), &test_inputs(60.0), None).await;
        assert!(plan.diagnostics.used_fallback);
    }

    #[test]
    fn test_repair_scales_over_budget_proportionally() {
        let raw = vec![
            RawCropItem {
                name: "Tomato".to_string(),
                area_m2: 90.0,
                cycle_days: 75,
            },
            RawCropItem {
                name: "Basil".to_string(),
                area_m2: 60.0,
                cycle_days: 30,
            },
        ];
        let crops = repair_crops(raw, &test_catalog(), 100.0);

        assert_eq!(crops[0].area_m2, 60.0);
        assert_eq!(crops[1].area_m2, 40.0);
        let total: f64 = crops.iter().map(|c| c.area_m2).sum();
        assert!(total <= 100.0 + 1e-9);
    }

    #[test]
    fn test_repair_at_budget_is_noop() {
        let raw = vec![
            RawCropItem {
                name: "Tomato".to_string(),
                area_m2: 70.0,
                cycle_days: 75,
            },
            RawCropItem {
                name: "Basil".to_string(),
                area_m2: 30.0,
                cycle_days: 30,
            },
        ];
        let crops = repair_crops(raw, &test_catalog(), 100.0);
        assert_eq!(crops[0].area_m2, 70.0);
        assert_eq!(crops[1].area_m2, 30.0);
    }

    #[test]
    fn test_repair_drops_non_positive_areas_and_clamps_cycles() {
        let raw = vec![
            RawCropItem {
                name: "Tomato".to_string(),
                area_m2: -5.0,
                cycle_days: 75,
            },
            RawCropItem {
                name: "Basil".to_string(),
                area_m2: 20.0,
                cycle_days: 0,
            },
        ];
        let crops = repair_crops(raw, &test_catalog(), 100.0);
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].name, "Basil");
        assert_eq!(crops[0].cycle_days, 1);
    }

    #[test]
    fn test_repair_is_case_insensitive() {
        let raw = vec![RawCropItem {
            name: " tomato ".to_string(),
            area_m2: 40.0,
            cycle_days: 75,
        }];
        let crops = repair_crops(raw, &test_catalog(), 100.0);
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].name, "tomato");
    }
}
