#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::llm::{GenerationError, GenerationService};
    use crate::planner::context::PlannerContext;
    use crate::planner::market;
    use crate::planner::types::{Goal, PlanRequest, UserInputs, WeatherContext, cost_categories};
    use crate::planner::workflow::{launch, run};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Scripted generation double. Responses are keyed off the stage persona
    /// in the system prompt; `None` scripts a request failure.
    struct ScriptedGeneration {
        crop_response: Option<Value>,
        market_response: Option<Value>,
    }

    #[async_trait]
    impl GenerationService for ScriptedGeneration {
        async fn generate_json(
            &self,
            system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<Value, GenerationError> {
            let response = if system_prompt.contains("CropAdvisor") {
                &self.crop_response
            } else {
                &self.market_response
            };
            response
                .clone()
                .ok_or_else(|| GenerationError::RequestFailed("connection refused".to_string()))
        }
    }

    fn write_tables(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let catalog_path = dir.join("crops.toml");
        std::fs::write(
            &catalog_path,
            r#"
[[crops]]
name = "Tomato"
yield_kg_per_m2 = 4.0
cycle_days = 75

[[crops]]
name = "Basil"
yield_kg_per_m2 = 2.0
cycle_days = 30
"#,
        )
        .unwrap();

        let prices_path = dir.join("prices.toml");
        std::fs::write(
            &prices_path,
            r#"
[[prices]]
crop = "Tomato"
price_usd_per_kg = 2.5

[[prices]]
crop = "Basil"
price_usd_per_kg = 8.0
"#,
        )
        .unwrap();

        (catalog_path, prices_path)
    }

    fn test_config(dir: &Path) -> Config {
        let (catalog_path, prices_path) = write_tables(dir);
        Config {
            catalog_path,
            prices_path,
            output_path: dir.join("out"),
            ..Config::default()
        }
    }

    fn test_inputs() -> UserInputs {
        UserInputs {
            location: "Colombo, Sri Lanka".to_string(),
            area_m2: 120.0,
            season: "Oct-Dec".to_string(),
            goal: Goal::Balanced,
            organic: true,
        }
    }

    fn scripted_context(dir: &Path, generation: ScriptedGeneration) -> PlannerContext {
        PlannerContext::with_generation(test_config(dir), None, Arc::new(generation)).unwrap()
    }

    #[tokio::test]
    async fn test_run_combines_all_stages() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = scripted_context(
            temp_dir.path(),
            ScriptedGeneration {
                crop_response: Some(json!({
                    "location": "Colombo, Sri Lanka",
                    "greenhouse_area_m2": 120.0,
                    "season": "Oct-Dec",
                    "crops": [
                        {"name": "Tomato", "area_m2": 84.0, "cycle_days": 75},
                        {"name": "Basil", "area_m2": 36.0, "cycle_days": 30}
                    ],
                    "rationale": "High-demand pairing."
                })),
                market_response: Some(json!({
                    "go_to_market": ["Caprese kits for cafes", "Weekly subscription boxes"]
                })),
            },
        );

        let result = run(&ctx, &test_inputs(), None).await;

        assert!(!result.crop_plan.diagnostics.used_fallback);
        assert_eq!(result.crop_plan.crops.len(), 2);
        assert_eq!(result.crop_plan.rationale, "High-demand pairing.");

        let tomato = &result.ops_plan.crops[0];
        assert_eq!(tomato.name, "Tomato");
        assert_eq!(tomato.expected_yield_kg, 313.6);
        assert_eq!(tomato.watering_l_per_day, 252.0);
        assert_eq!(tomato.fertilizer_g_per_week, 3402.0);
        let basil = &result.ops_plan.crops[1];
        assert_eq!(basil.expected_yield_kg, 168.0);
        assert_eq!(basil.watering_l_per_day, 43.2);
        assert_eq!(basil.fertilizer_g_per_week, 388.8);

        assert_eq!(result.ops_plan.costs[cost_categories::WATER], 20.66);
        assert_eq!(result.ops_plan.costs[cost_categories::NUTRIENTS], 379.08);
        assert_eq!(result.ops_plan.costs[cost_categories::LABOR], 120.0);
        assert_eq!(result.ops_plan.costs[cost_categories::MISC], 25.0);

        assert_eq!(result.market_plan.revenue_usd, 2128.0);
        assert_eq!(result.market_plan.cogs_usd, 544.74);
        assert_eq!(result.market_plan.margin_pct, 74.4);
        assert_eq!(result.market_plan.go_to_market.len(), 2);
        assert_eq!(result.weather, None);
    }

    #[tokio::test]
    async fn test_run_degrades_to_fallbacks_on_generation_failure() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = scripted_context(
            temp_dir.path(),
            ScriptedGeneration {
                crop_response: None,
                market_response: None,
            },
        );

        let result = run(&ctx, &test_inputs(), None).await;

        assert!(result.crop_plan.diagnostics.used_fallback);
        assert_eq!(result.crop_plan.crops[0].name, "Tomato");
        assert_eq!(result.crop_plan.crops[0].area_m2, 84.0);
        assert_eq!(result.crop_plan.crops[1].name, "Basil");
        assert_eq!(result.crop_plan.crops[1].area_m2, 36.0);
        assert_eq!(result.market_plan.go_to_market, market::fallback_ideas());
        // The deterministic stages still produce full financials.
        assert_eq!(result.market_plan.revenue_usd, 2128.0);
        assert_eq!(result.market_plan.margin_pct, 74.4);
    }

    #[tokio::test]
    async fn test_run_threads_weather_into_operations() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = scripted_context(
            temp_dir.path(),
            ScriptedGeneration {
                crop_response: None,
                market_response: None,
            },
        );
        let weather = WeatherContext {
            avg_temp_c: 27.0,
            avg_precip_mm: 5.0,
        };

        let with_weather = run(&ctx, &test_inputs(), Some(&weather)).await;
        let without = run(&ctx, &test_inputs(), None).await;

        assert_eq!(with_weather.weather, Some(weather));
        // 27°C is one degree-band above the comfort point: watering +10%.
        assert_eq!(with_weather.ops_plan.crops[0].watering_l_per_day, 277.2);
        assert_eq!(without.ops_plan.crops[0].watering_l_per_day, 252.0);
        // Yields are weather-independent.
        assert_eq!(
            with_weather.ops_plan.crops[0].expected_yield_kg,
            without.ops_plan.crops[0].expected_yield_kg
        );
    }

    #[tokio::test]
    async fn test_launch_writes_plan_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        // Unreachable endpoint with minimal retries: both generation calls
        // fail fast and the run exercises the fallback paths end to end.
        config.llm.api_base_url = "http://127.0.0.1:9".to_string();
        config.llm.api_key = "unused".to_string();
        config.llm.retry_attempts = 1;
        config.llm.retry_delay_ms = 1;
        config.llm.retry_delay_cap_ms = 1;

        let request = PlanRequest {
            inputs: test_inputs(),
            use_weather: false,
            price_override: None,
            currency: "USD".to_string(),
            area_adjust_pct: 150,
            price_adjust_pct: 0,
        };

        launch(&config, &request).await.unwrap();

        let plan_path = config.output_path.join("plan.json");
        let what_if_path = config.output_path.join("what_if.json");
        let summary_path = config.output_path.join("summary.md");
        assert!(plan_path.exists());
        assert!(what_if_path.exists());
        assert!(summary_path.exists());

        let plan: crate::planner::types::CombinedResult =
            serde_json::from_str(&std::fs::read_to_string(&plan_path).unwrap()).unwrap();
        assert!(plan.crop_plan.diagnostics.used_fallback);
        assert_eq!(plan.market_plan.revenue_usd, 2128.0);

        let summary = std::fs::read_to_string(&summary_path).unwrap();
        assert!(summary.contains("# Greenhouse Plan"));
        assert!(summary.contains("What-if scenario"));
    }

    #[tokio::test]
    async fn test_launch_fails_without_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path());
        config.catalog_path = temp_dir.path().join("missing.toml");

        let request = PlanRequest {
            inputs: test_inputs(),
            use_weather: false,
            price_override: None,
            currency: "USD".to_string(),
            area_adjust_pct: 100,
            price_adjust_pct: 0,
        };

        let err = launch(&config, &request).await.unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }
}
