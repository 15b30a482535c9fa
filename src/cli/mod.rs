use crate::config::{Config, LLMProvider};
use crate::planner::types::{Goal, PlanRequest, UserInputs};
use crate::services::forex;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;

/// greenhouse-planner - AI-assisted business planning for small greenhouses
#[derive(Parser, Debug)]
#[command(name = "greenhouse-planner")]
#[command(
    about = "Produces a crop selection, a resource/cost plan and a profitability estimate for a greenhouse, combining an LLM-proposed crop mix with deterministic repair, estimation and market analysis."
)]
#[command(version)]
pub struct Args {
    /// Location (city/country), used for the crop advisor and weather lookup
    #[arg(short, long, default_value = "Colombo, Sri Lanka")]
    pub location: String,

    /// Greenhouse area in m²
    #[arg(short, long, default_value_t = 120.0, allow_hyphen_values = true)]
    pub area: f64,

    /// Season label (free text)
    #[arg(short, long, default_value = "Oct-Dec")]
    pub season: String,

    /// Planning goal (balanced, maximize_yield, minimize_cost)
    #[arg(short, long, default_value = "balanced")]
    pub goal: String,

    /// Organic preference
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub organic: bool,

    /// Fetch a weather summary (Open-Meteo) and adjust watering for it
    #[arg(long)]
    pub use_weather: bool,

    /// Custom unit price table replacing the default one
    #[arg(long)]
    pub prices: Option<PathBuf>,

    /// Display currency for the summary report
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// What-if area adjustment in percent (50-150, 100 = unchanged)
    #[arg(long, default_value_t = 100)]
    pub area_adjust: u32,

    /// What-if price adjustment in percent (-30..30, 0 = unchanged)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub price_adjust: i32,

    /// Output directory
    #[arg(short, long, default_value = "./greenhouse.plan")]
    pub output_path: PathBuf,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// LLM Provider (openai, moonshot, deepseek, anthropic, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// LLM API base URL
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// Chat model used for both planning calls
    #[arg(long)]
    pub model: Option<String>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Temperature
    #[arg(long)]
    pub temperature: Option<f64>,
}

impl Args {
    /// Resolves the CLI arguments into the static configuration and the
    /// request for this planning run.
    pub fn into_parts(self) -> Result<(Config, PlanRequest)> {
        let mut config = if let Some(config_path) = &self.config {
            Config::from_file(config_path)
                .context(format!("Unable to read config file {:?}", config_path))?
        } else {
            // Without an explicit path, pick up greenhouse.toml from the CWD.
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("greenhouse.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).context(format!(
                    "Unable to read default config file {:?}",
                    default_config_path
                ))?
            } else {
                Config::default()
            }
        };

        config.output_path = self.output_path;
        config.verbose = self.verbose;

        if let Some(provider_str) = self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ Warning: unknown provider: {}, using the default provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        if self.area <= 0.0 {
            bail!("Greenhouse area must be positive, got {}", self.area);
        }
        let goal: Goal = self
            .goal
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let currency = if forex::is_supported(&self.currency) {
            self.currency.trim().to_uppercase()
        } else {
            eprintln!(
                "⚠️ Warning: unsupported currency: {}, reporting in {}",
                self.currency,
                forex::BASE_CURRENCY
            );
            forex::BASE_CURRENCY.to_string()
        };

        let area_adjust_pct = self.area_adjust.clamp(50, 150);
        if area_adjust_pct != self.area_adjust {
            eprintln!(
                "⚠️ Warning: area adjustment clamped to {}%",
                area_adjust_pct
            );
        }
        let price_adjust_pct = self.price_adjust.clamp(-30, 30);
        if price_adjust_pct != self.price_adjust {
            eprintln!(
                "⚠️ Warning: price adjustment clamped to {}%",
                price_adjust_pct
            );
        }

        let request = PlanRequest {
            inputs: UserInputs {
                location: self.location,
                area_m2: self.area,
                season: self.season,
                goal,
                organic: self.organic,
            },
            use_weather: self.use_weather,
            price_override: self.prices,
            currency,
            area_adjust_pct,
            price_adjust_pct,
        };

        Ok((config, request))
    }
}
