use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::catalog::{CropCatalog, PriceTable, load_crop_catalog, load_price_table};
use crate::config::Config;
use crate::llm::GenerationService;
use crate::llm::client::LLMClient;

/// Shared, read-only context for one planning run.
///
/// Holds the injected generation client plus the reference tables loaded at
/// construction time. Stages receive it immutably; there is no run-scoped
/// mutable state, so a context can serve concurrent runs.
#[derive(Clone)]
pub struct PlannerContext {
    /// Generation-service handle used by the crop selector and market analyst.
    pub generation: Arc<dyn GenerationService>,
    pub config: Config,
    /// Crop reference table.
    pub catalog: Arc<CropCatalog>,
    /// Unit price table (default reference or caller-supplied override).
    pub prices: Arc<PriceTable>,
}

impl PlannerContext {
    /// Creates a context with the production LLM client.
    ///
    /// Loading either reference table can fail with
    /// [`crate::error::PlanningError::DataUnavailable`], the only fatal error
    /// of a planning run. A `price_override` path replaces the default price
    /// table wholesale.
    pub fn new(config: Config, price_override: Option<&Path>) -> Result<Self> {
        let generation: Arc<dyn GenerationService> = Arc::new(LLMClient::new(config.clone())?);
        Self::with_generation(config, price_override, generation)
    }

    /// Creates a context around an injected generation service. Used by tests
    /// to script generation outcomes without a network.
    pub fn with_generation(
        config: Config,
        price_override: Option<&Path>,
        generation: Arc<dyn GenerationService>,
    ) -> Result<Self> {
        let catalog = Arc::new(load_crop_catalog(&config.catalog_path)?);
        let prices_path = price_override.unwrap_or(config.prices_path.as_path());
        let prices = Arc::new(load_price_table(prices_path)?);

        Ok(Self {
            generation,
            config,
            catalog,
            prices,
        })
    }
}
