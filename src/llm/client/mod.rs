//! LLM client - unified access to the generation service

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

use crate::config::Config;
use crate::llm::{GenerationError, GenerationService};

mod providers;
pub mod utils;

use providers::ProviderClient;

/// LLM client - unified access to the generation service
#[derive(Clone)]
pub struct LLMClient {
    config: Config,
    client: ProviderClient,
}

impl LLMClient {
    /// Create a new LLM client
    pub fn new(config: Config) -> Result<Self> {
        let client = ProviderClient::new(&config.llm)?;
        Ok(Self { client, config })
    }

    /// Generic retry loop with exponential backoff, doubling the delay per
    /// attempt up to the configured cap.
    async fn retry_with_backoff<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, anyhow::Error>>,
    {
        let llm_config = &self.config.llm;
        let max_retries = llm_config.retry_attempts.max(1);
        let mut delay_ms = llm_config.retry_delay_ms;
        let mut retries = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    retries += 1;
                    eprintln!(
                        "❌ Generation service call failed, retrying (attempt {} / {}): {}",
                        retries, max_retries, err
                    );
                    if retries >= max_retries {
                        return Err(err);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                    delay_ms = (delay_ms * 2).min(llm_config.retry_delay_cap_ms);
                }
            }
        }
    }

    /// Single-turn completion under the configured model.
    pub async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let agent = self
            .client
            .create_agent(&self.config.llm.model, system_prompt, &self.config.llm);

        self.retry_with_backoff(|| async { agent.prompt(user_prompt).await })
            .await
    }
}

#[async_trait]
impl GenerationService for LLMClient {
    async fn generate_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Value, GenerationError> {
        let raw = self
            .prompt(system_prompt, user_prompt)
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;

        utils::extract_json_object(&raw).ok_or_else(|| {
            let sample: String = raw.chars().take(200).collect();
            GenerationError::SchemaInvalid(format!("no JSON object in response: {}", sample))
        })
    }
}
