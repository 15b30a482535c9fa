//! Generation-service boundary for the planning pipeline.
//!
//! The pipeline never trusts a generation response for its hard constraints;
//! it only needs a best-effort structured value. The outcome of a call is a
//! tagged result so the fallback branches in the stages are explicit and
//! testable without a network.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod client;

/// How a generation call failed. Both variants are recovered locally by the
/// stage that made the call; neither is ever surfaced as a pipeline error.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Network or service error after exhausting retries.
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    /// The service answered, but not with a usable JSON object.
    #[error("generation response failed schema validation: {0}")]
    SchemaInvalid(String),
}

/// A single structured round trip to the generation service.
///
/// Implemented by [`client::LLMClient`] for production use and by scripted
/// doubles in tests. Stages deserialize the returned object themselves and
/// treat a deserialization miss the same as [`GenerationError::SchemaInvalid`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Value, GenerationError>;
}
