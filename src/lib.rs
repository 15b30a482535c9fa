//! greenhouse-planner - AI-assisted business planning for small greenhouses.
//!
//! Combines an LLM-proposed crop mix with a deterministic repair pass, a
//! rule-based operations estimator and a market analysis into one plan. The
//! generation service is an injected boundary, so every pipeline branch is
//! testable without a network.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod planner;
pub mod services;

pub use config::Config;
pub use planner::workflow::{launch, run};
