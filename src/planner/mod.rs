//! The three-stage planning pipeline and its coordinator.
//!
//! Control flow is strictly sequential: crop selection → operations
//! estimation → market analysis. Each stage exclusively owns its output;
//! no stage re-invokes an earlier one.

pub mod context;
pub mod crop_selector;
pub mod market;
pub mod operations;
pub mod outlet;
pub mod types;
pub mod whatif;
pub mod workflow;
