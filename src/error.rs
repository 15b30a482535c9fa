use std::path::PathBuf;
use thiserror::Error;

/// Fatal planning errors surfaced to the caller.
///
/// Everything else the pipeline can run into (failed or malformed generation
/// responses, over-budget areas, unknown crop names, missing lookup entries)
/// is absorbed inside the stage that detects it and degrades to a documented
/// deterministic default.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// A reference table (crop catalog or price table) could not be read.
    /// There is no usable fallback without planning data.
    #[error("planning data unavailable: {path:?}: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },
}

impl PlanningError {
    pub fn data_unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
