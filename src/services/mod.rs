//! External collaborators: weather summary and FX rate lookups.
//! Both are optional integrations; failures degrade to planning without them.

pub mod forex;
pub mod weather;
