//! Live FX rates via Frankfurter (ECB). No API key required.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const API_URL: &str = "https://api.frankfurter.app/latest";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// All monetary plan figures are computed in this currency.
pub const BASE_CURRENCY: &str = "USD";

/// Display currencies the summary report can convert to.
pub const SUPPORTED: [&str; 9] = [
    "USD", "EUR", "GBP", "LKR", "AUD", "CAD", "JPY", "INR", "SGD",
];

pub fn is_supported(code: &str) -> bool {
    SUPPORTED.iter().any(|c| c.eq_ignore_ascii_case(code))
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Returns the rate converting 1 `base` into `target`. Identical currencies
/// short-circuit to 1.0 without a network call.
pub async fn get_rate(base: &str, target: &str) -> Result<f64> {
    let base = base.trim().to_uppercase();
    let target = target.trim().to_uppercase();
    if base == target {
        return Ok(1.0);
    }

    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response: RatesResponse = client
        .get(API_URL)
        .query(&[("from", base.as_str()), ("to", target.as_str())])
        .send()
        .await
        .context("FX request failed")?
        .error_for_status()
        .context("FX request rejected")?
        .json()
        .await
        .context("FX response was not valid JSON")?;

    response
        .rates
        .get(&target)
        .copied()
        .ok_or_else(|| anyhow!("no rate for {} in response", target))
}
