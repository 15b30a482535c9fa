//! Seasonal weather summary via Open-Meteo (geocoding + 7-day forecast).

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::time::Duration;

use crate::planner::types::WeatherContext;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyForecast,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_sum: Vec<f64>,
}

/// Resolves a location string to an averaged 7-day weather summary.
///
/// The location is geocoded by its first comma-separated segment ("Colombo,
/// Sri Lanka" → "Colombo"). Any failure here is non-fatal to a planning run;
/// the caller proceeds without weather adjustment.
pub async fn fetch_weather_summary(location: &str) -> Result<WeatherContext> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let place = location.split(',').next().unwrap_or(location).trim();
    if place.is_empty() {
        return Err(anyhow!("empty location"));
    }

    let geo: GeocodingResponse = client
        .get(GEOCODING_URL)
        .query(&[("name", place), ("count", "1")])
        .send()
        .await
        .context("Geocoding request failed")?
        .error_for_status()
        .context("Geocoding request rejected")?
        .json()
        .await
        .context("Geocoding response was not valid JSON")?;

    let hit = geo
        .results
        .first()
        .ok_or_else(|| anyhow!("no geocoding match for {:?}", place))?;

    let forecast: ForecastResponse = client
        .get(FORECAST_URL)
        .query(&[
            ("latitude", hit.latitude.to_string()),
            ("longitude", hit.longitude.to_string()),
            (
                "daily",
                "temperature_2m_max,temperature_2m_min,precipitation_sum".to_string(),
            ),
            ("timezone", "UTC".to_string()),
        ])
        .send()
        .await
        .context("Forecast request failed")?
        .error_for_status()
        .context("Forecast request rejected")?
        .json()
        .await
        .context("Forecast response was not valid JSON")?;

    summarize_daily(&forecast.daily)
}

fn summarize_daily(daily: &DailyForecast) -> Result<WeatherContext> {
    let days = daily
        .temperature_2m_max
        .len()
        .min(daily.temperature_2m_min.len());
    if days == 0 {
        return Err(anyhow!("forecast contained no daily data"));
    }

    let mut temp_sum = 0.0;
    for i in 0..days {
        temp_sum += (daily.temperature_2m_max[i] + daily.temperature_2m_min[i]) / 2.0;
    }
    let avg_temp_c = (temp_sum / days as f64 * 10.0).round() / 10.0;

    let precip_days = daily.precipitation_sum.len().max(1);
    let avg_precip_mm = (daily.precipitation_sum.iter().sum::<f64>() / precip_days as f64 * 10.0)
        .round()
        / 10.0;

    Ok(WeatherContext {
        avg_temp_c,
        avg_precip_mm,
    })
}
