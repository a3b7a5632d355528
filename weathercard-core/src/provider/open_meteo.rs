use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::model::{Place, UnitSystem, WeatherPayload};

use super::{WeatherFetcher, truncate_body};

pub const GEOCODING_BASE_URL: &str = "https://geocoding-api.open-meteo.com";
pub const FORECAST_BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,weather_code,wind_speed_10m,wind_direction_10m";

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Place not found: {0}")]
    NotFound(String),
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Keyless provider backed by the Open-Meteo geocoding and forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    geocoding_base: String,
    forecast_base: String,
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self::with_base_urls(GEOCODING_BASE_URL, FORECAST_BASE_URL)
    }

    /// Points the provider at different hosts, e.g. a mock server.
    pub fn with_base_urls(geocoding_base: impl Into<String>, forecast_base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            geocoding_base: geocoding_base.into().trim_end_matches('/').to_string(),
            forecast_base: forecast_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn geocode(&self, place: &Place) -> Result<Location> {
        let url = format!("{}/v1/search", self.geocoding_base);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", place.as_str()),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (geocoding)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GeocodingResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo geocoding JSON")?;

        let hit = parsed
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| GeocodingError::NotFound(place.to_string()))?;

        let name = match (&hit.admin1, &hit.country) {
            (Some(region), _) => format!("{}, {}", hit.name, region),
            (None, Some(country)) => format!("{}, {}", hit.name, country),
            (None, None) => hit.name,
        };

        Ok(Location {
            name,
            lat: hit.latitude,
            lon: hit.longitude,
        })
    }

    pub async fn current(&self, location: &Location, units: UnitSystem) -> Result<WeatherPayload> {
        let url = format!("{}/v1/forecast", self.forecast_base);
        let (temperature_unit, wind_speed_unit) = match units {
            UnitSystem::Imperial => ("fahrenheit", "mph"),
            UnitSystem::Metric => ("celsius", "kmh"),
        };

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", location.lat.to_string().as_str()),
                ("longitude", location.lon.to_string().as_str()),
                ("current", CURRENT_FIELDS),
                ("temperature_unit", temperature_unit),
                ("wind_speed_unit", wind_speed_unit),
                ("timezone", "GMT"),
            ])
            .send()
            .await
            .context("Failed to send request to Open-Meteo (forecast)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo forecast response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: ForecastResponse =
            serde_json::from_str(&body).context("Failed to parse Open-Meteo forecast JSON")?;
        let current = parsed.current;

        let observation_time = parse_local_time(&current.time).unwrap_or_else(Utc::now);

        Ok(WeatherPayload {
            provider: "open-meteo".to_string(),
            location_name: location.name.clone(),
            temperature: current.temperature_2m,
            feels_like: current.apparent_temperature,
            humidity_pct: current.relative_humidity_2m.clamp(0.0, 100.0).round() as u8,
            wind_speed: current.wind_speed_10m,
            wind_direction_deg: current.wind_direction_10m.map(|deg| deg.round() as u16 % 360),
            weather_code: current.weather_code,
            is_day: current.is_day != 0,
            units,
            observation_time,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    #[serde(default = "default_is_day")]
    is_day: u8,
    weather_code: u8,
    wind_speed_10m: f64,
    wind_direction_10m: Option<f64>,
}

fn default_is_day() -> u8 {
    1
}

#[async_trait]
impl WeatherFetcher for OpenMeteoProvider {
    async fn fetch_weather(&self, place: &Place, units: UnitSystem) -> Result<WeatherPayload> {
        let location = self.geocode(place).await?;
        debug!(place = %place, lat = location.lat, lon = location.lon, "geocoded place");
        self.current(&location, units).await
    }
}

/// Open-Meteo reports `current.time` as `YYYY-MM-DDTHH:MM` in the requested
/// timezone, which is always GMT here.
fn parse_local_time(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .ok()
        .map(|ndt| ndt.and_utc())
}
