use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Place, UnitSystem, WeatherPayload};

use super::{WeatherFetcher, truncate_body};

pub const BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_current(&self, place: &Place, units: UnitSystem) -> Result<WeatherPayload> {
        let url = format!("{}/data/2.5/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", place.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let observation_time = DateTime::<Utc>::from_timestamp(parsed.dt, 0).unwrap_or_else(Utc::now);

        let condition_id = parsed.weather.first().map(|w| w.id).unwrap_or_default();
        let is_day = parsed
            .weather
            .first()
            .map(|w| !w.icon.ends_with('n'))
            .unwrap_or(true);

        let location_name = match parsed.sys.country {
            Some(country) => format!("{}, {}", parsed.name, country),
            None => parsed.name,
        };

        // Metric wind comes back in m/s; the card shows km/h.
        let wind_speed = match units {
            UnitSystem::Imperial => parsed.wind.speed,
            UnitSystem::Metric => parsed.wind.speed * 3.6,
        };

        Ok(WeatherPayload {
            provider: "openweather".to_string(),
            location_name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed,
            wind_direction_deg: parsed.wind.deg,
            weather_code: wmo_code(condition_id),
            is_day,
            units,
            observation_time,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[async_trait]
impl WeatherFetcher for OpenWeatherProvider {
    async fn fetch_weather(&self, place: &Place, units: UnitSystem) -> Result<WeatherPayload> {
        self.fetch_current(place, units).await
    }
}

/// Map an OpenWeather condition id onto the closest WMO code.
fn wmo_code(id: u16) -> u8 {
    match id {
        200..=201 | 210..=221 | 230..=232 => 95,
        202 => 99,
        300..=321 => 53,
        500..=504 => 63,
        511 => 66,
        520..=531 => 81,
        600..=602 => 73,
        611..=616 => 67,
        620..=622 => 85,
        701..=762 => 45,
        771 | 781 => 95,
        800 => 0,
        801 => 1,
        802 => 2,
        803 | 804 => 3,
        _ => u8::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;

    #[test]
    fn condition_ids_map_to_wmo_conditions() {
        assert_eq!(Condition::from_wmo(wmo_code(800)), Condition::Clear);
        assert_eq!(Condition::from_wmo(wmo_code(804)), Condition::Overcast);
        assert_eq!(Condition::from_wmo(wmo_code(501)), Condition::Rain);
        assert_eq!(Condition::from_wmo(wmo_code(601)), Condition::Snow);
        assert_eq!(Condition::from_wmo(wmo_code(741)), Condition::Fog);
        assert_eq!(Condition::from_wmo(wmo_code(211)), Condition::Thunderstorm);
        assert_eq!(Condition::from_wmo(wmo_code(999)), Condition::Unknown);
    }

    #[test]
    fn parses_current_response() {
        let body = r#"{
            "name": "Austin",
            "dt": 1717264800,
            "main": { "temp": 91.2, "feels_like": 95.0, "humidity": 48 },
            "weather": [{ "id": 802, "icon": "03n" }],
            "wind": { "speed": 7.5, "deg": 180 },
            "sys": { "country": "US" }
        }"#;
        let parsed: OwCurrentResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.sys.country.as_deref(), Some("US"));
        assert_eq!(parsed.weather[0].id, 802);
        assert_eq!(parsed.wind.deg, Some(180));
    }
}
