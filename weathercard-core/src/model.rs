use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// City name used as the weather query key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Place(pub(crate) String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlaceError {
    #[error("Place name must not be empty")]
    Empty,
}

impl Place {
    pub fn new(name: impl AsRef<str>) -> Result<Self, PlaceError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PlaceError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Place {
    type Err = PlaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Place::new(s)
    }
}

impl TryFrom<String> for Place {
    type Error = PlaceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Place::new(value)
    }
}

impl From<Place> for String {
    fn from(place: Place) -> Self {
        place.0
    }
}

/// Measurement convention requested from the weather source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitSystemError {
    #[error("Unknown unit system '{0}'. Supported: imperial, metric.")]
    Unknown(String),
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "°F",
            UnitSystem::Metric => "°C",
        }
    }

    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "mph",
            UnitSystem::Metric => "km/h",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = UnitSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "imperial" => Ok(UnitSystem::Imperial),
            "metric" => Ok(UnitSystem::Metric),
            _ => Err(UnitSystemError::Unknown(s.to_string())),
        }
    }
}

/// Current conditions for one place, in the unit system that was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub provider: String,
    pub location_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub wind_direction_deg: Option<u16>,
    /// WMO weather interpretation code.
    pub weather_code: u8,
    pub is_day: bool,
    pub units: UnitSystem,
    pub observation_time: DateTime<Utc>,
}

impl WeatherPayload {
    pub fn condition(&self) -> Condition {
        Condition::from_wmo(self.weather_code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Clear,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    FreezingDrizzle,
    Rain,
    FreezingRain,
    Snow,
    SnowGrains,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    ThunderstormHail,
    Unknown,
}

impl Condition {
    pub fn from_wmo(code: u8) -> Self {
        match code {
            0 => Condition::Clear,
            1 => Condition::MainlyClear,
            2 => Condition::PartlyCloudy,
            3 => Condition::Overcast,
            45 | 48 => Condition::Fog,
            51 | 53 | 55 => Condition::Drizzle,
            56 | 57 => Condition::FreezingDrizzle,
            61 | 63 | 65 => Condition::Rain,
            66 | 67 => Condition::FreezingRain,
            71 | 73 | 75 => Condition::Snow,
            77 => Condition::SnowGrains,
            80..=82 => Condition::RainShowers,
            85 | 86 => Condition::SnowShowers,
            95 => Condition::Thunderstorm,
            96 | 99 => Condition::ThunderstormHail,
            _ => Condition::Unknown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Condition::Clear => "Clear sky",
            Condition::MainlyClear => "Mainly clear",
            Condition::PartlyCloudy => "Partly cloudy",
            Condition::Overcast => "Overcast",
            Condition::Fog => "Fog",
            Condition::Drizzle => "Drizzle",
            Condition::FreezingDrizzle => "Freezing drizzle",
            Condition::Rain => "Rain",
            Condition::FreezingRain => "Freezing rain",
            Condition::Snow => "Snow",
            Condition::SnowGrains => "Snow grains",
            Condition::RainShowers => "Rain showers",
            Condition::SnowShowers => "Snow showers",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::ThunderstormHail => "Thunderstorm with hail",
            Condition::Unknown => "Unknown",
        }
    }

    pub fn icon(&self, is_day: bool) -> &'static str {
        match self {
            Condition::Clear | Condition::MainlyClear if is_day => "☀️",
            Condition::Clear | Condition::MainlyClear => "🌙",
            Condition::PartlyCloudy => "⛅",
            Condition::Overcast => "☁️",
            Condition::Fog => "🌫️",
            Condition::Drizzle | Condition::Rain | Condition::RainShowers => "🌧️",
            Condition::FreezingDrizzle | Condition::FreezingRain => "🧊",
            Condition::Snow | Condition::SnowGrains | Condition::SnowShowers => "❄️",
            Condition::Thunderstorm | Condition::ThunderstormHail => "⛈️",
            Condition::Unknown => "🌡️",
        }
    }
}
