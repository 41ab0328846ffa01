use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A city name that has already passed local validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityName(String);

impl CityName {
    /// Trims the input and rejects blank names without touching the network.
    pub fn parse(raw: &str) -> Result<Self, WeatherError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(WeatherError::Validation("Please enter a city name!".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub cloudiness_pct: u8,
    pub visibility_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_mps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sky {
    pub condition_code: i32,
    pub description: String,
}

/// Sunrise and sunset as unix timestamps (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sun {
    pub sunrise_epoch: i64,
    pub sunset_epoch: i64,
}

/// Everything one successful lookup returned. Replaced as a whole by the next
/// lookup, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Place,
    pub instant: Temperatures,
    pub atmosphere: Atmosphere,
    pub wind: Wind,
    pub sky: Sky,
    pub sun: Sun,
    /// Offset of the searched city from UTC, when the provider reports it.
    pub timezone_offset_secs: Option<i32>,
    pub observed_at_epoch: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_name_is_trimmed() {
        let city = CityName::parse("  London ").unwrap();
        assert_eq!(city.as_str(), "London");
    }

    #[test]
    fn blank_city_name_is_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let err = CityName::parse(raw).unwrap_err();
            assert!(matches!(err, WeatherError::Validation(_)), "input {raw:?}");
        }
    }
}
