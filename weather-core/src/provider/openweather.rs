use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    WeatherError,
    model::{
        Atmosphere, CityName, Coordinates, Place, Sky, Sun, Temperatures, WeatherSnapshot, Wind,
    },
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Visibility reported when the provider leaves the field out (its documented maximum).
const DEFAULT_VISIBILITY_METERS: f64 = 10_000.0;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)).build()?;

        Ok(Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http })
    }

    async fn fetch_current(
        &self,
        params: &[(&str, &str)],
        label: &str,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        tracing::debug!(query = label, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(query = label, error = %err, "OpenWeather request failed");
                WeatherError::Network(format!("Failed to send request to OpenWeather: {err}"))
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            WeatherError::Network(format!("Failed to read OpenWeather response body: {err}"))
        })?;

        if status == StatusCode::NOT_FOUND {
            tracing::warn!(query = label, "OpenWeather has no match");
            return Err(WeatherError::NotFound(label.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(query = label, %status, "OpenWeather returned an error status");
            return Err(WeatherError::Network(format!(
                "OpenWeather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(|err| {
            tracing::warn!(query = label, error = %err, "malformed OpenWeather response");
            WeatherError::Network(format!("Failed to parse OpenWeather JSON: {err}"))
        })?;

        parsed.into_snapshot()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_max: f64,
    temp_min: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: i32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    // Absent for coordinates over open water.
    #[serde(default)]
    country: Option<String>,
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    timezone: Option<i32>,
    #[serde(default)]
    dt: Option<i64>,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> Result<WeatherSnapshot, WeatherError> {
        let sky = self
            .weather
            .into_iter()
            .next()
            .map(|w| Sky { condition_code: w.id, description: w.description })
            .ok_or_else(|| {
                WeatherError::Network("OpenWeather response contained no conditions".to_string())
            })?;

        Ok(WeatherSnapshot {
            location: Place { name: self.name, country_code: self.sys.country.unwrap_or_default() },
            instant: Temperatures {
                temperature_c: self.main.temp,
                feels_like_c: self.main.feels_like,
                temp_max_c: self.main.temp_max,
                temp_min_c: self.main.temp_min,
            },
            atmosphere: Atmosphere {
                humidity_pct: self.main.humidity.min(100),
                pressure_hpa: self.main.pressure,
                cloudiness_pct: self.clouds.all.min(100),
                visibility_meters: self.visibility.unwrap_or(DEFAULT_VISIBILITY_METERS),
            },
            wind: Wind { speed_mps: self.wind.speed },
            sky,
            sun: Sun { sunrise_epoch: self.sys.sunrise, sunset_epoch: self.sys.sunset },
            timezone_offset_secs: self.timezone,
            observed_at_epoch: self.dt,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let label = format!("{lat}, {lon}");

        self.fetch_current(&[("lat", lat.as_str()), ("lon", lon.as_str())], &label).await
    }

    async fn fetch_city(&self, city: &CityName) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch_current(&[("q", city.as_str())], city.as_str()).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
