//! Where the dashboard is. Terminals have no browser geolocation, so the
//! capability is either a fixed position, an IP lookup, or nothing at all.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{Config, WeatherError, model::Coordinates};

const IP_API_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One-shot position query.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve_current_location(&self) -> Result<Coordinates, WeatherError>;
}

/// Position given explicitly on the command line or in the config file.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationResolver for FixedLocation {
    async fn resolve_current_location(&self) -> Result<Coordinates, WeatherError> {
        Ok(self.0)
    }
}

/// The user switched location access off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocation;

#[async_trait]
impl LocationResolver for DisabledLocation {
    async fn resolve_current_location(&self) -> Result<Coordinates, WeatherError> {
        Err(WeatherError::LocationDenied)
    }
}

/// No geolocation capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationResolver for NoLocation {
    async fn resolve_current_location(&self) -> Result<Coordinates, WeatherError> {
        Err(WeatherError::LocationUnavailable)
    }
}

/// Approximate position derived from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpGeolocation {
    pub fn new() -> Result<Self, WeatherError> {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: &str) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| WeatherError::LocationError(err.to_string()))?;

        Ok(Self { url: url.to_string(), http })
    }
}

#[async_trait]
impl LocationResolver for IpGeolocation {
    async fn resolve_current_location(&self) -> Result<Coordinates, WeatherError> {
        let response = self.http.get(&self.url).send().await.map_err(|err| {
            tracing::debug!("IP geolocation request failed: {}", err);
            WeatherError::LocationError(err.to_string())
        })?;

        if !response.status().is_success() {
            return Err(WeatherError::LocationError(format!(
                "geolocation service returned status {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|err| WeatherError::LocationError(format!("unreadable response: {err}")))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| "lookup failed".to_string());
            return Err(WeatherError::LocationError(reason));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!("Got location: {}, {}", lat, lon);
                Ok(Coordinates::new(lat, lon))
            }
            _ => Err(WeatherError::LocationError("response had no coordinates".to_string())),
        }
    }
}

/// Pick a resolver: explicit coordinates win, then the opt-out, then IP lookup.
pub fn resolver_from_config(config: &Config) -> Arc<dyn LocationResolver> {
    if let Some(coords) = config.fixed_location() {
        return Arc::new(FixedLocation(coords));
    }

    if !config.geolocation {
        return Arc::new(DisabledLocation);
    }

    match IpGeolocation::new() {
        Ok(resolver) => Arc::new(resolver),
        Err(err) => {
            tracing::warn!("IP geolocation unavailable: {}", err);
            Arc::new(NoLocation)
        }
    }
}
