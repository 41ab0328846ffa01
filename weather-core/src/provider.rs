use crate::{
    Config, WeatherError,
    model::{CityName, Coordinates, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// Source of current-weather snapshots.
///
/// Implementations request metric units from the provider; nothing is
/// converted client-side.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_by_coordinates(
        &self,
        coords: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError>;

    /// Lookup for a name that already passed [`CityName::parse`].
    async fn fetch_city(&self, city: &CityName) -> Result<WeatherSnapshot, WeatherError>;

    /// Blank names fail with [`WeatherError::Validation`] before any request is sent.
    async fn fetch_by_city_name(&self, name: &str) -> Result<WeatherSnapshot, WeatherError> {
        let city = CityName::parse(name)?;
        self.fetch_city(&city).await
    }
}

/// Construct the OpenWeather provider using the configured API key.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::new(api_key)?;
    Ok(Arc::new(provider))
}
