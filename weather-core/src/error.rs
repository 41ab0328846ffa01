use thiserror::Error;

/// Failures of a single lookup. Each one ends that request; nothing retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("Geolocation is not supported on this system")]
    LocationUnavailable,

    #[error("Location access was denied")]
    LocationDenied,

    #[error("Unable to determine your location: {0}")]
    LocationError(String),

    #[error("{0}")]
    Validation(String),

    #[error("No weather data found for '{0}'")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Network(err.to_string())
    }
}
