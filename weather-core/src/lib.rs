//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location resolvers and the OpenWeather provider
//! - Shared domain models (coordinates, snapshots) and the error taxonomy
//! - The fetch-and-render state machine, notices and the clock task
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod location;
pub mod model;
pub mod notify;
pub mod provider;
pub mod runner;

pub use config::Config;
pub use dashboard::{Action, Dashboard, Effect, Lookup, RequestState, Theme};
pub use error::WeatherError;
pub use location::LocationResolver;
pub use model::{CityName, Coordinates, WeatherSnapshot};
pub use notify::{Notice, NoticeBoard, NoticeLevel, NotificationSink};
pub use provider::WeatherProvider;
pub use runner::EffectRunner;
