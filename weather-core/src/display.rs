//! Display-only conversions. Nothing here is stored back into a snapshot.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Coarse sky category used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionCategory {
    Thunderstorm,
    Rain,
    /// The 6xx block; snow shares the cloudy icon.
    Cloudy,
    Clear,
}

impl ConditionCategory {
    /// Lossy mapping from a provider condition code. Total: unknown codes are `Clear`.
    pub fn from_code(code: i32) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=599 => Self::Rain,
            600..=699 => Self::Cloudy,
            _ => Self::Clear,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "⛈",
            Self::Rain => "🌧",
            Self::Cloudy => "☁",
            Self::Clear => "☀",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Thunderstorm => "thunderstorm",
            Self::Rain => "rain",
            Self::Cloudy => "cloudy",
            Self::Clear => "clear",
        }
    }
}

/// Whole degrees, halves rounded up (2.5 -> 3, -2.5 -> -2).
pub fn round_celsius(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn format_celsius(value: f64) -> String {
    format!("{}°C", round_celsius(value))
}

/// Meters to kilometers, e.g. 10000 -> "10 km", 2500 -> "2.5 km".
pub fn format_visibility(meters: f64) -> String {
    format!("{} km", meters / 1000.0)
}

pub fn format_percent(value: u8) -> String {
    format!("{value}%")
}

pub fn format_wind(speed_mps: f64) -> String {
    format!("{speed_mps} m/s")
}

pub fn format_pressure(hpa: f64) -> String {
    format!("{hpa} hPa")
}

/// Unix seconds to "hh:mm AM" in the given timezone.
pub fn format_clock_time<Tz>(epoch_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::from_timestamp(epoch_secs, 0) {
        Some(utc) => utc.with_timezone(tz).format("%I:%M %p").to_string(),
        None => "--:--".to_string(),
    }
}

/// e.g. "Monday, October 19, 2026".
pub fn format_long_date<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%A, %B %-d, %Y").to_string()
}

/// e.g. "9:41:07 AM".
pub fn format_wall_clock<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%-I:%M:%S %p").to_string()
}
