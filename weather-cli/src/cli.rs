use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode};
use is_terminal::IsTerminal;

use weather_core::{
    Config, EffectRunner,
    config::LocationConfig,
    location::resolver_from_config,
    provider::provider_from_config,
};

use crate::{
    app::{DashboardApp, TerminalGuard, new_dashboard, spawn_key_events},
    render::render_report,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and location preferences.
    Configure,

    /// Print current weather once and exit.
    Show {
        /// City to look up; without it the current location is used.
        city: Option<String>,

        #[command(flatten)]
        location: LocationArgs,
    },

    /// Interactive dashboard with a live clock (the default).
    Dashboard {
        #[command(flatten)]
        location: LocationArgs,

        /// Start in light mode.
        #[arg(long)]
        light: bool,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct LocationArgs {
    /// Latitude to use instead of geolocation.
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude to use instead of geolocation.
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Treat location access as denied.
    #[arg(long)]
    pub no_geolocation: bool,
}

impl LocationArgs {
    /// Command-line flags take precedence over the config file.
    pub fn apply(&self, config: &mut Config) {
        if let (Some(latitude), Some(longitude)) = (self.lat, self.lon) {
            config.location = Some(LocationConfig { latitude, longitude });
        }
        if self.no_geolocation {
            config.geolocation = false;
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let command = self
            .command
            .unwrap_or(Command::Dashboard { location: LocationArgs::default(), light: false });

        match command {
            Command::Configure => configure(),
            Command::Show { city, location } => {
                let mut config = Config::load()?;
                location.apply(&mut config);
                show(&config, city.as_deref()).await
            }
            Command::Dashboard { location, light } => {
                let mut config = Config::load()?;
                location.apply(&mut config);
                dashboard(&config, light).await
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;

    let geolocation = Confirm::new("Look up your location from your IP address?")
        .with_default(config.geolocation)
        .prompt()
        .context("Failed to read geolocation preference")?;

    config.set_api_key(api_key.trim().to_string());
    config.geolocation = geolocation;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, city: Option<&str>) -> Result<()> {
    let provider = provider_from_config(config)?;

    let snapshot = match city {
        Some(city) => provider.fetch_by_city_name(city).await?,
        None => {
            let coords = resolver_from_config(config).resolve_current_location().await?;
            provider.fetch_by_coordinates(coords).await?
        }
    };

    let colored = std::io::stdout().is_terminal();
    print!("{}", render_report(&snapshot, Utc::now(), &Local, colored));
    Ok(())
}

async fn dashboard(config: &Config, light: bool) -> Result<()> {
    if !(std::io::stdin().is_terminal() && std::io::stdout().is_terminal()) {
        bail!("The dashboard needs an interactive terminal; use `weather show` instead");
    }

    let provider = provider_from_config(config)?;
    let resolver = resolver_from_config(config);
    let (runner, actions) = EffectRunner::new(provider, resolver);

    let _terminal = TerminalGuard::enter()?;
    let app = DashboardApp::new(new_dashboard(light), runner, actions, std::io::stdout(), true);

    app.run(spawn_key_events()).await
}
