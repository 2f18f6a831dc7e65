use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::debug;
use weather_core::{Config, WeatherClient, config::DEFAULT_BASE_URL};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weatherapi.com API key (and optionally a custom endpoint).
    Configure,

    /// Show current weather and a three-day forecast for a city.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,

        /// Only fetch current conditions.
        #[arg(long)]
        current: bool,

        /// Print the decoded report as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, current, json } => show(&city, current, json).await,
        }
    }
}

/// Reject blank input before any request is built.
pub fn validate_city(input: &str) -> anyhow::Result<&str> {
    let city = input.trim();
    if city.is_empty() {
        return Err(anyhow!("Please enter a city name"));
    }
    Ok(city)
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("weatherapi.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.set_api_key(api_key.to_string());

    let current_base = config.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = Text::new("API base URL:")
        .with_default(&current_base)
        .prompt()
        .context("Failed to read base URL")?;
    config.set_base_url((base_url.trim() != DEFAULT_BASE_URL).then_some(base_url));

    // Validate before persisting.
    config.client_config()?;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(input: &str, current_only: bool, json: bool) -> anyhow::Result<()> {
    let city = validate_city(input)?;

    let config = Config::load()?.apply_env();
    let client = WeatherClient::new(config.client_config()?);
    debug!(?client, "Client ready");

    eprintln!("Fetching weather for {city}...");

    let result = if current_only {
        client.fetch_current(city).await
    } else {
        client.fetch_weather(city).await
    };

    let report = result.map_err(|err| anyhow!(render::error_message(&err)))?;

    if json {
        let text =
            serde_json::to_string_pretty(&report).context("Failed to serialize weather report")?;
        println!("{text}");
    } else {
        print!("{}", render::ReportView::new(city, &report));
    }

    Ok(())
}
