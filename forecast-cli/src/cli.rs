use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use forecast_core::{Config, Projector, Session, source_from_config};
use inquire::{Password, PasswordDisplayMode, Text};
use std::time::Duration;
use tracing::info;

use crate::{view, watch};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "City forecast lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and a default city.
    Configure,

    /// Fetch and print the forecast for a city once.
    Show {
        /// City name, e.g. "Hermosillo" or "São Paulo".
        city: String,

        /// Print the rendered screen as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Live screen: type a city and the forecast follows.
    Watch {
        /// Initial query; defaults to the configured city.
        #[arg(long)]
        city: Option<String>,
    },

    /// Print the path of the configuration file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, json } => show(city, json).await,
            Command::Watch { city } => {
                let config = Config::load()?;
                let initial = city.unwrap_or_else(|| config.default_city().to_string());
                watch::run(&config, initial).await
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    let city = Text::new("Default city:")
        .with_default(config.default_city())
        .prompt()
        .context("Failed to read default city")?;

    config.set_api_key(api_key.to_string());
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());
    config.save()?;

    info!("configuration saved");
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn show(city: String, json: bool) -> Result<()> {
    if city.trim().is_empty() {
        bail!("City name must not be empty");
    }

    let config = Config::load()?;
    let source = source_from_config(&config)?;
    let projector = Projector::new(config.icon_base());

    // One query, nothing to wait for between keystrokes.
    let mut session = Session::new(source, Duration::ZERO);
    session.input(city);
    session.settle().await;

    let screen = projector.project(session.query(), session.outcome());

    if json {
        let out = serde_json::to_string_pretty(&screen).context("Failed to serialize screen")?;
        println!("{out}");
    } else {
        for line in view::render_lines(&screen, 0) {
            println!("{line}");
        }
    }

    Ok(())
}
