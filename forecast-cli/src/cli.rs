use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ForecastPresenter, LocationQuery, ProviderId, ViewState,
    location::{IpLocation, LocationChain},
    model::Coordinate,
    provider::provider_from_config,
    resolve_location,
};
use inquire::{Confirm, Password, PasswordDisplayMode};
use tracing::info;

use crate::render::render_state;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Multi-day weather forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Show the daily forecast for the current location.
    Show {
        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Latitude in decimal degrees; skips location lookup.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees; skips location lookup.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Place name; skips location lookup.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        query: Option<String>,

        /// Number of days to request.
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=14))]
        days: Option<u8>,

        /// Print the resulting state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List known providers and whether they are configured.
    Providers,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure { provider } => configure(&provider)?,
            Command::Show { provider, lat, lon, query, days, json } => {
                let location = match (lat, lon, query) {
                    (Some(lat), Some(lon), _) => Some(Coordinate::new(lat, lon).into()),
                    (_, _, Some(q)) => Some(LocationQuery::Text(q)),
                    _ => None,
                };
                return show(provider.as_deref(), location, days, json).await;
            }
            Command::Providers => providers()?,
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    let make_default = match config.default_provider_id() {
        Ok(current) if current != id => Confirm::new(&format!(
            "Make {id} the default provider (currently {current})?"
        ))
        .with_default(false)
        .prompt()
        .context("Failed to read answer")?,
        _ => true,
    };

    config.upsert_provider_api_key(id, api_key);
    if make_default {
        config.set_default_provider(id);
    }

    let path = config.save()?;
    println!("Saved {id} credentials to {}", path.display());

    Ok(())
}

async fn show(
    provider: Option<&str>,
    location: Option<LocationQuery>,
    days: Option<u8>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;

    let id = match provider {
        Some(p) => ProviderId::try_from(p)?,
        None => config.default_provider_id()?,
    };
    let provider = provider_from_config(id, &config)?;
    let days = days.unwrap_or(config.forecast.days);

    let query = match location {
        Some(q) => q,
        None => {
            let mut sources = LocationChain::new();
            if config.location.ip_lookup {
                sources = sources.with(IpLocation::new());
            }
            let fix =
                resolve_location(&sources, config.location.timeout(), config.location.fallback)
                    .await;
            if fix.is_fallback() {
                eprintln!("Using fallback location {}", fix.coordinate());
            }
            fix.coordinate().into()
        }
    };

    info!(%id, %query, days, "Fetching forecast");

    let presenter = Arc::new(ForecastPresenter::new(Arc::from(provider), days));
    let mut handle = presenter.spawn_fetch(query);

    tokio::select! {
        res = &mut handle => res.context("Forecast task failed")?,
        _ = tokio::signal::ctrl_c() => {
            handle.abort();
            bail!("Interrupted");
        }
    }

    let state: ViewState = presenter.state();

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        print!("{}", render_state(&state, id, days));
    }

    if state.error.is_some() { Ok(ExitCode::FAILURE) } else { Ok(ExitCode::SUCCESS) }
}

fn providers() -> anyhow::Result<()> {
    let config = Config::load()?;
    let default = config.default_provider_id().ok();

    for id in ProviderId::all() {
        let status = if config.is_provider_configured(*id) { "configured" } else { "not configured" };
        let marker = if default == Some(*id) { " (default)" } else { "" };
        println!("{:<12} {status}{marker}", id.as_str());
    }

    Ok(())
}
