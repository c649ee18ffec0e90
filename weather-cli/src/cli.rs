use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode};
use std::{net::SocketAddr, sync::Arc};
use weather_core::{
    Config, LookupParams, Units, WeatherClient, WeatherProxy, client::DEFAULT_SERVER_URL, server,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup proxy and client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Run the lookup proxy.
    Serve {
        /// Address to listen on; overrides the config file and WEATHER_LISTEN_ADDR.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Show current weather for a city or a coordinate pair.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// City name, e.g. "London". Takes precedence over coordinates.
    #[arg(long)]
    city: Option<String>,

    /// Latitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude in decimal degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    #[arg(long, value_enum, default_value_t = UnitsArg::Metric)]
    units: UnitsArg,

    /// Base URL of a running proxy.
    #[arg(long, env = "WEATHER_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
    Standard,
}

impl From<UnitsArg> for Units {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
            UnitsArg::Standard => Units::Standard,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Serve { addr } => serve(addr).await,
            Command::Show(args) => show(args).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn serve(addr: Option<SocketAddr>) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    tracing::info!(?config, "loaded configuration");

    let address = match addr {
        Some(addr) => addr,
        None => config.listen_addr()?,
    };

    let proxy = Arc::new(WeatherProxy::from_config(&config));
    server::serve(address, proxy).await
}

async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let units = Units::from(args.units);
    let params = LookupParams {
        city: args.city,
        lat: args.lat,
        lon: args.lon,
        units: Some(units),
    };

    let client = WeatherClient::new(&args.server);
    let payload = client.fetch_weather(&params).await?;
    let summary = payload
        .summary()
        .context("Weather service returned an unexpected payload")?;

    println!("{}", render::summary(&summary, units));
    Ok(())
}
