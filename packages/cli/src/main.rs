#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the crime dashboard.
//!
//! With a subcommand it runs a single fetch group and prints the result.
//! Without one it starts an interactive session that keeps a filter and
//! re-renders the panels after every change.
//!
//! Uses `indicatif-log-bridge` (via [`crime_dashboard_cli_utils::init_logger`])
//! so log lines and loading spinners never fight for the terminal.

mod commands;
mod interactive;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use crime_dashboard::{DashboardConfig, SessionContext, SessionStore};
use crime_dashboard_models::{DatasetMode, YearSelection};

/// Browse historical, predicted, and forecast crime statistics.
#[derive(Parser)]
#[command(name = "crime_dashboard")]
#[command(about = "Browse historical, predicted, and forecast crime statistics")]
struct Cli {
    /// TOML configuration file. Environment variables are used otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Subcommand to execute. Starts the interactive session when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// One-shot subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the selectable regions, crime types, and years.
    Options,

    /// Fetch map and chart data for a filter.
    Fetch {
        /// Dataset: historical, predicted, or combined.
        #[arg(long, default_value = "historical")]
        mode: DatasetMode,

        /// Region name, or "All".
        #[arg(long, default_value = "All")]
        region: String,

        /// Comma-separated crime types (default: all).
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Year, or "All".
        #[arg(long, default_value = "All")]
        year: YearSelection,
    },

    /// Fetch the ARIMA forecast for a region.
    Forecast {
        /// Region name, or "All".
        #[arg(long, default_value = "All")]
        region: String,
    },
}

fn load_config(cli: &Cli) -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::from_env()?,
    };
    if let Some(url) = &cli.api_url {
        config.api_url.clone_from(url);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_dashboard_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    log::debug!("Using backend {}", config.api_url);

    let session = Arc::new(SessionStore::new());
    if let Some(token) = cli.token {
        session.login(SessionContext::new(token, None));
    }

    match cli.command {
        Some(Commands::Options) => commands::options(&config, session, &multi).await?,
        Some(Commands::Fetch {
            mode,
            region,
            categories,
            year,
        }) => {
            let filter = commands::build_filter(mode, &region, &categories, year)?;
            commands::fetch(&config, session, &multi, &filter).await?;
        }
        Some(Commands::Forecast { region }) => {
            commands::forecast(&config, session, &multi, &region).await?;
        }
        None => interactive::run(&config, session, &multi).await?,
    }

    Ok(())
}
