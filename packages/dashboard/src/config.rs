//! Dashboard configuration.
//!
//! Values come from environment variables ([`DashboardConfig::from_env`])
//! or a TOML file ([`DashboardConfig::load`]); anything unset falls back to
//! the defaults below.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `CRIME_DASHBOARD_API_URL` | `http://127.0.0.1:5000/api` |
//! | `CRIME_DASHBOARD_FORECAST_STEPS` | `5` |
//! | `CRIME_DASHBOARD_TIMEOUT_SECS` | unset (transport default) |

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::DashboardError;

/// Backend base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Number of forecast periods requested from `/arima-forecast`.
pub const DEFAULT_FORECAST_STEPS: u32 = 5;

/// Runtime configuration of the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Periods to forecast.
    pub forecast_steps: u32,
    /// Per-request timeout in seconds. `None` leaves the transport default.
    pub timeout_secs: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            forecast_steps: DEFAULT_FORECAST_STEPS,
            timeout_secs: None,
        }
    }
}

impl DashboardConfig {
    /// Builds the configuration from `CRIME_DASHBOARD_*` environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if a numeric variable does not
    /// parse or the resulting configuration is invalid.
    pub fn from_env() -> Result<Self, DashboardError> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CRIME_DASHBOARD_API_URL") {
            config.api_url = url;
        }
        if let Ok(steps) = std::env::var("CRIME_DASHBOARD_FORECAST_STEPS") {
            config.forecast_steps = parse_var("CRIME_DASHBOARD_FORECAST_STEPS", &steps)?;
        }
        if let Ok(secs) = std::env::var("CRIME_DASHBOARD_TIMEOUT_SECS") {
            config.timeout_secs = Some(parse_var("CRIME_DASHBOARD_TIMEOUT_SECS", &secs)?);
        }

        config.validated()
    }

    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if the document is malformed or
    /// the resulting configuration is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, DashboardError> {
        let config: Self = toml::de::from_str(s).map_err(|e| DashboardError::Config {
            message: format!("invalid dashboard config: {e}"),
        })?;
        config.validated()
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Config`] if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, DashboardError> {
        let contents = std::fs::read_to_string(path).map_err(|e| DashboardError::Config {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Configured request timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn validated(mut self) -> Result<Self, DashboardError> {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(DashboardError::Config {
                message: "api_url cannot be empty".to_string(),
            });
        }
        self.api_url = trimmed.to_string();

        if self.forecast_steps == 0 {
            return Err(DashboardError::Config {
                message: "forecast_steps must be at least 1".to_string(),
            });
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, DashboardError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DashboardError::Config {
        message: format!("{name}={value}: {e}"),
    })
}
