#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data aggregation and synchronization pipeline for the crime dashboard.
//!
//! The dashboard shows historical, predicted, and forecast crime statistics
//! on a heat map and trend charts. This crate owns everything between the
//! filter controls and the renderers:
//!
//! - [`api`] talks to the backend (`/historical`, `/predicted`,
//!   `/arima-forecast`, and the filter option lists).
//! - [`merge`], [`grouping`], and [`forecast`] are pure transformations of
//!   backend payloads into render-ready shapes.
//! - [`coordinator`] issues one cancellable request generation per filter
//!   change and publishes results through [`panel`] state channels,
//!   discarding anything a newer generation has superseded.
//! - [`dashboard`] ties a [`crime_dashboard_models::FilterState`] to a
//!   coordinator so every filter mutation re-issues the right fetch groups.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod dashboard;
pub mod forecast;
pub mod format;
pub mod grouping;
pub mod layers;
pub mod merge;
pub mod options;
pub mod panel;
pub mod session;

use crime_dashboard_models::DatasetSource;
use thiserror::Error;

pub use api::{DashboardApi, HttpDashboardApi};
pub use config::DashboardConfig;
pub use coordinator::{FetchCoordinator, FetchHandle, MapPanelData};
pub use dashboard::{Dashboard, Refresh};
pub use panel::{PanelState, PanelView};
pub use session::{SessionContext, SessionStore};

/// Errors that can occur while fetching or decoding dashboard data.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} from {url}{}", backend_message(.message))]
    Status {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// The backend's `error` message, if it sent one.
        message: Option<String>,
    },

    /// The response body was not the expected JSON shape.
    #[error("Failed to decode response from {url}: {message}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Description of the decoding failure.
        message: String,
    },

    /// One of the two combined-mode requests failed.
    #[error("{dataset} request failed in combined mode: {error}")]
    PartialSource {
        /// Which dataset failed.
        dataset: DatasetSource,
        /// The underlying failure.
        #[source]
        error: Box<Self>,
    },

    /// The request was superseded or torn down before it completed.
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn backend_message(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Coarse classification of [`DashboardError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request rejected, unreachable, non-2xx, or undecodable.
    NetworkFailure,
    /// One half of a combined-mode fetch failed.
    PartialSourceFailure,
    /// Superseded on purpose. Not an error for the user.
    Cancelled,
    /// Local misconfiguration.
    Configuration,
}

impl DashboardError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(_) | Self::Status { .. } | Self::Decode { .. } => ErrorKind::NetworkFailure,
            Self::PartialSource { .. } => ErrorKind::PartialSourceFailure,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config { .. } => ErrorKind::Configuration,
        }
    }

    /// Whether this error only means the request was superseded.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Tags a failure as coming from one half of a combined-mode fetch.
    /// Cancellation is passed through unchanged.
    #[must_use]
    pub fn in_combined(self, dataset: DatasetSource) -> Self {
        if self.is_cancelled() {
            return self;
        }
        Self::PartialSource {
            dataset,
            error: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        let status = DashboardError::Status {
            status: 500,
            url: "http://localhost/api/predicted".to_string(),
            message: Some("Predicted data not loaded.".to_string()),
        };
        assert_eq!(status.kind(), ErrorKind::NetworkFailure);
        assert_eq!(
            status.to_string(),
            "HTTP 500 from http://localhost/api/predicted: Predicted data not loaded."
        );

        let partial = status.in_combined(DatasetSource::Predicted);
        assert_eq!(partial.kind(), ErrorKind::PartialSourceFailure);
        assert!(partial.to_string().starts_with("predicted request failed"));

        assert!(
            DashboardError::Cancelled
                .in_combined(DatasetSource::Historical)
                .is_cancelled()
        );
    }
}
