//! Backend API client.
//!
//! [`DashboardApi`] is the seam between the coordinator and the network:
//! the coordinator only ever sees typed payloads or a [`DashboardError`].
//! [`HttpDashboardApi`] is the `reqwest` implementation used in production.
//! Requests are never retried; a superseded request is aborted by dropping
//! its future, which closes the connection.

use std::sync::Arc;

use async_trait::async_trait;
use crime_dashboard_models::{
    DatasetPayload, DatasetSource, FilterState, RawForecastPoint, RegionSelection,
};
use serde::de::DeserializeOwned;

use crate::DashboardError;
use crate::config::DashboardConfig;
use crate::session::SessionStore;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Query parameters of `GET /historical` and `GET /predicted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetQuery {
    /// Region name or `All`.
    pub state: String,
    /// `All` or comma-joined category names.
    pub crime_type: String,
    /// Year or `All`.
    pub year: String,
}

impl DatasetQuery {
    /// Encodes the current filter selection.
    #[must_use]
    pub fn from_filter(filter: &FilterState) -> Self {
        Self {
            state: filter.region().as_query_value().to_string(),
            crime_type: filter.crime_type_param(),
            year: filter.year().as_query_value(),
        }
    }

    fn params(&self) -> [(&'static str, &str); 3] {
        [
            ("state", &self.state),
            ("crime_type", &self.crime_type),
            ("year", &self.year),
        ]
    }
}

/// Query parameters of `GET /arima-forecast`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastQuery {
    /// Region name, or empty for every region.
    pub state: String,
    /// Number of periods to forecast.
    pub steps: u32,
}

impl ForecastQuery {
    /// Builds the query for a region selection.
    #[must_use]
    pub fn new(region: &RegionSelection, steps: u32) -> Self {
        Self {
            state: region.name().unwrap_or_default().to_string(),
            steps,
        }
    }
}

/// The flat option lists backing the filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionList {
    /// `GET /states`
    States,
    /// `GET /crime_types`
    CrimeTypes,
    /// `GET /years`
    Years,
}

impl OptionList {
    /// Endpoint path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::States => "states",
            Self::CrimeTypes => "crime_types",
            Self::Years => "years",
        }
    }
}

/// Read-only access to the dashboard backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Fetches one of the filter option lists. Numeric entries are returned
    /// in their decimal string form.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the request or decoding fails.
    async fn option_values(&self, list: OptionList) -> Result<Vec<String>, DashboardError>;

    /// Fetches map and chart data of one dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the request or decoding fails.
    async fn dataset(
        &self,
        source: DatasetSource,
        query: &DatasetQuery,
    ) -> Result<DatasetPayload, DashboardError>;

    /// Fetches the raw forecast series.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the request or decoding fails.
    async fn forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<RawForecastPoint>, DashboardError>;
}

/// `reqwest`-backed [`DashboardApi`].
pub struct HttpDashboardApi {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpDashboardApi {
    /// Creates a client for the configured backend. The session store is
    /// consulted on every request.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Http`] if the HTTP client cannot be built.
    pub fn new(
        config: &DashboardConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, DashboardError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, DashboardError> {
        let url = self.url(path);
        let mut request = self.client.get(&url).query(query);
        if let Some(session) = self.session.current() {
            request = request.header(reqwest::header::AUTHORIZATION, session.authorization());
        }

        log::debug!("GET {url} {query:?}");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = backend_error_message(&text);
            log::warn!("GET {url} returned HTTP {status}: {message:?}");
            return Err(DashboardError::Status {
                status: status.as_u16(),
                url,
                message,
            });
        }

        decode_body(&url, &text)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn option_values(&self, list: OptionList) -> Result<Vec<String>, DashboardError> {
        let values: Vec<serde_json::Value> = self.get_json(list.path(), &[]).await?;
        Ok(option_strings(values))
    }

    async fn dataset(
        &self,
        source: DatasetSource,
        query: &DatasetQuery,
    ) -> Result<DatasetPayload, DashboardError> {
        self.get_json(source.path(), &query.params()).await
    }

    async fn forecast(
        &self,
        query: &ForecastQuery,
    ) -> Result<Vec<RawForecastPoint>, DashboardError> {
        let steps = query.steps.to_string();
        self.get_json(
            "arima-forecast",
            &[("state", query.state.as_str()), ("steps", steps.as_str())],
        )
        .await
    }
}

/// Parses a JSON body, logging a preview of it when it does not decode.
fn decode_body<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, DashboardError> {
    serde_json::from_str(text).map_err(|e| {
        log::error!(
            "JSON parse failed\n  \
             url: {url}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {}",
            text.len(),
            preview(text),
        );
        DashboardError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        }
    })
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Extracts the backend's `{"error": "..."}` message from an error body.
fn backend_error_message(text: &str) -> Option<String> {
    let body: serde_json::Value = serde_json::from_str(text).ok()?;
    body.get("error")?.as_str().map(String::from)
}

/// Normalizes a mixed string/number option array into strings. Other JSON
/// values are dropped.
fn option_strings(values: Vec<serde_json::Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crime_dashboard_models::{DatasetMode, YearSelection};

    use super::*;

    #[test]
    fn encodes_dataset_query_from_filter() {
        let mut filter = FilterState::new();
        assert_eq!(
            DatasetQuery::from_filter(&filter),
            DatasetQuery {
                state: "All".to_string(),
                crime_type: "All".to_string(),
                year: "All".to_string(),
            }
        );

        filter.set_region(RegionSelection::new("Goa"));
        filter.set_categories(["theft", "arson"]).unwrap();
        filter.set_year(YearSelection::Year(2011));
        filter.set_dataset_mode(DatasetMode::Combined);

        let query = DatasetQuery::from_filter(&filter);
        assert_eq!(
            query.params(),
            [("state", "Goa"), ("crime_type", "theft,arson"), ("year", "2011")]
        );
    }

    #[test]
    fn forecast_query_uses_empty_state_for_all() {
        assert_eq!(ForecastQuery::new(&RegionSelection::All, 5).state, "");
        assert_eq!(
            ForecastQuery::new(&RegionSelection::new("Goa"), 3),
            ForecastQuery {
                state: "Goa".to_string(),
                steps: 3
            }
        );
    }

    #[test]
    fn decodes_dataset_payload() {
        let payload: DatasetPayload = decode_body(
            "http://localhost/api/historical",
            r#"{"mapData":[{"City":"Agra","Latitude":27.1,"Longitude":78.0,"Crime Count":9}],
                "chartData":[{"Year":2001,"Crime Count":9}]}"#,
        )
        .unwrap();
        assert_eq!(payload.map_data.len(), 1);
        assert_eq!(payload.chart_data[0].year, 2001);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = decode_body::<DatasetPayload>("http://localhost/api/historical", "<html>")
            .unwrap_err();
        assert!(matches!(err, DashboardError::Decode { .. }));
    }

    #[test]
    fn reads_backend_error_message() {
        assert_eq!(
            backend_error_message(r#"{"error": "No ARIMA forecast available."}"#).as_deref(),
            Some("No ARIMA forecast available.")
        );
        assert!(backend_error_message("Internal Server Error").is_none());
    }

    #[test]
    fn option_values_accept_numbers() {
        let values = vec![
            serde_json::json!("All"),
            serde_json::json!(2001),
            serde_json::json!(null),
        ];
        assert_eq!(option_strings(values), ["All", "2001"]);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(BODY_PREVIEW_LEN + 10);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), BODY_PREVIEW_LEN + 3);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn builds_urls_without_double_slash() {
        let config = DashboardConfig {
            api_url: "http://localhost:5000/api/".to_string(),
            ..DashboardConfig::default()
        };
        let api = HttpDashboardApi::new(&config, Arc::new(SessionStore::new())).unwrap();
        assert_eq!(api.url("years"), "http://localhost:5000/api/years");
    }
}
