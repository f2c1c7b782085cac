//! Issues, cancels, and settles dashboard fetches.
//!
//! There are three independent fetch groups, each with its own [`Panel`]:
//!
//! - **map**: map records, heat-map layers, and the trend chart, fetched
//!   from one or both dataset endpoints depending on the dataset mode;
//! - **forecast**: the ARIMA forecast, keyed only by region;
//! - **options**: the filter option lists.
//!
//! Issuing a request cancels the group's previous one. The cancelled
//! request's future is dropped, which closes its HTTP connection, and any
//! result that still arrives for an older generation is discarded.

use std::future::Future;
use std::sync::Arc;

use crime_dashboard_models::{
    ChartPoint, CrimeRecord, DatasetMode, DatasetPayload, DatasetSource, FilterOptions,
    FilterState, ForecastPoint, GroupedMapData, RegionSelection, RequestGeneration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::DashboardError;
use crate::api::{DashboardApi, DatasetQuery, ForecastQuery};
use crate::forecast::derive_forecast;
use crate::grouping::{filter_by_categories, group};
use crate::merge::merge;
use crate::options::load_filter_options;
use crate::panel::{Panel, PanelData};

/// Shown when the map group fails.
pub const MAP_FAILURE_MESSAGE: &str = "Failed to load crime data.";
/// Shown when the forecast group fails.
pub const FORECAST_FAILURE_MESSAGE: &str = "Failed to fetch ARIMA forecast.";
/// Shown when the options group fails.
pub const OPTIONS_FAILURE_MESSAGE: &str = "Failed to load filter options.";

/// Data of the map group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPanelData {
    /// Records left after category filtering, historical first in combined
    /// mode.
    pub map_data: Vec<CrimeRecord>,
    /// `map_data` grouped by category.
    pub grouped: GroupedMapData,
    /// Yearly totals for the trend chart.
    pub chart_data: Vec<ChartPoint>,
}

impl PanelData for MapPanelData {
    fn is_empty(&self) -> bool {
        self.map_data.is_empty() && self.chart_data.is_empty()
    }
}

/// Handle to one issued request.
#[derive(Debug)]
pub struct FetchHandle {
    generation: RequestGeneration,
    token: CancellationToken,
    task: JoinHandle<bool>,
}

impl FetchHandle {
    /// Generation the request was issued with.
    #[must_use]
    pub const fn generation(&self) -> RequestGeneration {
        self.generation
    }

    /// Aborts the request. Its result will not be applied; if it is still
    /// the current one, the panel stops loading and drops its data.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the request was cancelled, explicitly or by a newer request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the request to settle. Returns whether its outcome changed
    /// the panel state.
    pub async fn wait(self) -> bool {
        match self.task.await {
            Ok(applied) => applied,
            Err(e) => {
                log::error!("Fetch task {} failed: {e}", self.generation);
                false
            }
        }
    }
}

/// Owner of the three fetch groups.
pub struct FetchCoordinator<A: ?Sized> {
    api: Arc<A>,
    forecast_steps: u32,
    map: Arc<Panel<MapPanelData>>,
    forecast: Arc<Panel<Vec<ForecastPoint>>>,
    options: Arc<Panel<FilterOptions>>,
}

impl<A: DashboardApi + ?Sized + 'static> FetchCoordinator<A> {
    /// Creates a coordinator with idle panels.
    #[must_use]
    pub fn new(api: Arc<A>, forecast_steps: u32) -> Self {
        Self {
            api,
            forecast_steps,
            map: Arc::new(Panel::new("map", MAP_FAILURE_MESSAGE)),
            forecast: Arc::new(Panel::new("forecast", FORECAST_FAILURE_MESSAGE)),
            options: Arc::new(Panel::new("options", OPTIONS_FAILURE_MESSAGE)),
        }
    }

    /// Re-issues the map group for `filter`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_map_data(&self, filter: &FilterState) -> FetchHandle {
        let api = Arc::clone(&self.api);
        let filter = filter.clone();
        spawn_fetch(&self.map, async move { fetch_map_panel(api.as_ref(), &filter).await })
    }

    /// Re-issues the forecast group for `region`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_forecast(&self, region: &RegionSelection) -> FetchHandle {
        let api = Arc::clone(&self.api);
        let region = region.clone();
        let steps = self.forecast_steps;
        spawn_fetch(&self.forecast, async move {
            fetch_forecast(api.as_ref(), &region, steps).await
        })
    }

    /// Re-issues the options group.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_filter_options(&self) -> FetchHandle {
        let api = Arc::clone(&self.api);
        spawn_fetch(&self.options, async move {
            load_filter_options(api.as_ref()).await
        })
    }
}

impl<A: ?Sized> FetchCoordinator<A> {
    /// Map group state.
    #[must_use]
    pub fn map_panel(&self) -> &Panel<MapPanelData> {
        &self.map
    }

    /// Forecast group state.
    #[must_use]
    pub fn forecast_panel(&self) -> &Panel<Vec<ForecastPoint>> {
        &self.forecast
    }

    /// Options group state.
    #[must_use]
    pub fn options_panel(&self) -> &Panel<FilterOptions> {
        &self.options
    }

    /// Cancels every in-flight request.
    pub fn shutdown(&self) {
        log::debug!("Shutting down fetch coordinator");
        self.map.shutdown();
        self.forecast.shutdown();
        self.options.shutdown();
    }
}

impl<A: ?Sized> Drop for FetchCoordinator<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_fetch<T, F>(panel: &Arc<Panel<T>>, fetch: F) -> FetchHandle
where
    T: PanelData,
    F: Future<Output = Result<T, DashboardError>> + Send + 'static,
{
    let ticket = panel.begin();
    let generation = ticket.generation;
    let token = ticket.token.clone();
    let panel = Arc::clone(panel);

    let task = tokio::spawn(async move {
        let result = tokio::select! {
            biased;
            () = ticket.token.cancelled() => Err(DashboardError::Cancelled),
            result = fetch => result,
        };
        panel.apply(&ticket, result)
    });

    FetchHandle {
        generation,
        token,
        task,
    }
}

/// Fetches and derives the map group for `filter`.
///
/// In combined mode both datasets are requested in parallel and the group
/// fails as a whole if either request fails; the surviving request is
/// dropped.
///
/// # Errors
///
/// Returns the failing request's error, wrapped in
/// [`DashboardError::PartialSource`] in combined mode.
pub async fn fetch_map_panel<A: DashboardApi + ?Sized>(
    api: &A,
    filter: &FilterState,
) -> Result<MapPanelData, DashboardError> {
    let query = DatasetQuery::from_filter(filter);

    let payload = match filter.dataset_mode() {
        DatasetMode::Historical => api.dataset(DatasetSource::Historical, &query).await?,
        DatasetMode::Predicted => api.dataset(DatasetSource::Predicted, &query).await?,
        DatasetMode::Combined => {
            let (historical, predicted) = futures::try_join!(
                fetch_combined_half(api, DatasetSource::Historical, &query),
                fetch_combined_half(api, DatasetSource::Predicted, &query),
            )?;
            merge(historical, predicted)
        }
    };

    let map_data = filter_by_categories(payload.map_data, filter);
    let grouped = group(&map_data);
    log::debug!(
        "Map data: {} records in {} layers, {} chart points",
        map_data.len(),
        grouped.len(),
        payload.chart_data.len()
    );

    Ok(MapPanelData {
        map_data,
        grouped,
        chart_data: payload.chart_data,
    })
}

async fn fetch_combined_half<A: DashboardApi + ?Sized>(
    api: &A,
    source: DatasetSource,
    query: &DatasetQuery,
) -> Result<DatasetPayload, DashboardError> {
    api.dataset(source, query)
        .await
        .map_err(|e| e.in_combined(source))
}

/// Fetches the forecast for `region` and derives chart points from it.
///
/// # Errors
///
/// Returns [`DashboardError`] if the request fails.
pub async fn fetch_forecast<A: DashboardApi + ?Sized>(
    api: &A,
    region: &RegionSelection,
    steps: u32,
) -> Result<Vec<ForecastPoint>, DashboardError> {
    let raw = api.forecast(&ForecastQuery::new(region, steps)).await?;
    Ok(derive_forecast(&raw, region))
}
