//! One-shot subcommands.

use std::sync::Arc;

use crime_dashboard::{DashboardConfig, FetchCoordinator, HttpDashboardApi, SessionStore};
use crime_dashboard_cli_utils::{FetchSpinner, MultiProgress};
use crime_dashboard_models::{DatasetMode, FilterError, FilterState, RegionSelection, YearSelection};

use crate::render;

fn coordinator(
    config: &DashboardConfig,
    session: Arc<SessionStore>,
) -> Result<FetchCoordinator<HttpDashboardApi>, Box<dyn std::error::Error>> {
    let api = HttpDashboardApi::new(config, session)?;
    Ok(FetchCoordinator::new(Arc::new(api), config.forecast_steps))
}

/// Builds a filter from command-line values. An empty category list selects
/// every category.
pub fn build_filter(
    mode: DatasetMode,
    region: &str,
    categories: &[String],
    year: YearSelection,
) -> Result<FilterState, FilterError> {
    let mut filter = FilterState::new();
    filter.set_dataset_mode(mode);
    filter.set_region(RegionSelection::new(region));
    filter.set_year(year);
    if !categories.is_empty() {
        filter.set_categories(categories)?;
    }
    Ok(filter)
}

/// Prints the filter option lists.
///
/// # Errors
///
/// Returns the panel's failure message if the options could not be loaded.
pub async fn options(
    config: &DashboardConfig,
    session: Arc<SessionStore>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = coordinator(config, session)?;

    let spinner = FetchSpinner::start(multi, "Loading filter options");
    coordinator.request_filter_options().wait().await;
    spinner.clear();

    let state = coordinator.options_panel().snapshot();
    if let Some(message) = state.error {
        return Err(message.into());
    }
    println!("{}", render::options(&state));
    Ok(())
}

/// Prints heat layers and the trend chart for `filter`.
///
/// # Errors
///
/// Returns the panel's failure message if the data could not be loaded.
pub async fn fetch(
    config: &DashboardConfig,
    session: Arc<SessionStore>,
    multi: &MultiProgress,
    filter: &FilterState,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = coordinator(config, session)?;

    let spinner = FetchSpinner::start(
        multi,
        &format!("Loading {} crime data", filter.dataset_mode()),
    );
    coordinator.request_map_data(filter).wait().await;
    spinner.clear();

    let state = coordinator.map_panel().snapshot();
    if let Some(message) = state.error {
        return Err(message.into());
    }
    println!("{}", render::map_panel(&state, filter.region()));
    Ok(())
}

/// Prints the forecast for `region`.
///
/// # Errors
///
/// Returns the panel's failure message if the forecast could not be
/// loaded.
pub async fn forecast(
    config: &DashboardConfig,
    session: Arc<SessionStore>,
    multi: &MultiProgress,
    region: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinator = coordinator(config, session)?;
    let region = RegionSelection::new(region);

    let spinner = FetchSpinner::start(multi, &format!("Forecasting {region}"));
    coordinator.request_forecast(&region).wait().await;
    spinner.clear();

    let state = coordinator.forecast_panel().snapshot();
    if let Some(message) = state.error {
        return Err(message.into());
    }
    println!("{}", render::forecast_panel(&state));
    Ok(())
}
