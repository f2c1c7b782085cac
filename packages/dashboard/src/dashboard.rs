//! Filter state wired to the fetch coordinator.

use std::sync::Arc;

use crime_dashboard_models::{
    DatasetMode, FilterChange, FilterError, FilterState, RegionSelection, YearSelection,
};

use crate::DashboardError;
use crate::api::{DashboardApi, HttpDashboardApi};
use crate::config::DashboardConfig;
use crate::coordinator::{FetchCoordinator, FetchHandle};
use crate::session::SessionStore;

/// Requests issued by one dashboard operation.
#[derive(Debug, Default)]
pub struct Refresh {
    pub options: Option<FetchHandle>,
    pub map: Option<FetchHandle>,
    pub forecast: Option<FetchHandle>,
}

impl Refresh {
    /// Whether nothing was issued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.options.is_none() && self.map.is_none() && self.forecast.is_none()
    }

    /// Waits for every issued request to settle.
    pub async fn wait(self) {
        for handle in [self.options, self.map, self.forecast]
            .into_iter()
            .flatten()
        {
            handle.wait().await;
        }
    }
}

/// A dashboard: the current filter and the panels it drives.
///
/// Every accepted filter mutation re-issues the map group. Region changes
/// also re-issue the forecast group. Mutations that change nothing or are
/// rejected issue no requests.
pub struct Dashboard<A: ?Sized> {
    filter: FilterState,
    coordinator: FetchCoordinator<A>,
}

impl Dashboard<HttpDashboardApi> {
    /// Creates a dashboard backed by the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Http`] if the HTTP client cannot be built.
    pub fn connect(
        config: &DashboardConfig,
        session: Arc<SessionStore>,
    ) -> Result<Self, DashboardError> {
        let api = HttpDashboardApi::new(config, session)?;
        Ok(Self::new(Arc::new(api), config.forecast_steps))
    }
}

impl<A: DashboardApi + ?Sized + 'static> Dashboard<A> {
    /// Creates a dashboard with the initial filter. Nothing is fetched until
    /// [`Self::start`].
    #[must_use]
    pub fn new(api: Arc<A>, forecast_steps: u32) -> Self {
        Self {
            filter: FilterState::new(),
            coordinator: FetchCoordinator::new(api, forecast_steps),
        }
    }

    /// Loads filter options and issues the initial map and forecast
    /// requests.
    pub fn start(&self) -> Refresh {
        log::info!("Starting dashboard");
        Refresh {
            options: Some(self.coordinator.request_filter_options()),
            map: Some(self.coordinator.request_map_data(&self.filter)),
            forecast: Some(self.coordinator.request_forecast(self.filter.region())),
        }
    }

    /// Selects a region.
    pub fn set_region(&mut self, region: RegionSelection) -> Refresh {
        let change = self.filter.set_region(region);
        self.reissue(change)
    }

    /// Selects a year.
    pub fn set_year(&mut self, year: YearSelection) -> Refresh {
        let change = self.filter.set_year(year);
        self.reissue(change)
    }

    /// Selects the dataset mode.
    pub fn set_dataset_mode(&mut self, mode: DatasetMode) -> Refresh {
        let change = self.filter.set_dataset_mode(mode);
        self.reissue(change)
    }

    /// Adds a category to the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if the category is blank.
    pub fn add_category(&mut self, category: &str) -> Result<Refresh, FilterError> {
        let change = self.filter.add_category(category)?;
        Ok(self.reissue(change))
    }

    /// Removes a category from the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyCategories`] if it is the last selected
    /// category.
    pub fn remove_category(&mut self, category: &str) -> Result<Refresh, FilterError> {
        let change = self.filter.remove_category(category)?;
        Ok(self.reissue(change))
    }

    /// Replaces the category selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] if `categories` is empty or contains a blank
    /// name.
    pub fn set_categories<I, S>(&mut self, categories: I) -> Result<Refresh, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let change = self.filter.set_categories(categories)?;
        Ok(self.reissue(change))
    }

    /// Selects every category.
    pub fn select_all_categories(&mut self) -> Refresh {
        let change = self.filter.select_all_categories();
        self.reissue(change)
    }

    /// Re-issues the options group.
    pub fn reload_options(&self) -> FetchHandle {
        self.coordinator.request_filter_options()
    }

    fn reissue(&self, change: Option<FilterChange>) -> Refresh {
        let Some(change) = change else {
            return Refresh::default();
        };
        log::debug!("Filter changed ({change:?}), re-fetching");

        Refresh {
            options: None,
            map: Some(self.coordinator.request_map_data(&self.filter)),
            forecast: change
                .affects_forecast()
                .then(|| self.coordinator.request_forecast(self.filter.region())),
        }
    }
}

impl<A: ?Sized> Dashboard<A> {
    /// Current filter selection.
    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Panels and requests behind this dashboard.
    #[must_use]
    pub const fn coordinator(&self) -> &FetchCoordinator<A> {
        &self.coordinator
    }

    /// Cancels every in-flight request.
    pub fn shutdown(&self) {
        self.coordinator.shutdown();
    }
}
