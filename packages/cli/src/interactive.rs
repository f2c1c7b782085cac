//! Interactive dashboard session.
//!
//! Keeps one [`Dashboard`] alive, lets the user change the filter through
//! `dialoguer` menus, and re-renders the panels each change re-fetched.

use std::sync::Arc;

use crime_dashboard::options::crime_type_label;
use crime_dashboard::{Dashboard, DashboardConfig, HttpDashboardApi, Refresh, SessionStore};
use crime_dashboard_cli_utils::{FetchSpinner, MultiProgress};
use crime_dashboard_models::{DatasetMode, RegionSelection, YearSelection, filter::ALL};
use dialoguer::{MultiSelect, Select};

use crate::render;

/// Menu entries of the main loop.
enum Action {
    Region,
    CrimeTypes,
    Year,
    Dataset,
    ShowPanels,
    ReloadOptions,
    Exit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Region,
        Self::CrimeTypes,
        Self::Year,
        Self::Dataset,
        Self::ShowPanels,
        Self::ReloadOptions,
        Self::Exit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Region => "Change region",
            Self::CrimeTypes => "Choose crime types",
            Self::Year => "Change year",
            Self::Dataset => "Change dataset",
            Self::ShowPanels => "Show panels",
            Self::ReloadOptions => "Reload filter options",
            Self::Exit => "Exit",
        }
    }
}

/// Runs the interactive session until the user exits.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a prompt fails.
#[allow(clippy::future_not_send)]
pub async fn run(
    config: &DashboardConfig,
    session: Arc<SessionStore>,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = Dashboard::connect(config, session)?;

    println!("Crime Dashboard");
    println!();

    settle(dashboard.start(), multi, "Loading dashboard").await;
    print_panels(&dashboard);

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt(format!("Filter: {}", describe_filter(&dashboard)))
            .items(&labels)
            .default(0)
            .interact()?;

        let refresh = match Action::ALL[idx] {
            Action::Region => choose_region(&mut dashboard)?,
            Action::CrimeTypes => choose_crime_types(&mut dashboard)?,
            Action::Year => choose_year(&mut dashboard)?,
            Action::Dataset => choose_dataset(&mut dashboard)?,
            Action::ShowPanels => {
                print_panels(&dashboard);
                continue;
            }
            Action::ReloadOptions => Refresh {
                options: Some(dashboard.reload_options()),
                ..Refresh::default()
            },
            Action::Exit => {
                dashboard.shutdown();
                println!("Goodbye.");
                return Ok(());
            }
        };

        if refresh.is_empty() {
            println!("Filter unchanged.");
            continue;
        }

        let forecast_reissued = refresh.forecast.is_some();
        let options_reissued = refresh.options.is_some();
        settle(refresh, multi, "Refreshing").await;

        let coordinator = dashboard.coordinator();
        if options_reissued {
            println!("{}", render::options(&coordinator.options_panel().snapshot()));
        } else {
            println!(
                "{}",
                render::map_panel(
                    &coordinator.map_panel().snapshot(),
                    dashboard.filter().region()
                )
            );
        }
        if forecast_reissued {
            println!();
            println!(
                "{}",
                render::forecast_panel(&coordinator.forecast_panel().snapshot())
            );
        }
    }
}

async fn settle(refresh: Refresh, multi: &MultiProgress, message: &str) {
    let spinner = FetchSpinner::start(multi, message);
    refresh.wait().await;
    spinner.clear();
}

fn print_panels(dashboard: &Dashboard<HttpDashboardApi>) {
    let coordinator = dashboard.coordinator();
    let options = coordinator.options_panel().snapshot();
    if let Some(message) = &options.error {
        println!("{message}");
    }

    println!(
        "{}",
        render::map_panel(
            &coordinator.map_panel().snapshot(),
            dashboard.filter().region()
        )
    );
    println!();
    println!("ARIMA forecast:");
    println!(
        "{}",
        render::forecast_panel(&coordinator.forecast_panel().snapshot())
    );
}

fn describe_filter(dashboard: &Dashboard<HttpDashboardApi>) -> String {
    let filter = dashboard.filter();
    let categories: Vec<&str> = filter
        .categories()
        .iter()
        .map(|c| crime_type_label(c))
        .collect();
    format!(
        "{} / {} / {} / {}",
        filter.region(),
        categories.join(", "),
        filter.year(),
        filter.dataset_mode()
    )
}

fn choose_region(
    dashboard: &mut Dashboard<HttpDashboardApi>,
) -> Result<Refresh, Box<dyn std::error::Error>> {
    let regions = dashboard.coordinator().options_panel().snapshot().data.regions;
    let mut items = vec![ALL.to_string()];
    items.extend(regions);

    let current = dashboard.filter().region().to_string();
    let idx = Select::new()
        .with_prompt("Region")
        .items(&items)
        .default(items.iter().position(|r| *r == current).unwrap_or(0))
        .interact()?;

    Ok(dashboard.set_region(RegionSelection::new(&items[idx])))
}

fn choose_crime_types(
    dashboard: &mut Dashboard<HttpDashboardApi>,
) -> Result<Refresh, Box<dyn std::error::Error>> {
    let crime_types = dashboard
        .coordinator()
        .options_panel()
        .snapshot()
        .data
        .crime_types;
    if crime_types.is_empty() {
        println!("No crime types loaded. Reload filter options first.");
        return Ok(Refresh::default());
    }

    let labels: Vec<&str> = crime_types.iter().map(|c| crime_type_label(c)).collect();
    let filter = dashboard.filter();
    let defaults: Vec<bool> = crime_types
        .iter()
        .map(|c| !filter.all_categories() && filter.categories().contains(c))
        .collect();

    let selected = MultiSelect::new()
        .with_prompt("Crime types (space=toggle, enter=confirm, none=all)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    if selected.is_empty() {
        return Ok(dashboard.select_all_categories());
    }
    let names = selected.iter().map(|&i| crime_types[i].as_str());
    Ok(dashboard.set_categories(names)?)
}

fn choose_year(
    dashboard: &mut Dashboard<HttpDashboardApi>,
) -> Result<Refresh, Box<dyn std::error::Error>> {
    let years = dashboard.coordinator().options_panel().snapshot().data.years;
    let mut items = vec![YearSelection::All];
    items.extend(years.into_iter().map(YearSelection::Year));
    let labels: Vec<String> = items.iter().map(ToString::to_string).collect();

    let current = dashboard.filter().year();
    let idx = Select::new()
        .with_prompt("Year")
        .items(&labels)
        .default(items.iter().position(|y| *y == current).unwrap_or(0))
        .interact()?;

    Ok(dashboard.set_year(items[idx]))
}

fn choose_dataset(
    dashboard: &mut Dashboard<HttpDashboardApi>,
) -> Result<Refresh, Box<dyn std::error::Error>> {
    let modes = DatasetMode::all();
    let labels: Vec<String> = modes.iter().map(ToString::to_string).collect();

    let current = dashboard.filter().dataset_mode();
    let idx = Select::new()
        .with_prompt("Dataset")
        .items(&labels)
        .default(modes.iter().position(|m| *m == current).unwrap_or(0))
        .interact()?;

    Ok(dashboard.set_dataset_mode(modes[idx]))
}
