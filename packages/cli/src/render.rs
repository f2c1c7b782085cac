//! Plain-text rendering of dashboard panels.

use crime_dashboard::MapPanelData;
use crime_dashboard::format::{format_change, format_number};
use crime_dashboard::layers::{Viewport, build_heat_layers};
use crime_dashboard::options::crime_type_label;
use crime_dashboard::panel::PanelData;
use crime_dashboard::{PanelState, PanelView};
use crime_dashboard_models::{FilterOptions, ForecastPoint, RegionSelection};

const NO_DATA: &str = "No data available.";

fn render_view<T: PanelData>(
    state: &PanelState<T>,
    ready: impl FnOnce(&T) -> Vec<String>,
) -> String {
    match state.view() {
        PanelView::Loading => "Loading...".to_string(),
        PanelView::Failed(message) => message.to_string(),
        PanelView::Empty => NO_DATA.to_string(),
        PanelView::Ready(data) => ready(data).join("\n"),
    }
}

/// Renders the option lists with display labels.
pub fn options(state: &PanelState<FilterOptions>) -> String {
    render_view(state, |options| {
        let (min, max) = options.year_range();
        let mut lines = vec![format!("Regions ({}):", options.regions.len())];
        lines.extend(options.regions.iter().map(|r| format!("  {r}")));
        lines.push(format!("Crime types ({}):", options.crime_types.len()));
        lines.extend(
            options
                .crime_types
                .iter()
                .map(|c| format!("  {:<45} {c}", crime_type_label(c))),
        );
        lines.push(format!("Years: {min}-{max}"));
        lines
    })
}

/// Renders heat layers, the trend chart, and the viewport for `region`.
pub fn map_panel(state: &PanelState<MapPanelData>, region: &RegionSelection) -> String {
    render_view(state, |data| {
        let mut lines = vec![format!(
            "Heat layers ({} records):",
            data.map_data.len()
        )];
        for layer in build_heat_layers(&data.grouped) {
            let total: f64 = data
                .grouped
                .get(&layer.category)
                .map_or(0.0, |records| records.iter().map(|r| r.count).sum());
            let colors: Vec<&str> = layer.gradient.iter().map(|(_, color)| *color).collect();
            lines.push(format!(
                "  {:<45} {:>6} points  total {:>8}  {}",
                crime_type_label(&layer.category),
                layer.points.len(),
                format_number(total),
                colors.join(" > ")
            ));
        }

        if data.chart_data.is_empty() {
            lines.push(format!("Crime trends: {NO_DATA}"));
        } else {
            lines.push("Crime trends:".to_string());
            lines.extend(
                data.chart_data
                    .iter()
                    .map(|p| format!("  {}  {:>8}", p.year, format_number(p.count))),
            );
        }

        lines.push(match Viewport::for_region(region) {
            Viewport::Fit(bounds) => {
                let (lat, lng) = bounds.center();
                format!(
                    "Viewport: {region} at {lat:.2}, {lng:.2} [{:.2}, {:.2}] to [{:.2}, {:.2}]",
                    bounds.south, bounds.west, bounds.north, bounds.east
                )
            }
            Viewport::Center { lat, lng, zoom } => {
                format!("Viewport: centered on {lat:.4}, {lng:.4} at zoom {zoom}")
            }
        });
        lines
    })
}

/// Renders the forecast table.
pub fn forecast_panel(state: &PanelState<Vec<ForecastPoint>>) -> String {
    render_view(state, |points| {
        let mut lines = vec![format!("{:<6} {:>12} {:>12}", "Year", "Predicted", "Change")];
        lines.extend(points.iter().map(|p| {
            format!(
                "{:<6} {:>12} {:>12}",
                p.year,
                format_number(p.predicted),
                format_change(p.change)
            )
        }));
        lines
    })
}
