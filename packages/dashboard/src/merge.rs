//! Combines historical and predicted payloads for the combined dataset mode.
//!
//! | Part | Strategy |
//! |------|----------|
//! | `mapData` | Concatenation, historical first, no deduplication |
//! | `chartData` | Outer join on year, missing side counts as `0`, ascending |

use std::collections::BTreeMap;

use crime_dashboard_models::{ChartPoint, DatasetPayload};

/// Merges a historical and a predicted payload into one.
///
/// Overlapping map records (same region, year, and category in both
/// sources) are kept side by side; the heat map shows both.
#[must_use]
pub fn merge(historical: DatasetPayload, predicted: DatasetPayload) -> DatasetPayload {
    let chart_data = merge_chart_data(&historical.chart_data, &predicted.chart_data);

    let mut map_data = historical.map_data;
    map_data.extend(predicted.map_data);

    DatasetPayload {
        map_data,
        chart_data,
    }
}

/// Sums two yearly series over the union of their years.
///
/// A year that appears more than once within one series keeps its last
/// value, matching how the series is keyed by year.
#[must_use]
pub fn merge_chart_data(historical: &[ChartPoint], predicted: &[ChartPoint]) -> Vec<ChartPoint> {
    let historical = by_year(historical);
    let predicted = by_year(predicted);

    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for (year, count) in historical.into_iter().chain(predicted) {
        *totals.entry(year).or_insert(0.0) += count;
    }

    totals
        .into_iter()
        .map(|(year, count)| ChartPoint { year, count })
        .collect()
}

fn by_year(series: &[ChartPoint]) -> BTreeMap<i32, f64> {
    series.iter().map(|p| (p.year, p.count)).collect()
}
