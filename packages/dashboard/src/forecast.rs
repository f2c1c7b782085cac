//! Turns the backend's raw forecast series into chart-ready points.

use std::collections::BTreeMap;

use crime_dashboard_models::{ForecastPoint, RawForecastPoint, RegionSelection};

/// Derives per-year forecast values and year-over-year changes.
///
/// With [`RegionSelection::All`] the series is summed per year across
/// regions. With a named region only that region's points are kept; points
/// without a region are kept too, since the request was already scoped to
/// the region. The change column is computed after aggregation.
#[must_use]
pub fn derive_forecast(raw: &[RawForecastPoint], region: &RegionSelection) -> Vec<ForecastPoint> {
    let series: Vec<(i32, f64)> = match region {
        RegionSelection::All => {
            let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
            for point in raw {
                *totals.entry(point.year).or_insert(0.0) += point.predicted;
            }
            totals.into_iter().collect()
        }
        RegionSelection::Named(name) => {
            let mut selected: Vec<(i32, f64)> = raw
                .iter()
                .filter(|p| p.region.as_deref().is_none_or(|r| r == name))
                .map(|p| (p.year, p.predicted))
                .collect();
            selected.sort_by_key(|(year, _)| *year);
            selected
        }
    };

    with_changes(&series)
}

/// Attaches period-over-period changes to an ordered series. The first
/// point has no baseline and gets a change of `0`.
#[must_use]
pub fn with_changes(series: &[(i32, f64)]) -> Vec<ForecastPoint> {
    let mut previous: Option<f64> = None;
    series
        .iter()
        .map(|&(year, predicted)| {
            let change = previous.map_or(0.0, |p| predicted - p);
            previous = Some(predicted);
            ForecastPoint {
                year,
                predicted,
                change,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(year: i32, region: &str, predicted: f64) -> RawForecastPoint {
        RawForecastPoint {
            year,
            region: Some(region.to_string()),
            predicted,
        }
    }

    fn sample() -> Vec<RawForecastPoint> {
        vec![
            raw(2020, "RegionA", 10.0),
            raw(2020, "RegionB", 5.0),
            raw(2021, "RegionA", 8.0),
            raw(2021, "RegionB", 6.0),
        ]
    }

    fn point(year: i32, predicted: f64, change: f64) -> ForecastPoint {
        ForecastPoint {
            year,
            predicted,
            change,
        }
    }

    #[test]
    fn aggregates_all_regions_per_year() {
        assert_eq!(
            derive_forecast(&sample(), &RegionSelection::All),
            vec![point(2020, 15.0, 0.0), point(2021, 14.0, -1.0)]
        );
    }

    #[test]
    fn selects_a_single_region() {
        assert_eq!(
            derive_forecast(&sample(), &RegionSelection::new("RegionA")),
            vec![point(2020, 10.0, 0.0), point(2021, 8.0, -2.0)]
        );
    }

    #[test]
    fn single_region_is_sorted_by_year() {
        let raw = vec![raw(2023, "Goa", 30.0), raw(2021, "Goa", 10.0), raw(2022, "Goa", 25.0)];
        assert_eq!(
            derive_forecast(&raw, &RegionSelection::new("Goa")),
            vec![
                point(2021, 10.0, 0.0),
                point(2022, 25.0, 15.0),
                point(2023, 30.0, 5.0)
            ]
        );
    }

    #[test]
    fn points_without_region_stay_in_scoped_series() {
        let raw = vec![RawForecastPoint {
            year: 2020,
            region: None,
            predicted: 4.0,
        }];
        assert_eq!(
            derive_forecast(&raw, &RegionSelection::new("Goa")),
            vec![point(2020, 4.0, 0.0)]
        );
    }

    #[test]
    fn unknown_region_yields_empty_series() {
        assert!(derive_forecast(&sample(), &RegionSelection::new("RegionC")).is_empty());
        assert!(derive_forecast(&[], &RegionSelection::All).is_empty());
    }
}
