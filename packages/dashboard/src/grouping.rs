//! Partitions map records into per-category heat-map layers.

use crime_dashboard_models::{CrimeRecord, FilterState, GroupedMapData};

/// Groups records by category in a single pass.
///
/// Layers appear in order of first occurrence and records keep their input
/// order within a layer, so identical input always yields identical layer
/// order (and therefore identical layer colors).
#[must_use]
pub fn group(records: &[CrimeRecord]) -> GroupedMapData {
    let mut grouped = GroupedMapData::new();
    for record in records {
        grouped.push(&record.category, record.clone());
    }
    grouped
}

/// Drops records whose category is not selected by `filter`.
///
/// Returns the input unchanged when `All` is selected. Applied before
/// [`group`] so deselected categories never produce empty layers.
#[must_use]
pub fn filter_by_categories(records: Vec<CrimeRecord>, filter: &FilterState) -> Vec<CrimeRecord> {
    if filter.category_filter().is_none() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| filter.includes_category(&r.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crime_dashboard_models::UNKNOWN_CATEGORY;

    use super::*;

    fn record(category: &str, count: f64) -> CrimeRecord {
        CrimeRecord {
            region: "Kerala".to_string(),
            city: None,
            category: category.to_string(),
            year: None,
            count,
            lat: 10.0,
            lng: 76.0,
        }
    }

    fn sample() -> Vec<CrimeRecord> {
        vec![
            record("theft", 1.0),
            record(UNKNOWN_CATEGORY, 2.0),
            record("arson", 3.0),
            record("theft", 4.0),
            record("arson", 5.0),
        ]
    }

    #[test]
    fn keys_are_the_distinct_categories() {
        let records = sample();
        let grouped = group(&records);

        let keys: BTreeSet<&str> = grouped.categories().collect();
        let expected: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(keys, expected);
        assert_eq!(grouped.total_records(), records.len());
    }

    #[test]
    fn layer_order_follows_first_occurrence() {
        let grouped = group(&sample());
        assert_eq!(
            grouped.categories().collect::<Vec<_>>(),
            ["theft", UNKNOWN_CATEGORY, "arson"]
        );
        let counts: Vec<f64> = grouped
            .get("arson")
            .unwrap()
            .iter()
            .map(|r| r.count)
            .collect();
        assert_eq!(counts, [3.0, 5.0]);
    }

    #[test]
    fn regrouping_flattened_output_is_identical() {
        let grouped = group(&sample());
        assert_eq!(group(&grouped.flatten()), grouped);
    }

    #[test]
    fn empty_input_has_no_layers() {
        assert!(group(&[]).is_empty());
    }

    #[test]
    fn explicit_filter_removes_unselected_layers() {
        let mut filter = FilterState::new();
        filter.set_categories(["arson"]).unwrap();

        let filtered = filter_by_categories(sample(), &filter);
        let grouped = group(&filtered);

        assert_eq!(grouped.categories().collect::<Vec<_>>(), ["arson"]);
        assert_eq!(grouped.total_records(), 2);
    }

    #[test]
    fn all_filter_keeps_everything() {
        let filtered = filter_by_categories(sample(), &FilterState::new());
        assert_eq!(filtered.len(), 5);
    }
}
