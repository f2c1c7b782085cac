//! Filter option lists for the region, category, and year controls.

use crime_dashboard_models::{FilterOptions, filter::ALL, parse_year};

use crate::DashboardError;
use crate::api::{DashboardApi, OptionList};

/// Raw dataset columns that the backend lists among crime types but that
/// are not crime categories.
const EXCLUDED_CRIME_TYPES: &[&str] = &[
    "population",
    "population.1",
    "year",
    "city",
    "state",
    "lat",
    "lng",
];

/// Display labels for the dataset's crime columns.
const CRIME_TYPE_LABELS: &[(&str, &str)] = &[
    ("murder", "Murder"),
    ("attempt_to_murder", "Attempt to Murder"),
    (
        "culpable_homicide_not_amounting_to_murder",
        "Culpable Homicide (Not Amounting to Murder)",
    ),
    ("rape", "Rape"),
    ("custodial_rape", "Custodial Rape"),
    ("other_rape", "Other Rape"),
    ("kidnapping_&_abduction", "Kidnapping & Abduction"),
    (
        "kidnapping_and_abduction_of_women_and_girls",
        "Kidnapping & Abduction of Women/Girls",
    ),
    (
        "kidnapping_and_abduction_of_others",
        "Kidnapping & Abduction of Others",
    ),
    ("dacoity", "Dacoity"),
    (
        "preparation_and_assembly_for_dacoity",
        "Preparation & Assembly for Dacoity",
    ),
    ("robbery", "Robbery"),
    ("burglary", "Burglary"),
    ("theft", "Theft"),
    ("auto_theft", "Auto Theft"),
    ("other_theft", "Other Theft"),
    ("riots", "Riots"),
    ("criminal_breach_of_trust", "Criminal Breach of Trust"),
    ("cheating", "Cheating"),
    ("counterfieting", "Counterfeiting"),
    ("arson", "Arson"),
    ("hurt/grevious_hurt", "Hurt / Grievous Hurt"),
    ("dowry_deaths", "Dowry Deaths"),
    (
        "assault_on_women_with_intent_to_outrage_her_modesty",
        "Assault on Women (Intent to Outrage Modesty)",
    ),
    ("insult_to_modesty_of_women", "Insult to Women's Modesty"),
    (
        "cruelty_by_husband_or_his_relatives",
        "Cruelty by Husband/Relatives",
    ),
    (
        "importation_of_girls_from_foreign_countries",
        "Importation of Girls from Foreign Countries",
    ),
    ("causing_death_by_negligence", "Causing Death by Negligence"),
    ("other_ipc_crimes", "Other IPC Crimes"),
    ("total_ipc_crimes", "Total IPC Crimes"),
];

/// Fetches the three option lists in parallel and normalizes them.
///
/// # Errors
///
/// Returns the first failure if any of the three requests fails.
pub async fn load_filter_options<A: DashboardApi + ?Sized>(
    api: &A,
) -> Result<FilterOptions, DashboardError> {
    let (regions, crime_types, years) = futures::try_join!(
        api.option_values(OptionList::States),
        api.option_values(OptionList::CrimeTypes),
        api.option_values(OptionList::Years),
    )?;

    let options = normalize_options(regions, crime_types, years);
    log::debug!(
        "Loaded {} regions, {} crime types, {} years",
        options.regions.len(),
        options.crime_types.len(),
        options.years.len()
    );
    Ok(options)
}

/// Cleans raw option lists: drops the `All` sentinel and blanks, removes
/// non-crime columns from the crime types, and parses years.
#[must_use]
pub fn normalize_options(
    regions: Vec<String>,
    crime_types: Vec<String>,
    years: Vec<String>,
) -> FilterOptions {
    let regions = regions.into_iter().filter(|r| is_selectable(r)).collect();

    let crime_types = crime_types
        .into_iter()
        .filter(|c| is_selectable(c) && !EXCLUDED_CRIME_TYPES.contains(&c.as_str()))
        .collect();

    let mut years: Vec<i32> = years.iter().filter_map(|y| parse_year(y)).collect();
    years.sort_unstable();
    years.dedup();

    FilterOptions {
        regions,
        crime_types,
        years,
    }
}

fn is_selectable(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != ALL
}


/// Human-readable label of a crime column, or the column name itself when
/// it has no known label.
#[must_use]
pub fn crime_type_label(crime_type: &str) -> &str {
    CRIME_TYPE_LABELS
        .iter()
        .find(|(key, _)| *key == crime_type)
        .map_or(crime_type, |(_, label)| label)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use crime_dashboard_models::{DatasetPayload, DatasetSource, RawForecastPoint};

    use super::*;
    use crate::api::{DatasetQuery, ForecastQuery};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn drops_sentinel_and_dataset_columns() {
        let options = normalize_options(
            strings(&["All", "Goa", "Kerala", " "]),
            strings(&["All", "murder", "population", "population.1", "lat", "theft"]),
            strings(&["All", "2003", "2001", "2001.0", "n/a"]),
        );

        assert_eq!(options.regions, ["Goa", "Kerala"]);
        assert_eq!(options.crime_types, ["murder", "theft"]);
        assert_eq!(options.years, [2001, 2003]);
        assert_eq!(options.year_range(), (2001, 2003));
    }

    #[test]
    fn empty_years_use_default_range() {
        let options = normalize_options(vec![], vec![], strings(&["All"]));
        assert!(options.is_empty());
        assert_eq!(options.year_range(), (2000, 2025));
    }

    #[test]
    fn labels_known_columns() {
        assert_eq!(
            crime_type_label("kidnapping_&_abduction"),
            "Kidnapping & Abduction"
        );
        assert_eq!(crime_type_label("hurt/grevious_hurt"), "Hurt / Grievous Hurt");
        assert_eq!(crime_type_label("cyber_crime"), "cyber_crime");
    }

    struct StaticApi {
        fail_years: bool,
    }

    #[async_trait]
    impl DashboardApi for StaticApi {
        async fn option_values(&self, list: OptionList) -> Result<Vec<String>, DashboardError> {
            match list {
                OptionList::States => Ok(strings(&["All", "Goa"])),
                OptionList::CrimeTypes => Ok(strings(&["All", "arson", "state"])),
                OptionList::Years if self.fail_years => Err(DashboardError::Status {
                    status: 500,
                    url: "http://localhost/api/years".to_string(),
                    message: None,
                }),
                OptionList::Years => Ok(strings(&["All", "2001", "2002"])),
            }
        }

        async fn dataset(
            &self,
            _source: DatasetSource,
            _query: &DatasetQuery,
        ) -> Result<DatasetPayload, DashboardError> {
            Ok(DatasetPayload::default())
        }

        async fn forecast(
            &self,
            _query: &ForecastQuery,
        ) -> Result<Vec<RawForecastPoint>, DashboardError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn loads_all_three_lists() {
        let options = load_filter_options(&StaticApi { fail_years: false })
            .await
            .unwrap();
        assert_eq!(options.regions, ["Goa"]);
        assert_eq!(options.crime_types, ["arson"]);
        assert_eq!(options.years, [2001, 2002]);
    }

    #[tokio::test]
    async fn any_failed_list_fails_the_load() {
        let err = load_filter_options(&StaticApi { fail_years: true })
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Status { status: 500, .. }));
    }
}
