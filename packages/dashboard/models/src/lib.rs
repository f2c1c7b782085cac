#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record, filter, and panel data types for the crime dashboard.
//!
//! Wire types ([`CrimeRecord`], [`ChartPoint`], [`RawForecastPoint`],
//! [`DatasetPayload`]) mirror the backend's JSON column names exactly so
//! responses decode without an intermediate representation. Derived types
//! ([`ForecastPoint`], [`GroupedMapData`]) are produced by the aggregation
//! pipeline and never sent back to the backend.

pub mod filter;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use filter::{
    ALL, FilterChange, FilterError, FilterState, InvalidYearError, RegionSelection, YearSelection,
};

/// Category assigned to records that arrive without one.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Which dataset(s) feed the dashboard.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetMode {
    /// Recorded crime statistics only.
    #[default]
    Historical,
    /// Model-predicted statistics only.
    Predicted,
    /// Historical and predicted merged into one view.
    Combined,
}

impl DatasetMode {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Historical, Self::Predicted, Self::Combined]
    }
}

/// A single backend dataset endpoint.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetSource {
    /// `GET /historical`
    Historical,
    /// `GET /predicted`
    Predicted,
}

impl DatasetSource {
    /// Returns the endpoint path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Historical => "historical",
            Self::Predicted => "predicted",
        }
    }
}

/// A single geolocated crime aggregate as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeRecord {
    /// Region (state) the record belongs to. Empty when the backend
    /// aggregated it away.
    #[serde(rename = "State", alias = "region", default)]
    pub region: String,
    /// City name, when the backend groups by city.
    #[serde(
        rename = "City",
        alias = "city",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    /// Crime category. Missing, null, or empty values become
    /// [`UNKNOWN_CATEGORY`].
    #[serde(
        rename = "Crime Type",
        alias = "category",
        default = "unknown_category",
        deserialize_with = "category_or_unknown"
    )]
    pub category: String,
    /// Year of the aggregate. Map data is usually summed across years.
    #[serde(
        rename = "Year",
        alias = "year",
        default,
        deserialize_with = "optional_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    /// Number of incidents.
    #[serde(rename = "Crime Count", alias = "count")]
    pub count: f64,
    /// Latitude (WGS84).
    #[serde(rename = "Latitude", alias = "lat")]
    pub lat: f64,
    /// Longitude (WGS84).
    #[serde(rename = "Longitude", alias = "lng")]
    pub lng: f64,
}

fn unknown_category() -> String {
    UNKNOWN_CATEGORY.to_string()
}

fn category_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|c| !c.is_empty())
        .unwrap_or_else(unknown_category))
}

/// Parses `"2001"` as well as `"2001.0"`, which pandas emits for float
/// year columns.
#[must_use]
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    value
        .parse::<i32>()
        .ok()
        .or_else(|| whole_year(value.parse::<f64>().ok()?))
}

#[allow(clippy::cast_possible_truncation)]
fn whole_year(year: f64) -> Option<i32> {
    (year.fract() == 0.0 && year.abs() < f64::from(i32::MAX)).then_some(year as i32)
}

/// A year column as the backend may encode it.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireYear {
    Int(i64),
    Float(f64),
    Text(String),
}

impl WireYear {
    fn to_year(&self) -> Option<i32> {
        match self {
            Self::Int(year) => i32::try_from(*year).ok(),
            Self::Float(year) => whole_year(*year),
            Self::Text(year) => parse_year(year),
        }
    }
}

fn year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = WireYear::deserialize(deserializer)?;
    value
        .to_year()
        .ok_or_else(|| serde::de::Error::custom("expected a whole-number year"))
}

fn optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<WireYear>::deserialize(deserializer)?
        .map(|value| {
            value
                .to_year()
                .ok_or_else(|| serde::de::Error::custom("expected a whole-number year"))
        })
        .transpose()
}

/// One point of a yearly chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Calendar year.
    #[serde(rename = "Year", alias = "year", deserialize_with = "year")]
    pub year: i32,
    /// Total incidents in that year.
    #[serde(rename = "Crime Count", alias = "count")]
    pub count: f64,
}

/// Response body of `GET /historical` and `GET /predicted`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetPayload {
    /// Per-location aggregates for the heat map.
    #[serde(default)]
    pub map_data: Vec<CrimeRecord>,
    /// Per-year totals for the trend charts.
    #[serde(default)]
    pub chart_data: Vec<ChartPoint>,
}

impl DatasetPayload {
    /// Whether neither map nor chart data is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map_data.is_empty() && self.chart_data.is_empty()
    }
}

/// One element of the backend's `/arima-forecast` series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPoint {
    /// Forecast year.
    #[serde(rename = "Year", alias = "year", deserialize_with = "year")]
    pub year: i32,
    /// Region the forecast was fitted for.
    #[serde(
        rename = "Region",
        alias = "State",
        alias = "region",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub region: Option<String>,
    /// Predicted incident count.
    #[serde(rename = "Predicted_Crimes", alias = "predicted")]
    pub predicted: f64,
}

/// A derived forecast value with its period-over-period delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Forecast year.
    #[serde(rename = "Year")]
    pub year: i32,
    /// Predicted incident count (summed across regions when aggregated).
    #[serde(rename = "Predicted Crimes")]
    pub predicted: f64,
    /// Difference from the previous point; `0` for the first point.
    #[serde(rename = "Change")]
    pub change: f64,
}

/// Map records partitioned by category, iterated in insertion order.
///
/// Layer colors are assigned by position, so the iteration order is part
/// of the observable output and must not depend on hashing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedMapData {
    layers: IndexMap<String, Vec<CrimeRecord>>,
}

// `IndexMap` equality ignores order; layer order matters here.
impl PartialEq for GroupedMapData {
    fn eq(&self, other: &Self) -> bool {
        self.layers.iter().eq(other.layers.iter())
    }
}

impl GroupedMapData {
    /// Creates an empty grouping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` to the layer named `category`, creating the layer
    /// at the end if it does not exist yet.
    pub fn push(&mut self, category: &str, record: CrimeRecord) {
        if let Some(records) = self.layers.get_mut(category) {
            records.push(record);
        } else {
            self.layers.insert(category.to_string(), vec![record]);
        }
    }

    /// Returns the records of one layer.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&[CrimeRecord]> {
        self.layers.get(category).map(Vec::as_slice)
    }

    /// Layer names in insertion order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Layers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CrimeRecord])> {
        self.layers
            .iter()
            .map(|(category, records)| (category.as_str(), records.as_slice()))
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Total number of records across all layers.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// Concatenates all layers back into a single sequence, layer by layer.
    #[must_use]
    pub fn flatten(&self) -> Vec<CrimeRecord> {
        self.layers.values().flatten().cloned().collect()
    }
}

/// Monotonic identifier of one fetch cycle within a fetch group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestGeneration(u64);

impl RequestGeneration {
    /// The generation before any request was issued.
    pub const INITIAL: Self = Self(0);

    /// Returns the generation that supersedes this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its south-west and north-east corners,
    /// each given as `(lat, lng)`.
    #[must_use]
    pub const fn from_corners(south_west: (f64, f64), north_east: (f64, f64)) -> Self {
        Self {
            west: south_west.1,
            south: south_west.0,
            east: north_east.1,
            north: north_east.0,
        }
    }

    /// Center point as `(lat, lng)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            f64::midpoint(self.south, self.north),
            f64::midpoint(self.west, self.east),
        )
    }
}

/// Values available for the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Selectable regions, without the `All` sentinel.
    pub regions: Vec<String>,
    /// Selectable crime categories, without the `All` sentinel.
    pub crime_types: Vec<String>,
    /// Selectable years, ascending.
    pub years: Vec<i32>,
}

impl FilterOptions {
    /// Year bounds used by the year slider when no years are known.
    pub const DEFAULT_YEAR_RANGE: (i32, i32) = (2000, 2025);

    /// Returns `(min, max)` of the known years, or
    /// [`Self::DEFAULT_YEAR_RANGE`] when none are known.
    #[must_use]
    pub fn year_range(&self) -> (i32, i32) {
        match (self.years.iter().min(), self.years.iter().max()) {
            (Some(min), Some(max)) => (*min, *max),
            _ => Self::DEFAULT_YEAR_RANGE,
        }
    }

    /// Whether no option lists were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.crime_types.is_empty() && self.years.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_map_record_without_category() {
        let record: CrimeRecord = serde_json::from_value(serde_json::json!({
            "City": "Pune",
            "Latitude": 18.52,
            "Longitude": 73.85,
            "Crime Count": 42
        }))
        .unwrap();

        assert_eq!(record.category, UNKNOWN_CATEGORY);
        assert_eq!(record.city.as_deref(), Some("Pune"));
        assert!(record.region.is_empty());
        assert!(record.year.is_none());
        assert!((record.count - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn null_and_empty_categories_become_unknown() {
        for category in [serde_json::Value::Null, serde_json::json!("")] {
            let record: CrimeRecord = serde_json::from_value(serde_json::json!({
                "Crime Type": category,
                "Crime Count": 1,
                "Latitude": 0.0,
                "Longitude": 0.0
            }))
            .unwrap();
            assert_eq!(record.category, UNKNOWN_CATEGORY);
        }
    }

    #[test]
    fn accepts_lowercase_aliases() {
        let record: CrimeRecord = serde_json::from_value(serde_json::json!({
            "region": "Kerala",
            "category": "theft",
            "year": 2011,
            "count": 3,
            "lat": 10.0,
            "lng": 76.0
        }))
        .unwrap();

        assert_eq!(record.region, "Kerala");
        assert_eq!(record.category, "theft");
        assert_eq!(record.year, Some(2011));
    }

    #[test]
    fn payload_defaults_missing_arrays() {
        let payload: DatasetPayload = serde_json::from_value(serde_json::json!({
            "chartData": [{"Year": 2020, "Crime Count": 5}]
        }))
        .unwrap();
        assert!(payload.map_data.is_empty());
        assert_eq!(payload.chart_data, vec![ChartPoint { year: 2020, count: 5.0 }]);
        assert!(!payload.is_empty());
    }

    #[test]
    fn raw_forecast_reads_state_as_region() {
        let point: RawForecastPoint = serde_json::from_value(serde_json::json!({
            "State": "Goa",
            "Year": 2013,
            "Predicted_Crimes": 120.5,
            "Lower_CI": 100.0,
            "Upper_CI": 140.0
        }))
        .unwrap();
        assert_eq!(point.region.as_deref(), Some("Goa"));
        assert_eq!(point.year, 2013);
    }

    #[test]
    fn dataset_mode_string_forms() {
        assert_eq!(DatasetMode::Combined.to_string(), "combined");
        assert_eq!("predicted".parse::<DatasetMode>().unwrap(), DatasetMode::Predicted);
    }

    #[test]
    fn grouped_map_data_keeps_insertion_order() {
        let record = |category: &str| CrimeRecord {
            region: String::new(),
            city: None,
            category: category.to_string(),
            year: None,
            count: 1.0,
            lat: 0.0,
            lng: 0.0,
        };

        let mut grouped = GroupedMapData::new();
        grouped.push("theft", record("theft"));
        grouped.push("arson", record("arson"));
        grouped.push("theft", record("theft"));

        assert_eq!(grouped.categories().collect::<Vec<_>>(), ["theft", "arson"]);
        assert_eq!(grouped.total_records(), 3);
        assert_eq!(grouped.get("theft").map(<[_]>::len), Some(2));
    }

    #[test]
    fn grouped_map_data_equality_respects_layer_order() {
        let record = |category: &str| CrimeRecord {
            region: String::new(),
            city: None,
            category: category.to_string(),
            year: None,
            count: 1.0,
            lat: 0.0,
            lng: 0.0,
        };

        let mut theft_first = GroupedMapData::new();
        theft_first.push("theft", record("theft"));
        theft_first.push("arson", record("arson"));

        let mut arson_first = GroupedMapData::new();
        arson_first.push("arson", record("arson"));
        arson_first.push("theft", record("theft"));

        assert_ne!(theft_first, arson_first);
        assert_eq!(theft_first, theft_first.clone());
    }

    #[test]
    fn float_year_columns_decode() {
        let point: ChartPoint =
            serde_json::from_value(serde_json::json!({ "Year": 2001.0, "Crime Count": 5 }))
                .unwrap();
        assert_eq!(point.year, 2001);

        let forecast: RawForecastPoint = serde_json::from_value(serde_json::json!({
            "Year": "2013.0",
            "Predicted_Crimes": 1.5
        }))
        .unwrap();
        assert_eq!(forecast.year, 2013);

        let record: CrimeRecord = serde_json::from_value(serde_json::json!({
            "Year": 2011.0,
            "Crime Count": 1,
            "Latitude": 0.0,
            "Longitude": 0.0
        }))
        .unwrap();
        assert_eq!(record.year, Some(2011));
    }

    #[test]
    fn fractional_year_is_rejected() {
        let result: Result<ChartPoint, _> =
            serde_json::from_value(serde_json::json!({ "Year": 2001.5, "Crime Count": 5 }));
        assert!(result.is_err());
        assert_eq!(parse_year(" 2001.0 "), Some(2001));
        assert_eq!(parse_year("All"), None);
    }

    #[test]
    fn generations_increase() {
        let first = RequestGeneration::INITIAL.next();
        assert!(first > RequestGeneration::INITIAL);
        assert_eq!(first.next().value(), 2);
    }

    #[test]
    fn year_range_falls_back_to_default() {
        assert_eq!(FilterOptions::default().year_range(), (2000, 2025));

        let options = FilterOptions {
            years: vec![2012, 2001, 2010],
            ..FilterOptions::default()
        };
        assert_eq!(options.year_range(), (2001, 2012));
    }

    #[test]
    fn bounding_box_from_lat_lng_corners() {
        let goa = BoundingBox::from_corners((14.8, 73.7), (15.8, 74.2));
        assert!((goa.west - 73.7).abs() < f64::EPSILON);
        assert!((goa.north - 15.8).abs() < f64::EPSILON);

        let (lat, lng) = goa.center();
        assert!((lat - 15.3).abs() < 1e-9);
        assert!((lng - 73.95).abs() < 1e-9);
    }
}
