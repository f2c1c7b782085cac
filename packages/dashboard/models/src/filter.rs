//! The dashboard's user-controlled filter selection.
//!
//! [`FilterState`] is the only mutable input of the aggregation pipeline.
//! Every mutation reports which field changed through a [`FilterChange`]
//! so the owner can decide which fetch groups to re-issue.

use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::DatasetMode;

/// Sentinel meaning "no restriction" for region, category, and year.
pub const ALL: &str = "All";

/// Region selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum RegionSelection {
    /// Every region.
    #[default]
    All,
    /// A single named region.
    Named(String),
}

impl RegionSelection {
    /// Creates a selection from a user-supplied name. `"All"` and blank
    /// names select every region.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name == ALL {
            Self::All
        } else {
            Self::Named(name.to_string())
        }
    }

    /// Returns the selected region name, if a single region is selected.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name),
        }
    }

    /// Whether every region is selected.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Value of the `state` query parameter for the dataset endpoints.
    #[must_use]
    pub fn as_query_value(&self) -> &str {
        self.name().unwrap_or(ALL)
    }
}

impl std::fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl FromStr for RegionSelection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for RegionSelection {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<RegionSelection> for String {
    fn from(value: RegionSelection) -> Self {
        value.to_string()
    }
}

/// Year selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum YearSelection {
    /// Every year.
    #[default]
    All,
    /// A single calendar year.
    Year(i32),
}

impl YearSelection {
    /// Value of the `year` query parameter for the dataset endpoints.
    #[must_use]
    pub fn as_query_value(self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for YearSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Error returned when a year selection is neither `All` nor an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidYearError {
    /// The rejected input.
    pub value: String,
}

impl std::fmt::Display for InvalidYearError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid year '{}': expected an integer or 'All'", self.value)
    }
}

impl std::error::Error for InvalidYearError {}

impl FromStr for YearSelection {
    type Err = InvalidYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ALL {
            return Ok(Self::All);
        }
        s.parse().map(Self::Year).map_err(|_| InvalidYearError {
            value: s.to_string(),
        })
    }
}

/// Which part of the filter a mutation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterChange {
    /// The region selection changed.
    Region,
    /// The category set changed.
    Categories,
    /// The year selection changed.
    Year,
    /// The dataset mode changed.
    DatasetMode,
}

impl FilterChange {
    /// Whether the forecast depends on this change. The forecast is keyed
    /// only by region.
    #[must_use]
    pub const fn affects_forecast(self) -> bool {
        matches!(self, Self::Region)
    }
}

/// Rejected filter mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The mutation would leave the category set empty. Select `All`
    /// instead.
    EmptyCategories,
    /// A category name was empty or whitespace.
    BlankCategory,
}

impl std::fmt::Display for FilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCategories => {
                write!(f, "category selection cannot be empty; select '{ALL}' instead")
            }
            Self::BlankCategory => write!(f, "category name cannot be blank"),
        }
    }
}

impl std::error::Error for FilterError {}

/// Current filter selection of a dashboard.
///
/// `categories` is never empty. When it contains [`ALL`], explicit
/// entries alongside it are kept but have no filtering effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    region: RegionSelection,
    categories: IndexSet<String>,
    year: YearSelection,
    dataset_mode: DatasetMode,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            region: RegionSelection::All,
            categories: IndexSet::from([ALL.to_string()]),
            year: YearSelection::All,
            dataset_mode: DatasetMode::Historical,
        }
    }
}

impl FilterState {
    /// Creates the initial selection: every region, category, and year of
    /// the historical dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected region.
    #[must_use]
    pub const fn region(&self) -> &RegionSelection {
        &self.region
    }

    /// Selected categories in selection order.
    #[must_use]
    pub const fn categories(&self) -> &IndexSet<String> {
        &self.categories
    }

    /// Selected year.
    #[must_use]
    pub const fn year(&self) -> YearSelection {
        self.year
    }

    /// Selected dataset mode.
    #[must_use]
    pub const fn dataset_mode(&self) -> DatasetMode {
        self.dataset_mode
    }

    /// Whether the `All` category is selected.
    #[must_use]
    pub fn all_categories(&self) -> bool {
        self.categories.contains(ALL)
    }

    /// The explicit category filter, or `None` when `All` is selected.
    #[must_use]
    pub fn category_filter(&self) -> Option<&IndexSet<String>> {
        if self.all_categories() {
            None
        } else {
            Some(&self.categories)
        }
    }

    /// Whether records of `category` pass the category filter.
    #[must_use]
    pub fn includes_category(&self, category: &str) -> bool {
        self.category_filter()
            .is_none_or(|selected| selected.contains(category))
    }

    /// Value of the `crime_type` query parameter: `All`, or the selected
    /// categories joined by commas.
    #[must_use]
    pub fn crime_type_param(&self) -> String {
        self.category_filter().map_or_else(
            || ALL.to_string(),
            |selected| selected.iter().map(String::as_str).collect::<Vec<_>>().join(","),
        )
    }

    /// Selects a region.
    pub fn set_region(&mut self, region: RegionSelection) -> Option<FilterChange> {
        if self.region == region {
            return None;
        }
        self.region = region;
        Some(FilterChange::Region)
    }

    /// Selects a year.
    pub fn set_year(&mut self, year: YearSelection) -> Option<FilterChange> {
        if self.year == year {
            return None;
        }
        self.year = year;
        Some(FilterChange::Year)
    }

    /// Selects a dataset mode.
    pub fn set_dataset_mode(&mut self, mode: DatasetMode) -> Option<FilterChange> {
        if self.dataset_mode == mode {
            return None;
        }
        self.dataset_mode = mode;
        Some(FilterChange::DatasetMode)
    }

    /// Adds a category to the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::BlankCategory`] if `category` is blank.
    pub fn add_category(&mut self, category: &str) -> Result<Option<FilterChange>, FilterError> {
        let category = normalize_category(category)?;
        Ok(self
            .categories
            .insert(category)
            .then_some(FilterChange::Categories))
    }

    /// Removes a category from the selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyCategories`] if `category` is the only
    /// selected category.
    pub fn remove_category(&mut self, category: &str) -> Result<Option<FilterChange>, FilterError> {
        if !self.categories.contains(category) {
            return Ok(None);
        }
        if self.categories.len() == 1 {
            return Err(FilterError::EmptyCategories);
        }
        self.categories.shift_remove(category);
        Ok(Some(FilterChange::Categories))
    }

    /// Replaces the whole category selection.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyCategories`] if `categories` yields no
    /// names, or [`FilterError::BlankCategory`] if any name is blank.
    pub fn set_categories<I, S>(
        &mut self,
        categories: I,
    ) -> Result<Option<FilterChange>, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = categories
            .into_iter()
            .map(|c| normalize_category(c.as_ref()))
            .collect::<Result<IndexSet<_>, _>>()?;

        if next.is_empty() {
            return Err(FilterError::EmptyCategories);
        }
        if next == self.categories {
            return Ok(None);
        }
        self.categories = next;
        Ok(Some(FilterChange::Categories))
    }

    /// Resets the category selection to `All`.
    pub fn select_all_categories(&mut self) -> Option<FilterChange> {
        if self.categories.len() == 1 && self.all_categories() {
            return None;
        }
        self.categories = IndexSet::from([ALL.to_string()]);
        Some(FilterChange::Categories)
    }
}

fn normalize_category(category: &str) -> Result<String, FilterError> {
    let category = category.trim();
    if category.is_empty() {
        Err(FilterError::BlankCategory)
    } else {
        Ok(category.to_string())
    }
}
