use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Badge/status value that disables the badge predicate.
pub const ALL: &str = "All";

/// A record that list views can search, badge-filter and date-filter.
///
/// Dates are handed over as the raw `yyyy-MM-dd` strings the record carries.
/// The engine parses them itself, and anything unparseable simply fails the
/// non-`All` date and status filters.
pub trait Filterable {
    /// Fields matched by free-text search.
    fn search_fields(&self) -> Vec<&str>;

    /// Categorical value compared against the badge filter.
    fn badge(&self) -> &str;

    fn date(&self) -> Option<&str> {
        None
    }

    /// Last day the record is considered active.
    fn expires_on(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    #[serde(alias = "All")]
    All,
    #[serde(alias = "Today")]
    Today,
    #[serde(alias = "ThisWeek", alias = "This Week")]
    ThisWeek,
    #[serde(alias = "Custom")]
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    #[serde(alias = "All")]
    All,
    #[serde(alias = "Active")]
    Active,
    #[serde(alias = "Expired")]
    Expired,
}

/// Inclusive calendar range used by [`DateFilter::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Incomplete and inverted ranges contain nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => start <= date && date <= end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub badge_filter: String,
    pub status_filter: StatusFilter,
    pub date_filter: DateFilter,
    pub date_range: DateRange,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            badge_filter: ALL.to_string(),
            status_filter: StatusFilter::All,
            date_filter: DateFilter::All,
            date_range: DateRange::default(),
        }
    }
}

impl FilterState {
    /// True when any criterion differs from the reset state.
    pub fn is_filtering(&self) -> bool {
        *self != Self::default()
    }
}
