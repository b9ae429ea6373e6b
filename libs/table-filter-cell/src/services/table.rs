use chrono::NaiveDate;
use tracing::debug;

use crate::models::{DateFilter, DateRange, FilterState, Filterable, StatusFilter, ALL};
use crate::services::engine;

/// Filter criteria owned by one list view.
///
/// Setters are independent of each other, except that leaving
/// [`DateFilter::Custom`] drops whatever range was picked for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    state: FilterState,
}

impl TableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: FilterState) -> Self {
        let mut filter = Self::new();
        filter.set_search(state.search);
        filter.set_badge_filter(state.badge_filter);
        filter.set_status_filter(state.status_filter);
        filter.set_date_filter(state.date_filter);
        if state.date_filter == DateFilter::Custom {
            filter.set_date_range(state.date_range.start, state.date_range.end);
        }
        filter
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn into_state(self) -> FilterState {
        self.state
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.state.search = search.into();
    }

    /// An empty badge is treated as "All".
    pub fn set_badge_filter(&mut self, badge: impl Into<String>) {
        let badge = badge.into();
        self.state.badge_filter = if badge.trim().is_empty() { ALL.to_string() } else { badge };
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.state.status_filter = status;
    }

    pub fn set_date_filter(&mut self, date_filter: DateFilter) {
        self.state.date_filter = date_filter;
        if date_filter != DateFilter::Custom && !self.state.date_range.is_empty() {
            debug!("Clearing custom date range after switching to {:?}", date_filter);
            self.state.date_range = DateRange::default();
        }
    }

    pub fn set_date_range(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        self.state.date_range = DateRange::new(start, end);
    }

    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    pub fn is_filtering(&self) -> bool {
        self.state.is_filtering()
    }

    pub fn apply<'a, T: Filterable>(&self, records: &'a [T], today: NaiveDate) -> Vec<&'a T> {
        engine::apply(records, &self.state, today)
    }
}
