use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{DateFilter, FilterState, Filterable, StatusFilter, ALL};

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Filter `records` down to the ones satisfying every criterion in `state`.
///
/// Input order is preserved and the records themselves are only borrowed.
/// `today` anchors the `Today`, `ThisWeek` and status filters.
pub fn apply<'a, T: Filterable>(records: &'a [T], state: &FilterState, today: NaiveDate) -> Vec<&'a T> {
    let needle = state.search.to_lowercase();

    records
        .iter()
        .filter(|record| matches_all(*record, state, &needle, today))
        .collect()
}

/// Single-record form of [`apply`].
pub fn matches<T: Filterable>(record: &T, state: &FilterState, today: NaiveDate) -> bool {
    matches_all(record, state, &state.search.to_lowercase(), today)
}

/// `needle` is `state.search` already lower-cased.
fn matches_all<T: Filterable>(record: &T, state: &FilterState, needle: &str, today: NaiveDate) -> bool {
    matches_search(record, needle)
        && matches_badge(record, &state.badge_filter)
        && matches_status(record, state.status_filter, today)
        && matches_date(record, state, today)
}

/// Stable sort of an already filtered view.
pub fn sort_by_key<'a, T, K, F>(mut rows: Vec<&'a T>, mut key: F) -> Vec<&'a T>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    rows.sort_by_key(|row| key(row));
    rows
}

pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), RECORD_DATE_FORMAT).ok()
}

/// Monday and Sunday of the ISO week containing `today`.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

fn matches_search<T: Filterable>(record: &T, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

fn matches_badge<T: Filterable>(record: &T, badge_filter: &str) -> bool {
    badge_filter == ALL || record.badge() == badge_filter
}

fn matches_status<T: Filterable>(record: &T, status: StatusFilter, today: NaiveDate) -> bool {
    if status == StatusFilter::All {
        return true;
    }

    match record.expires_on().and_then(parse_record_date) {
        Some(expiry) => match status {
            StatusFilter::Active => expiry > today,
            StatusFilter::Expired => expiry <= today,
            StatusFilter::All => true,
        },
        None => false,
    }
}

fn matches_date<T: Filterable>(record: &T, state: &FilterState, today: NaiveDate) -> bool {
    if state.date_filter == DateFilter::All {
        return true;
    }

    let Some(date) = record.date().and_then(parse_record_date) else {
        return false;
    };

    match state.date_filter {
        DateFilter::All => true,
        DateFilter::Today => date == today,
        DateFilter::ThisWeek => {
            let (monday, sunday) = week_bounds(today);
            monday <= date && date <= sunday
        }
        DateFilter::Custom => state.date_range.contains(date),
    }
}
