use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::error::BookingError;
use crate::models::DaySummary;
use crate::services::validation::DATE_FORMAT;

/// Read-only source of offered and booked slots, keyed by `YYYY-MM-DD`.
pub trait SlotSource: Send + Sync {
    fn offered_slots(&self, date: &str) -> Vec<String>;

    fn booked_slots(&self, date: &str) -> Vec<String>;

    /// Offered minus booked, in offered order.
    fn available_slots(&self, date: &str) -> Vec<String> {
        let booked = self.booked_slots(date);
        self.offered_slots(date)
            .into_iter()
            .filter(|slot| !booked.contains(slot))
            .collect()
    }
}

/// JSON-backed slot calendar.
///
/// A date with an `offered` entry uses it verbatim (an empty list closes the
/// day); every other date falls back to `default_slots`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotCalendar {
    pub default_slots: Vec<String>,
    pub offered: HashMap<String, Vec<String>>,
    pub booked: HashMap<String, Vec<String>>,
}

impl SlotCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_slots = slots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_offered<I, S>(mut self, date: &str, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offered
            .insert(date.to_string(), slots.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_booked<I, S>(mut self, date: &str, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.booked
            .insert(date.to_string(), slots.into_iter().map(Into::into).collect());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, BookingError> {
        let path = path.as_ref();
        debug!("Reading slot calendar from {}", path.display());

        let calendar_error = |message: String| BookingError::Calendar {
            path: PathBuf::from(path),
            message,
        };

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| calendar_error(e.to_string()))?;
        let calendar: SlotCalendar =
            serde_json::from_str(&raw).map_err(|e| calendar_error(e.to_string()))?;

        info!(
            "Loaded slot calendar: {} default slots, {} dated overrides, {} days with bookings",
            calendar.default_slots.len(),
            calendar.offered.len(),
            calendar.booked.len()
        );
        Ok(calendar)
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, BookingError> {
        match &config.slot_calendar_path {
            Some(path) => Self::from_path(path).await,
            None => {
                warn!("No slot calendar configured, no appointment slots will be offered");
                Ok(Self::default())
            }
        }
    }
}

impl SlotSource for SlotCalendar {
    fn offered_slots(&self, date: &str) -> Vec<String> {
        self.offered
            .get(date)
            .unwrap_or(&self.default_slots)
            .clone()
    }

    fn booked_slots(&self, date: &str) -> Vec<String> {
        self.booked.get(date).cloned().unwrap_or_default()
    }
}

pub fn day_summary(source: &dyn SlotSource, date: NaiveDate, today: NaiveDate) -> DaySummary {
    let key = date.format(DATE_FORMAT).to_string();
    let offered = source.offered_slots(&key);
    let booked = source.booked_slots(&key);
    let available_slots = source.available_slots(&key);
    let is_past = date < today;

    DaySummary {
        date,
        offered: offered.len(),
        booked: booked.iter().filter(|slot| offered.contains(slot)).count(),
        is_bookable: !is_past && !available_slots.is_empty(),
        available_slots,
        is_past,
    }
}

/// One summary per day of the month, or `None` for an invalid year/month.
pub fn month_overview(
    source: &dyn SlotSource,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Option<Vec<DaySummary>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    Some(
        first
            .iter_days()
            .take_while(|day| day.month() == first.month())
            .map(|day| day_summary(source, day, today))
            .collect(),
    )
}
