use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use table_filter_cell::{parse_record_date, DateFilter, Filterable, StatusFilter, TableFilter};

// ==============================================================================
// CATALOG RECORDS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub patient: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
    pub service: String,
    pub status: String,
}

impl Filterable for AppointmentRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.patient.as_str(), self.doctor.as_str(), self.service.as_str()]
    }

    fn badge(&self) -> &str {
        &self.status
    }

    fn date(&self) -> Option<&str> {
        Some(&self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Filterable for DoctorRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str(), self.specialty.as_str()]
    }

    fn badge(&self) -> &str {
        &self.specialty
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRecord {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub discount: String,
    pub valid_until: String,
    pub button_text: String,
    pub button_link: String,
    pub badge: String,
    #[serde(default)]
    pub image: String,
}

impl Filterable for PromotionRecord {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.badge.as_str()]
    }

    fn badge(&self) -> &str {
        &self.badge
    }

    fn date(&self) -> Option<&str> {
        Some(&self.valid_until)
    }

    fn expires_on(&self) -> Option<&str> {
        Some(&self.valid_until)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicRecords {
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    pub doctors: Vec<DoctorRecord>,
    #[serde(default)]
    pub promotions: Vec<PromotionRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub appointments: usize,
    pub doctors: usize,
    pub promotions: usize,
}

impl ClinicRecords {
    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            appointments: self.appointments.len(),
            doctors: self.doctors.len(),
            promotions: self.promotions.len(),
        }
    }
}

// ==============================================================================
// EDIT PAYLOADS
// ==============================================================================

/// Field name -> message for a rejected create or update.
pub type FieldErrors = BTreeMap<String, String>;

static DOCTOR_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), message.to_string());
        false
    } else {
        true
    }
}

/// Body of `POST /promotions` and `PUT /promotions/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromotionInput {
    pub title: String,
    pub description: String,
    pub discount: String,
    pub valid_until: String,
    pub button_text: String,
    pub button_link: String,
    pub badge: String,
    pub image: String,
}

impl PromotionInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", &self.title, "Title is required");
        if require(&mut errors, "valid_until", &self.valid_until, "Valid until is required")
            && parse_record_date(&self.valid_until).is_none()
        {
            errors.insert("valid_until".to_string(), "Valid until must be in YYYY-MM-DD format".to_string());
        }
        errors
    }

    pub fn into_record(self, id: u32) -> PromotionRecord {
        PromotionRecord {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            discount: self.discount,
            valid_until: self.valid_until.trim().to_string(),
            button_text: self.button_text,
            button_link: self.button_link,
            badge: self.badge,
            image: self.image,
        }
    }
}

/// Body of `POST /doctors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoctorInput {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: String,
    pub image: String,
}

impl DoctorInput {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name, "Name is required");
        require(&mut errors, "specialty", &self.specialty, "Specialty is required");
        if require(&mut errors, "email", &self.email, "Email is required")
            && !DOCTOR_EMAIL_REGEX.is_match(self.email.trim())
        {
            errors.insert("email".to_string(), "Invalid email".to_string());
        }
        require(&mut errors, "phone", &self.phone, "Phone is required");
        require(&mut errors, "image", &self.image, "Image is required");
        errors
    }

    pub fn into_record(self, id: String) -> DoctorRecord {
        DoctorRecord {
            id,
            name: self.name.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            image: Some(self.image.trim().to_string()),
        }
    }
}

// ==============================================================================
// LIST QUERIES
// ==============================================================================

/// Query string accepted by every admin list endpoint.
///
/// Supplying `from` or `to` without a `date_filter` selects the custom range.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery<S> {
    pub search: Option<String>,
    pub badge: Option<String>,
    pub status: Option<StatusFilter>,
    pub date_filter: Option<DateFilter>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: Option<S>,
}

impl<S> Default for ListQuery<S> {
    fn default() -> Self {
        Self {
            search: None,
            badge: None,
            status: None,
            date_filter: None,
            from: None,
            to: None,
            sort: None,
        }
    }
}

impl<S> ListQuery<S> {
    pub fn table_filter(&self) -> TableFilter {
        let mut filter = TableFilter::new();

        if let Some(search) = &self.search {
            filter.set_search(search.clone());
        }
        if let Some(badge) = &self.badge {
            filter.set_badge_filter(badge.clone());
        }
        if let Some(status) = self.status {
            filter.set_status_filter(status);
        }

        let has_range = self.from.is_some() || self.to.is_some();
        let date_filter = match self.date_filter {
            Some(date_filter) => date_filter,
            None if has_range => DateFilter::Custom,
            None => DateFilter::All,
        };
        filter.set_date_filter(date_filter);
        if date_filter == DateFilter::Custom {
            filter.set_date_range(self.from, self.to);
        }

        filter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSort {
    #[default]
    Date,
    Patient,
}

impl AppointmentSort {
    pub fn sort<'a>(self, rows: Vec<&'a AppointmentRecord>) -> Vec<&'a AppointmentRecord> {
        match self {
            // Unparseable dates sink to the bottom
            AppointmentSort::Date => table_filter_cell::sort_by_key(rows, |appt| {
                let date = parse_record_date(&appt.date);
                (date.is_none(), date, appt.time.clone())
            }),
            AppointmentSort::Patient => {
                table_filter_cell::sort_by_key(rows, |appt| appt.patient.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionSort {
    ValidUntil,
    Title,
}

impl PromotionSort {
    pub fn sort<'a>(self, rows: Vec<&'a PromotionRecord>) -> Vec<&'a PromotionRecord> {
        match self {
            PromotionSort::ValidUntil => table_filter_cell::sort_by_key(rows, |promo| {
                let date = parse_record_date(&promo.valid_until);
                (date.is_none(), date)
            }),
            PromotionSort::Title => {
                table_filter_cell::sort_by_key(rows, |promo| promo.title.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoctorSort {
    Name,
    Specialty,
}

impl DoctorSort {
    pub fn sort<'a>(self, rows: Vec<&'a DoctorRecord>) -> Vec<&'a DoctorRecord> {
        match self {
            DoctorSort::Name => table_filter_cell::sort_by_key(rows, |doc| doc.name.to_lowercase()),
            DoctorSort::Specialty => {
                table_filter_cell::sort_by_key(rows, |doc| (doc.specialty.clone(), doc.name.to_lowercase()))
            }
        }
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read clinic data from {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Clinic data in {} is not valid: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No clinic data source is configured")]
    NoSource,

    #[error("Promotion {0} not found")]
    PromotionNotFound(u32),

    #[error("Invalid {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
    Invalid(FieldErrors),
}
