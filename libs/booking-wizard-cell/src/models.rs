use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// FORM
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingForm {
    pub doctor: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

/// Partial update merged into a [`BookingForm`]. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPatch {
    pub doctor: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Doctor,
    Name,
    Email,
    Phone,
    Service,
    Date,
    Time,
    Reason,
}

impl FormField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FormField::Doctor => "doctor",
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Service => "service",
            FormField::Date => "date",
            FormField::Time => "time",
            FormField::Reason => "reason",
        }
    }

    /// Step on which the field is entered.
    pub const fn step(&self) -> WizardStep {
        match self {
            FormField::Doctor | FormField::Service | FormField::Date | FormField::Time => {
                WizardStep::Appointment
            }
            FormField::Name | FormField::Email | FormField::Phone | FormField::Reason => {
                WizardStep::Patient
            }
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<FormField, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: FormField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Drop every message belonging to fields entered on `step`.
    pub fn clear_step(&mut self, step: WizardStep) {
        self.0.retain(|field, _| field.step() != step);
    }

    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

// ==============================================================================
// WIZARD STATE
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Appointment,
    Patient,
    Confirm,
    Completed,
}

impl WizardStep {
    pub const COUNT: u8 = 4;

    pub const fn number(&self) -> u8 {
        match self {
            WizardStep::Appointment => 1,
            WizardStep::Patient => 2,
            WizardStep::Confirm => 3,
            WizardStep::Completed => 4,
        }
    }

    pub const fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Appointment => Some(WizardStep::Patient),
            WizardStep::Patient => Some(WizardStep::Confirm),
            WizardStep::Confirm => Some(WizardStep::Completed),
            WizardStep::Completed => None,
        }
    }

    /// Completed has no way back; only a reset leaves it.
    pub const fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Appointment | WizardStep::Completed => None,
            WizardStep::Patient => Some(WizardStep::Appointment),
            WizardStep::Confirm => Some(WizardStep::Patient),
        }
    }

    pub const fn title(&self) -> &'static str {
        match self {
            WizardStep::Appointment => "Appointment Details",
            WizardStep::Patient => "Patient Information",
            WizardStep::Confirm => "Review & Confirm",
            WizardStep::Completed => "Booking Completed",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.title())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Failed { message: String },
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingReceipt {
    pub reference: Uuid,
    pub submitted_at: DateTime<Utc>,
}

impl BookingReceipt {
    pub fn new(reference: Uuid) -> Self {
        Self {
            reference,
            submitted_at: Utc::now(),
        }
    }

    pub fn issue() -> Self {
        Self::new(Uuid::new_v4())
    }
}

// ==============================================================================
// AVAILABILITY & CATALOG
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub offered: usize,
    pub booked: usize,
    pub available_slots: Vec<String>,
    pub is_past: bool,
    pub is_bookable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceOption {
    pub code: &'static str,
    pub label: &'static str,
}

pub const SERVICE_CATALOG: &[ServiceOption] = &[
    ServiceOption { code: "general_consultation", label: "General Consultation" },
    ServiceOption { code: "dental_checkup", label: "Dental Check-up" },
    ServiceOption { code: "skin_screening", label: "Skin Screening" },
    ServiceOption { code: "vaccination", label: "Vaccination/Immunization" },
    ServiceOption { code: "pediatric_care", label: "Pediatric Care" },
    ServiceOption { code: "womens_health", label: "Women's Health Check" },
    ServiceOption { code: "mens_health", label: "Men's Health Check" },
    ServiceOption { code: "chronic_disease_management", label: "Chronic Disease Management" },
    ServiceOption { code: "minor_surgery", label: "Minor Surgery" },
    ServiceOption { code: "nutritional_counseling", label: "Nutritional Counseling" },
    ServiceOption { code: "student_enrollment_check_up", label: "Student enrollment check up" },
];

pub fn service_label(code: &str) -> Option<&'static str> {
    SERVICE_CATALOG
        .iter()
        .find(|option| option.code == code)
        .map(|option| option.label)
}

// ==============================================================================
// API SHAPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardSnapshot {
    pub session_id: Uuid,
    pub step: u8,
    pub step_name: WizardStep,
    pub step_title: &'static str,
    pub total_steps: u8,
    /// Display label of the chosen service, for the confirmation summary.
    pub service_label: Option<&'static str>,
    pub form: BookingForm,
    pub errors: FieldErrors,
    pub submission: SubmissionState,
    pub receipt: Option<BookingReceipt>,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}
