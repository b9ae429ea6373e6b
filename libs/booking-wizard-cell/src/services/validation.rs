use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{BookingForm, FieldErrors, FormField, WizardStep};
use crate::services::availability::SlotSource;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_REASON_LEN: usize = 500;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d{7,20}$").expect("phone pattern compiles"));

pub fn parse_form_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Cut `reason` down to its character limit. Over-long input is never an error.
pub fn truncate_reason(reason: &str) -> String {
    match reason.char_indices().nth(MAX_REASON_LEN) {
        Some((cut, _)) => reason[..cut].to_string(),
        None => reason.to_string(),
    }
}

pub fn validate_appointment(form: &BookingForm, today: NaiveDate, slots: &dyn SlotSource) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if form.service.trim().is_empty() {
        errors.insert(FormField::Service, "Please select a service");
    }

    let date = if form.date.trim().is_empty() {
        errors.insert(FormField::Date, "Date is required");
        None
    } else {
        match parse_form_date(&form.date) {
            None => {
                errors.insert(FormField::Date, "Date must be in YYYY-MM-DD format");
                None
            }
            Some(date) if date < today => {
                errors.insert(FormField::Date, "Date cannot be in the past");
                None
            }
            Some(date) => Some(date),
        }
    };

    if form.time.trim().is_empty() {
        errors.insert(FormField::Time, "Time is required");
    } else if let Some(date) = date {
        let key = date.format(DATE_FORMAT).to_string();
        if !slots.available_slots(&key).iter().any(|slot| slot == form.time.trim()) {
            errors.insert(FormField::Time, "Selected time is not available");
        }
    }

    errors
}

pub fn validate_patient(form: &BookingForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.insert(FormField::Name, "Full name is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.insert(
            FormField::Name,
            format!("Full name must be at most {} characters", MAX_NAME_LEN),
        );
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.insert(FormField::Email, "Email is required");
    } else if email.chars().count() > MAX_EMAIL_LEN || !EMAIL_REGEX.is_match(email) {
        errors.insert(FormField::Email, "Invalid email format");
    }

    let phone = form.phone.trim();
    if phone.is_empty() {
        errors.insert(FormField::Phone, "Phone is required");
    } else if phone.chars().count() > MAX_PHONE_LEN || !PHONE_REGEX.is_match(phone) {
        errors.insert(FormField::Phone, "Invalid phone number");
    }

    if form.reason.chars().count() > MAX_REASON_LEN {
        errors.insert(
            FormField::Reason,
            format!("Reason must be at most {} characters", MAX_REASON_LEN),
        );
    }

    errors
}

/// Errors for the fields entered on `step`. Confirm and Completed take no input.
pub fn validate_step(
    step: WizardStep,
    form: &BookingForm,
    today: NaiveDate,
    slots: &dyn SlotSource,
) -> FieldErrors {
    match step {
        WizardStep::Appointment => validate_appointment(form, today, slots),
        WizardStep::Patient => validate_patient(form),
        WizardStep::Confirm | WizardStep::Completed => FieldErrors::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::availability::SlotCalendar;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
    }

    fn calendar() -> SlotCalendar {
        SlotCalendar::new()
            .with_offered("2025-10-15", ["09:00", "10:30"])
            .with_booked("2025-10-15", ["10:30"])
    }

    fn appointment() -> BookingForm {
        BookingForm {
            service: "general_consultation".into(),
            date: "2025-10-15".into(),
            time: "09:00".into(),
            ..Default::default()
        }
    }

    #[test]
    fn appointment_step_accepts_an_available_slot() {
        assert!(validate_appointment(&appointment(), today(), &calendar()).is_empty());
    }

    #[test]
    fn booked_slot_is_not_selectable() {
        let form = BookingForm { time: "10:30".into(), ..appointment() };
        let errors = validate_appointment(&form, today(), &calendar());
        assert_eq!(errors.get(FormField::Time), Some("Selected time is not available"));
    }

    #[test]
    fn past_and_malformed_dates_are_rejected() {
        let form = BookingForm { date: "2025-10-14".into(), ..appointment() };
        let errors = validate_appointment(&form, today(), &calendar());
        assert_eq!(errors.get(FormField::Date), Some("Date cannot be in the past"));
        // Availability is not checked against a rejected date
        assert!(!errors.contains(FormField::Time));

        let form = BookingForm { date: "15/10/2025".into(), ..appointment() };
        let errors = validate_appointment(&form, today(), &calendar());
        assert_eq!(errors.get(FormField::Date), Some("Date must be in YYYY-MM-DD format"));
    }

    #[test]
    fn empty_appointment_reports_every_field() {
        let errors = validate_appointment(&BookingForm::default(), today(), &calendar());
        assert_eq!(errors.get(FormField::Service), Some("Please select a service"));
        assert_eq!(errors.get(FormField::Date), Some("Date is required"));
        assert_eq!(errors.get(FormField::Time), Some("Time is required"));
        assert!(!errors.contains(FormField::Doctor));
    }

    #[test]
    fn patient_contact_patterns() {
        let valid = BookingForm {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: "+15551234567".into(),
            ..Default::default()
        };
        assert!(validate_patient(&valid).is_empty());

        let invalid = BookingForm {
            name: "x".repeat(MAX_NAME_LEN + 1),
            email: "jane@@example".into(),
            phone: "555-1234".into(),
            ..Default::default()
        };
        let errors = validate_patient(&invalid);
        assert!(errors.contains(FormField::Name));
        assert_eq!(errors.get(FormField::Email), Some("Invalid email format"));
        assert_eq!(errors.get(FormField::Phone), Some("Invalid phone number"));

        // 20 digits fits, the leading plus pushes it over the length cap
        let long_phone = BookingForm { phone: format!("+{}", "1".repeat(20)), ..valid.clone() };
        assert!(validate_patient(&long_phone).contains(FormField::Phone));
        let max_phone = BookingForm { phone: "1".repeat(20), ..valid };
        assert!(validate_patient(&max_phone).is_empty());
    }

    #[test]
    fn email_limit_counts_characters() {
        let patient = |email: String| BookingForm {
            name: "Jane Doe".into(),
            email,
            phone: "+15551234567".into(),
            ..Default::default()
        };

        // 254 characters but well over 254 bytes
        let local = "é".repeat(MAX_EMAIL_LEN - "@example.com".len());
        let email = format!("{}@example.com", local);
        assert_eq!(email.chars().count(), MAX_EMAIL_LEN);
        assert!(email.len() > MAX_EMAIL_LEN);
        assert!(validate_patient(&patient(email)).is_empty());

        let too_long = format!("{}é@example.com", local);
        assert_eq!(
            validate_patient(&patient(too_long)).get(FormField::Email),
            Some("Invalid email format")
        );
    }

    #[test]
    fn truncate_reason_counts_characters() {
        let reason = "é".repeat(MAX_REASON_LEN + 20);
        let truncated = truncate_reason(&reason);
        assert_eq!(truncated.chars().count(), MAX_REASON_LEN);
        assert_eq!(truncate_reason("short"), "short");
    }
}
