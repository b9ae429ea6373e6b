use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use shared_config::AppConfig;

use crate::clock::FixedClock;

/// Wednesday. Its ISO week runs from 2025-10-13 to 2025-10-19.
pub const TEST_TODAY: (i32, u32, u32) = (2025, 10, 15);

pub fn test_today() -> NaiveDate {
    let (year, month, day) = TEST_TODAY;
    NaiveDate::from_ymd_opt(year, month, day).expect("fixture date is valid")
}

pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(test_today()))
}

pub struct TestConfig {
    pub bind_addr: String,
    pub booking_submission_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            booking_submission_url: None,
        }
    }
}

impl TestConfig {
    pub fn with_submission_url(url: &str) -> Self {
        Self {
            booking_submission_url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            bind_addr: self.bind_addr.clone(),
            booking_submission_url: self.booking_submission_url.clone(),
            booking_submission_timeout_secs: 2,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockClinicData;

impl MockClinicData {
    pub fn clinic_records() -> serde_json::Value {
        json!({
            "appointments": [
                { "id": "1", "patient": "John Doe", "doctor": "Dr. Smith", "date": "2025-10-15", "time": "09:00", "service": "General Consultation", "status": "Confirmed" },
                { "id": "2", "patient": "Jane Smith", "doctor": "Dr. Raj Kumar", "date": "2025-10-16", "time": "11:00", "service": "Dental Check-up", "status": "Pending" },
                { "id": "3", "patient": "Alice Johnson", "doctor": "Dr. Lee Kok Seng", "date": "2025-10-17", "time": "14:30", "service": "Skin Screening", "status": "Cancelled" },
                { "id": "4", "patient": "Bob Wilson", "doctor": "Dr. Smith", "date": "2025-10-21", "time": "10:00", "service": "Follow-up", "status": "Confirmed" },
                { "id": "5", "patient": "Carol Tan", "doctor": "Dr. Tan", "date": "not-a-date", "time": "08:30", "service": "Vaccination", "status": "Pending" }
            ],
            "doctors": [
                {
                    "id": "dr1", "name": "Dr. Smith", "specialty": "General Practitioner",
                    "email": "smith@klinikmekar.com", "phone": "+60 3-1234 5678"
                },
                {
                    "id": "dr2", "name": "Dr. Raj Kumar", "specialty": "Dentist",
                    "email": "raj@klinikmekar.com", "phone": "+60 3-8765 4321"
                },
                {
                    "id": "dr3", "name": "Dr. Lee Kok Seng", "specialty": "Dermatologist",
                    "email": "lee@klinikmekar.com", "phone": "+60 3-2468 1357"
                }
            ],
            "promotions": [
                {
                    "id": 1, "title": "Comprehensive Health Screening Package",
                    "description": "Complete health check-up with modern equipment",
                    "discount": "30% OFF", "valid_until": "2025-12-31",
                    "button_text": "Book Now", "button_link": "/book-screening",
                    "badge": "Popular", "image": "/images/outside.jpg"
                },
                {
                    "id": 2, "title": "Vaccination Campaign",
                    "description": "Protect yourself and your family",
                    "discount": "FREE Consultation", "valid_until": "2025-11-30",
                    "button_text": "Learn More", "button_link": "/vaccination",
                    "badge": "Limited Time", "image": "/images/interior.jpg"
                },
                {
                    "id": 3, "title": "Specialist Consultation Discount",
                    "description": "Expert consultation with board-certified specialists",
                    "discount": "25% OFF", "valid_until": "2025-10-15",
                    "button_text": "Schedule Visit", "button_link": "/consultation",
                    "badge": "New", "image": "/images/patient-room.jpg"
                }
            ]
        })
    }

    pub fn slot_calendar() -> serde_json::Value {
        json!({
            "default_slots": [
                "09:00", "09:30", "10:00", "10:30", "11:00", "11:30",
                "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00"
            ],
            "offered": {
                "2025-10-15": ["09:00", "10:30"],
                "2025-10-18": []
            },
            "booked": {
                "2025-10-15": ["10:30"],
                "2025-10-16": ["09:00", "10:30", "14:00"]
            }
        })
    }

    pub fn booking_form() -> serde_json::Value {
        json!({
            "doctor": "Dr. Smith",
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "+15551234567",
            "service": "general_consultation",
            "date": "2025-10-15",
            "time": "09:00",
            "reason": ""
        })
    }
}
