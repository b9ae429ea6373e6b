use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{FieldErrors, WizardStep};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("A submission is already in flight")]
    SubmissionInFlight,

    #[error("Submission is only possible from the confirmation step, wizard is at step {0}")]
    NotAtConfirmation(WizardStep),

    #[error("Booking already completed, reset the wizard to start a new one")]
    AlreadyCompleted,

    #[error("Booking details failed validation ({} field(s))", .0.len())]
    Invalid(FieldErrors),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Booking service unreachable: {0}")]
    Transport(String),

    #[error("Booking rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from booking service: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("Failed to load slot calendar from {}: {message}", .path.display())]
    Calendar { path: PathBuf, message: String },

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("Failed to build booking client: {0}")]
    Client(String),
}
