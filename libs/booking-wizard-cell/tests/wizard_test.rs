// libs/booking-wizard-cell/tests/wizard_test.rs

use assert_matches::assert_matches;
use async_trait::async_trait;

use booking_wizard_cell::{
    BookingForm, BookingReceipt, BookingSink, BookingWizard, FormField, FormPatch, SlotCalendar,
    SlotSource, StepContext, SubmissionError, SubmissionState, Transition, WizardError, WizardStep,
};
use shared_utils::test_utils::{test_today, MockClinicData};

struct AcceptingSink;

#[async_trait]
impl BookingSink for AcceptingSink {
    async fn submit(&self, _form: &BookingForm) -> Result<BookingReceipt, SubmissionError> {
        Ok(BookingReceipt::issue())
    }
}

struct FailingSink;

#[async_trait]
impl BookingSink for FailingSink {
    async fn submit(&self, _form: &BookingForm) -> Result<BookingReceipt, SubmissionError> {
        Err(SubmissionError::Transport("connection refused".to_string()))
    }
}

fn calendar() -> SlotCalendar {
    serde_json::from_value(MockClinicData::slot_calendar()).expect("fixture parses")
}

fn appointment_patch() -> FormPatch {
    FormPatch {
        doctor: Some("Dr. Smith".into()),
        service: Some("general_consultation".into()),
        date: Some("2025-10-15".into()),
        time: Some("09:00".into()),
        ..Default::default()
    }
}

fn patient_patch() -> FormPatch {
    FormPatch {
        name: Some("Jane Doe".into()),
        email: Some("jane@example.com".into()),
        phone: Some("+15551234567".into()),
        ..Default::default()
    }
}

fn wizard_at_confirm(calendar: &SlotCalendar) -> BookingWizard {
    let ctx = StepContext::new(test_today(), calendar);
    let mut wizard = BookingWizard::new();
    wizard.update(appointment_patch()).unwrap();
    wizard.next(ctx).unwrap();
    wizard.update(patient_patch()).unwrap();
    wizard.next(ctx).unwrap();
    assert_eq!(wizard.step(), WizardStep::Confirm);
    wizard
}

#[test]
fn test_next_without_service_stays_on_step_one() {
    let calendar = calendar();
    let mut wizard = BookingWizard::new();
    wizard
        .update(FormPatch { service: Some(String::new()), ..appointment_patch() })
        .unwrap();

    let transition = wizard.next(StepContext::new(test_today(), &calendar)).unwrap();

    assert_matches!(transition, Transition::Blocked { step: WizardStep::Appointment, .. });
    assert_eq!(wizard.step().number(), 1);
    assert_eq!(wizard.errors().get(FormField::Service), Some("Please select a service"));
    // The form is never cleared by a failed validation
    assert_eq!(wizard.form().date, "2025-10-15");
}

#[tokio::test]
async fn test_happy_path_reaches_completion() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);
    let mut wizard = BookingWizard::new();

    wizard.update(appointment_patch()).unwrap();
    assert_eq!(
        wizard.next(ctx).unwrap(),
        Transition::Advanced { from: WizardStep::Appointment, to: WizardStep::Patient }
    );

    wizard.update(patient_patch()).unwrap();
    wizard.next(ctx).unwrap();
    assert_eq!(wizard.step(), WizardStep::Confirm);
    assert!(wizard.errors().is_empty());

    let before = wizard.form().clone();
    let transition = wizard.submit(ctx, &AcceptingSink).await.unwrap();

    assert_eq!(
        transition,
        Transition::Advanced { from: WizardStep::Confirm, to: WizardStep::Completed }
    );
    assert_eq!(wizard.step().number(), 4);
    assert_eq!(wizard.form(), &before);
    assert!(wizard.receipt().is_some());
    assert_eq!(wizard.submission(), &SubmissionState::Idle);
}

#[test]
fn test_booked_slot_is_excluded_and_rejected() {
    let calendar = calendar();
    let mut wizard = BookingWizard::new();
    wizard.update(appointment_patch()).unwrap();

    assert_eq!(calendar.available_slots("2025-10-15"), vec!["09:00"]);
    assert_eq!(wizard.available_slots(&calendar), vec!["09:00"]);

    wizard
        .update(FormPatch { time: Some("10:30".into()), ..Default::default() })
        .unwrap();
    let transition = wizard.next(StepContext::new(test_today(), &calendar)).unwrap();

    assert!(!transition.moved());
    assert_eq!(wizard.errors().get(FormField::Time), Some("Selected time is not available"));
}

#[test]
fn test_past_date_rejected_and_today_allowed() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);

    let mut wizard = BookingWizard::new();
    wizard
        .update(FormPatch { date: Some("2025-10-14".into()), time: Some("09:00".into()), ..appointment_patch() })
        .unwrap();
    wizard.next(ctx).unwrap();
    assert_eq!(wizard.errors().get(FormField::Date), Some("Date cannot be in the past"));

    wizard
        .update(FormPatch { date: Some("2025-10-15".into()), time: Some("09:00".into()), ..Default::default() })
        .unwrap();
    assert!(wizard.next(ctx).unwrap().moved());
}

#[test]
fn test_back_clears_errors_of_the_step_left() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);
    let mut wizard = BookingWizard::new();
    wizard.update(appointment_patch()).unwrap();
    wizard.next(ctx).unwrap();

    wizard.next(ctx).unwrap();
    assert!(wizard.errors().contains(FormField::Name));
    assert!(wizard.errors().contains(FormField::Email));

    let transition = wizard.back().unwrap();
    assert_eq!(
        transition,
        Transition::Retreated { from: WizardStep::Patient, to: WizardStep::Appointment }
    );
    assert!(wizard.errors().is_empty());

    // No-op at the first step
    assert_eq!(wizard.back().unwrap(), Transition::Unchanged(WizardStep::Appointment));
}

#[test]
fn test_changing_date_resets_time() {
    let calendar = calendar();
    let mut wizard = BookingWizard::new();
    wizard
        .update(FormPatch { date: Some("not a date".into()), ..appointment_patch() })
        .unwrap();
    wizard.next(StepContext::new(test_today(), &calendar)).unwrap();
    assert!(wizard.errors().contains(FormField::Date));

    wizard
        .update(FormPatch { date: Some("2025-10-17".into()), ..Default::default() })
        .unwrap();

    assert_eq!(wizard.form().time, "");
    assert!(!wizard.errors().contains(FormField::Date));
    assert_eq!(wizard.available_slots(&calendar).len(), 13);
}

#[test]
fn test_long_reason_is_truncated() {
    let mut wizard = BookingWizard::new();
    wizard
        .update(FormPatch { reason: Some("a".repeat(650)), ..Default::default() })
        .unwrap();

    assert_eq!(wizard.form().reason.len(), 500);
}

#[tokio::test]
async fn test_failed_submission_keeps_form_and_can_retry() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);
    let mut wizard = wizard_at_confirm(&calendar);
    let before = wizard.form().clone();

    let transition = wizard.submit(ctx, &FailingSink).await.unwrap();

    assert_eq!(transition, Transition::Unchanged(WizardStep::Confirm));
    assert_eq!(wizard.form(), &before);
    assert_matches!(wizard.submission(), SubmissionState::Failed { message } if message.contains("connection refused"));

    wizard.dismiss_submission_error();
    assert_eq!(wizard.submission(), &SubmissionState::Idle);

    wizard.submit(ctx, &AcceptingSink).await.unwrap();
    assert!(wizard.is_completed());
}

#[test]
fn test_only_one_submission_in_flight() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);
    let mut wizard = wizard_at_confirm(&calendar);

    wizard.begin_submission(ctx).unwrap();
    assert!(wizard.submission().is_pending());

    assert_matches!(wizard.begin_submission(ctx), Err(WizardError::SubmissionInFlight));
    assert_matches!(wizard.back(), Err(WizardError::SubmissionInFlight));
    assert_matches!(wizard.reset(), Err(WizardError::SubmissionInFlight));
    assert_matches!(wizard.update(patient_patch()), Err(WizardError::SubmissionInFlight));

    wizard.complete_submission(Ok(BookingReceipt::issue()));
    assert!(wizard.is_completed());
}

#[test]
fn test_submission_requires_confirmation_step() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);
    let mut wizard = BookingWizard::new();

    assert_matches!(
        wizard.begin_submission(ctx),
        Err(WizardError::NotAtConfirmation(WizardStep::Appointment))
    );
}

#[test]
fn test_confirmation_revalidates_taken_slot() {
    let mut calendar = calendar();
    let ctx_calendar = calendar.clone();
    let mut wizard = wizard_at_confirm(&ctx_calendar);

    // Someone else booked the slot after step one
    calendar.booked.insert("2025-10-15".into(), vec!["09:00".into(), "10:30".into()]);
    let result = wizard.begin_submission(StepContext::new(test_today(), &calendar));

    assert_matches!(result, Err(WizardError::Invalid(errors)) if errors.contains(FormField::Time));
    assert_eq!(wizard.step(), WizardStep::Confirm);
    assert!(!wizard.submission().is_pending());
}

#[tokio::test]
async fn test_completed_wizard_only_resets() {
    let calendar = calendar();
    let ctx = StepContext::new(test_today(), &calendar);
    let mut wizard = wizard_at_confirm(&calendar);
    wizard.submit(ctx, &AcceptingSink).await.unwrap();

    assert_eq!(wizard.back().unwrap(), Transition::Unchanged(WizardStep::Completed));
    assert_eq!(wizard.next(ctx).unwrap(), Transition::Unchanged(WizardStep::Completed));
    assert_matches!(wizard.update(patient_patch()), Err(WizardError::AlreadyCompleted));

    wizard.reset().unwrap();
    assert_eq!(wizard.step(), WizardStep::Appointment);
    assert_eq!(wizard.form(), &BookingForm::default());
    assert!(wizard.receipt().is_none());
}
