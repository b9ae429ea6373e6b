use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{SubmissionError, WizardError};
use crate::models::{
    BookingForm, BookingReceipt, FieldErrors, FormField, FormPatch, SubmissionState, WizardStep,
};
use crate::services::availability::SlotSource;
use crate::services::submission::BookingSink;
use crate::services::validation::{self, parse_form_date, truncate_reason, DATE_FORMAT};

/// What a step validator needs from the outside world.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    pub today: NaiveDate,
    pub slots: &'a dyn SlotSource,
}

impl<'a> StepContext<'a> {
    pub fn new(today: NaiveDate, slots: &'a dyn SlotSource) -> Self {
        Self { today, slots }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Advanced { from: WizardStep, to: WizardStep },
    Retreated { from: WizardStep, to: WizardStep },
    Blocked { step: WizardStep, errors: FieldErrors },
    Unchanged(WizardStep),
}

impl Transition {
    pub fn moved(&self) -> bool {
        matches!(self, Transition::Advanced { .. } | Transition::Retreated { .. })
    }
}

/// One booking attempt: the current step, the shared form and its errors.
///
/// Steps only move between neighbours. `next` is gated by the current step's
/// validator, `back` is not. Confirm is left through a submission, which
/// re-validates the whole form first since slots may have been taken since
/// step one.
#[derive(Debug, Clone, Default)]
pub struct BookingWizard {
    step: WizardStep,
    form: BookingForm,
    errors: FieldErrors,
    submission: SubmissionState,
    receipt: Option<BookingReceipt>,
}

impl BookingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn receipt(&self) -> Option<&BookingReceipt> {
        self.receipt.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.step == WizardStep::Completed
    }

    fn ensure_idle(&self) -> Result<(), WizardError> {
        if self.submission.is_pending() {
            return Err(WizardError::SubmissionInFlight);
        }
        Ok(())
    }

    /// Merge `patch` into the form.
    pub fn update(&mut self, patch: FormPatch) -> Result<(), WizardError> {
        self.ensure_idle()?;
        if self.is_completed() {
            return Err(WizardError::AlreadyCompleted);
        }

        let FormPatch { doctor, name, email, phone, service, date, time, reason } = patch;

        // A slot belongs to its date
        if let Some(date) = date {
            if date != self.form.date && time.is_none() {
                self.form.time.clear();
                self.errors.remove(FormField::Time);
            }
            self.set(FormField::Date, date);
        }

        let fields = [
            (FormField::Doctor, doctor),
            (FormField::Name, name),
            (FormField::Email, email),
            (FormField::Phone, phone),
            (FormField::Service, service),
            (FormField::Time, time),
            (FormField::Reason, reason.map(|r| truncate_reason(&r))),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                self.set(field, value);
            }
        }

        Ok(())
    }

    fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::Doctor => &mut self.form.doctor,
            FormField::Name => &mut self.form.name,
            FormField::Email => &mut self.form.email,
            FormField::Phone => &mut self.form.phone,
            FormField::Service => &mut self.form.service,
            FormField::Date => &mut self.form.date,
            FormField::Time => &mut self.form.time,
            FormField::Reason => &mut self.form.reason,
        };
        *slot = value;
        self.errors.remove(field);
    }

    /// Validate the current step and advance when it is clean.
    ///
    /// Confirm and Completed never advance through here.
    pub fn next(&mut self, ctx: StepContext<'_>) -> Result<Transition, WizardError> {
        self.ensure_idle()?;

        let from = self.step;
        if matches!(from, WizardStep::Confirm | WizardStep::Completed) {
            return Ok(Transition::Unchanged(from));
        }

        let errors = validation::validate_step(from, &self.form, ctx.today, ctx.slots);
        self.errors.clear_step(from);

        if !errors.is_empty() {
            debug!("Step {} blocked by {} field error(s)", from, errors.len());
            self.errors.merge(errors.clone());
            return Ok(Transition::Blocked { step: from, errors });
        }

        let Some(to) = from.next() else {
            return Ok(Transition::Unchanged(from));
        };
        self.step = to;
        debug!("Wizard advanced from step {} to {}", from.number(), to.number());

        Ok(Transition::Advanced { from, to })
    }

    /// Step back without validation, dropping the errors of the step being left.
    pub fn back(&mut self) -> Result<Transition, WizardError> {
        self.ensure_idle()?;

        let from = self.step;
        let Some(to) = from.previous() else {
            return Ok(Transition::Unchanged(from));
        };

        self.errors.clear_step(from);
        if from == WizardStep::Confirm {
            self.submission = SubmissionState::Idle;
        }
        self.step = to;
        debug!("Wizard moved back from step {} to {}", from.number(), to.number());

        Ok(Transition::Retreated { from, to })
    }

    /// Re-validate everything and mark a submission as pending.
    ///
    /// Returns the payload to hand to the sink. The caller must report the
    /// outcome through [`BookingWizard::complete_submission`].
    pub fn begin_submission(&mut self, ctx: StepContext<'_>) -> Result<BookingForm, WizardError> {
        self.ensure_idle()?;
        match self.step {
            WizardStep::Confirm => {}
            WizardStep::Completed => return Err(WizardError::AlreadyCompleted),
            other => return Err(WizardError::NotAtConfirmation(other)),
        }

        let mut errors = validation::validate_appointment(&self.form, ctx.today, ctx.slots);
        errors.merge(validation::validate_patient(&self.form));
        if !errors.is_empty() {
            warn!("Booking re-validation failed at confirmation ({} field(s))", errors.len());
            self.errors = errors.clone();
            return Err(WizardError::Invalid(errors));
        }

        self.errors.clear();
        self.submission = SubmissionState::Pending;
        Ok(self.form.clone())
    }

    /// Record the sink's answer for the pending submission.
    ///
    /// Success completes the wizard. Failure stays at Confirm with a
    /// retryable banner and the form untouched.
    pub fn complete_submission(
        &mut self,
        result: Result<BookingReceipt, SubmissionError>,
    ) -> Transition {
        if !self.submission.is_pending() {
            warn!("Ignoring submission outcome with no submission pending");
            return Transition::Unchanged(self.step);
        }

        match result {
            Ok(receipt) => {
                debug!("Booking submitted, reference {}", receipt.reference);
                self.receipt = Some(receipt);
                self.submission = SubmissionState::Idle;
                self.step = WizardStep::Completed;
                Transition::Advanced { from: WizardStep::Confirm, to: WizardStep::Completed }
            }
            Err(e) => {
                warn!("Booking submission failed: {}", e);
                self.submission = SubmissionState::Failed { message: e.to_string() };
                Transition::Unchanged(self.step)
            }
        }
    }

    /// Begin, await the sink and complete in one go.
    pub async fn submit(
        &mut self,
        ctx: StepContext<'_>,
        sink: &dyn BookingSink,
    ) -> Result<Transition, WizardError> {
        let payload = self.begin_submission(ctx)?;
        let result = sink.submit(&payload).await;
        Ok(self.complete_submission(result))
    }

    pub fn dismiss_submission_error(&mut self) {
        if matches!(self.submission, SubmissionState::Failed { .. }) {
            self.submission = SubmissionState::Idle;
        }
    }

    /// Start over at step one with an empty form.
    pub fn reset(&mut self) -> Result<(), WizardError> {
        self.ensure_idle()?;
        *self = Self::new();
        Ok(())
    }

    /// Selectable slots for the form's current date.
    pub fn available_slots(&self, slots: &dyn SlotSource) -> Vec<String> {
        match parse_form_date(&self.form.date) {
            Some(date) => slots.available_slots(&date.format(DATE_FORMAT).to_string()),
            None => Vec::new(),
        }
    }
}
