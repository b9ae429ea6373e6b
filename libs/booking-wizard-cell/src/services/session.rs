use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use shared_utils::clock::Clock;

use crate::error::{BookingError, SubmissionError, WizardError};
use crate::models::{service_label, BookingReceipt, DaySummary, FormPatch, WizardSnapshot, WizardStep};
use crate::services::availability::{self, SlotSource};
use crate::services::submission::BookingSink;
use crate::services::wizard::{BookingWizard, StepContext, Transition};

pub const DEFAULT_SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SUBMISSION_DEADLINE: Duration = Duration::from_secs(30);

struct SessionEntry {
    wizard: BookingWizard,
    last_seen: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            wizard: BookingWizard::new(),
            last_seen: Instant::now(),
        }
    }

    /// Sessions with a submission in flight never go idle.
    fn is_idle(&self, ttl: Duration) -> bool {
        !self.wizard.submission().is_pending() && self.last_seen.elapsed() > ttl
    }
}

type SessionMap = HashMap<Uuid, SessionEntry>;

/// Booking sessions, one wizard each, plus the collaborators they validate
/// and submit against.
///
/// Sessions idle for longer than the TTL are dropped, either when they are
/// next looked up or by [`BookingService::evict_idle`].
pub struct BookingService {
    sessions: Arc<RwLock<SessionMap>>,
    slots: Arc<dyn SlotSource>,
    sink: Arc<dyn BookingSink>,
    clock: Arc<dyn Clock>,
    idle_ttl: Duration,
    submission_deadline: Duration,
}

impl BookingService {
    pub fn new(slots: Arc<dyn SlotSource>, sink: Arc<dyn BookingSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            slots,
            sink,
            clock,
            idle_ttl: DEFAULT_SESSION_IDLE_TTL,
            submission_deadline: DEFAULT_SUBMISSION_DEADLINE,
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    /// Upper bound on a single sink call. Past it the submission fails as a
    /// transport error and the session can retry.
    pub fn with_submission_deadline(mut self, deadline: Duration) -> Self {
        self.submission_deadline = deadline;
        self
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    fn snapshot_of(&self, session_id: Uuid, wizard: &BookingWizard) -> WizardSnapshot {
        let step = wizard.step();
        let form = wizard.form().clone();
        WizardSnapshot {
            session_id,
            step: step.number(),
            step_name: step,
            step_title: step.title(),
            total_steps: WizardStep::COUNT,
            service_label: service_label(&form.service),
            form,
            errors: wizard.errors().clone(),
            submission: wizard.submission().clone(),
            receipt: wizard.receipt().cloned(),
            available_slots: wizard.available_slots(self.slots.as_ref()),
        }
    }

    /// Look up a live session and mark it as seen. An idle one is dropped.
    fn touch<'m>(
        sessions: &'m mut SessionMap,
        session_id: Uuid,
        idle_ttl: Duration,
    ) -> Result<&'m mut SessionEntry, BookingError> {
        let idle = sessions
            .get(&session_id)
            .ok_or(BookingError::SessionNotFound(session_id))?
            .is_idle(idle_ttl);
        if idle {
            sessions.remove(&session_id);
            debug!("Booking session {} expired", session_id);
            return Err(BookingError::SessionNotFound(session_id));
        }

        let entry = sessions
            .get_mut(&session_id)
            .ok_or(BookingError::SessionNotFound(session_id))?;
        entry.last_seen = Instant::now();
        Ok(entry)
    }

    /// Run `f` against one session's wizard under the write lock.
    async fn with_wizard<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut BookingWizard, StepContext<'_>) -> Result<T, WizardError>,
    ) -> Result<(T, WizardSnapshot), BookingError> {
        let today = self.clock.today();
        let mut sessions = self.sessions.write().await;
        let entry = Self::touch(&mut sessions, session_id, self.idle_ttl)?;

        let value = f(&mut entry.wizard, StepContext::new(today, self.slots.as_ref()))?;
        Ok((value, self.snapshot_of(session_id, &entry.wizard)))
    }

    pub async fn start_session(&self) -> WizardSnapshot {
        self.evict_idle().await;

        let session_id = Uuid::new_v4();
        let entry = SessionEntry::new();
        let snapshot = self.snapshot_of(session_id, &entry.wizard);

        self.sessions.write().await.insert(session_id, entry);
        info!("Started booking session {}", session_id);

        snapshot
    }

    /// Drop every idle session. Returns how many were removed.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_idle(self.idle_ttl));

        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {} idle booking session(s), {} remain", evicted, sessions.len());
        }
        evicted
    }

    pub async fn snapshot(&self, session_id: Uuid) -> Result<WizardSnapshot, BookingError> {
        let ((), snapshot) = self.with_wizard(session_id, |_, _| Ok(())).await?;
        Ok(snapshot)
    }

    pub async fn update_form(&self, session_id: Uuid, patch: FormPatch) -> Result<WizardSnapshot, BookingError> {
        let ((), snapshot) = self
            .with_wizard(session_id, |wizard, _| wizard.update(patch))
            .await?;
        Ok(snapshot)
    }

    /// Returns whether the step advanced along with the resulting snapshot.
    pub async fn next(&self, session_id: Uuid) -> Result<(bool, WizardSnapshot), BookingError> {
        let (transition, snapshot) = self
            .with_wizard(session_id, |wizard, ctx| wizard.next(ctx))
            .await?;
        Ok((transition.moved(), snapshot))
    }

    pub async fn back(&self, session_id: Uuid) -> Result<(bool, WizardSnapshot), BookingError> {
        let (transition, snapshot) = self
            .with_wizard(session_id, |wizard, _| wizard.back())
            .await?;
        Ok((transition.moved(), snapshot))
    }

    pub async fn dismiss_error(&self, session_id: Uuid) -> Result<WizardSnapshot, BookingError> {
        let ((), snapshot) = self
            .with_wizard(session_id, |wizard, _| {
                wizard.dismiss_submission_error();
                Ok(())
            })
            .await?;
        Ok(snapshot)
    }

    pub async fn reset(&self, session_id: Uuid) -> Result<WizardSnapshot, BookingError> {
        let ((), snapshot) = self
            .with_wizard(session_id, |wizard, _| wizard.reset())
            .await?;
        Ok(snapshot)
    }

    /// Remove the session. Refused while its submission is in flight.
    pub async fn end_session(&self, session_id: Uuid) -> Result<(), BookingError> {
        let mut sessions = self.sessions.write().await;
        let entry = Self::touch(&mut sessions, session_id, self.idle_ttl)?;
        if entry.wizard.submission().is_pending() {
            return Err(WizardError::SubmissionInFlight.into());
        }

        sessions.remove(&session_id);
        info!("Ended booking session {}", session_id);
        Ok(())
    }

    /// Submit the session's booking from the confirmation step.
    ///
    /// The sink call runs in its own task, bounded by the submission
    /// deadline, and records its outcome on the wizard itself. A caller that
    /// goes away mid-call therefore never leaves the session pending. Failed
    /// re-validation and sink failures both come back as a snapshot.
    #[instrument(skip(self))]
    pub async fn submit(&self, session_id: Uuid) -> Result<WizardSnapshot, BookingError> {
        let begun = self
            .with_wizard(session_id, |wizard, ctx| match wizard.begin_submission(ctx) {
                Ok(payload) => Ok(Some(payload)),
                Err(WizardError::Invalid(_)) => Ok(None),
                Err(e) => Err(e),
            })
            .await?;

        let payload = match begun {
            (Some(payload), _) => payload,
            (None, snapshot) => return Ok(snapshot),
        };

        let sessions = Arc::clone(&self.sessions);
        let sink = Arc::clone(&self.sink);
        let deadline = self.submission_deadline;

        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(deadline, sink.submit(&payload)).await {
                Ok(result) => result,
                Err(_) => Err(SubmissionError::Transport(format!(
                    "no answer from booking service within {}s",
                    deadline.as_secs_f32()
                ))),
            };
            record_outcome(&sessions, session_id, result).await;
        });

        if let Err(e) = task.await {
            error!("Submission task for session {} failed: {}", session_id, e);
            let failure = Err(SubmissionError::Transport("submission aborted".to_string()));
            record_outcome(&self.sessions, session_id, failure).await;
        }

        self.snapshot(session_id).await
    }

    pub fn day_summary(&self, date: chrono::NaiveDate) -> DaySummary {
        availability::day_summary(self.slots.as_ref(), date, self.clock.today())
    }

    pub fn month_overview(&self, year: i32, month: u32) -> Result<Vec<DaySummary>, BookingError> {
        availability::month_overview(self.slots.as_ref(), year, month, self.clock.today())
            .ok_or_else(|| BookingError::InvalidDate(format!("{}-{:02}", year, month)))
    }
}

async fn record_outcome(
    sessions: &RwLock<SessionMap>,
    session_id: Uuid,
    result: Result<BookingReceipt, SubmissionError>,
) {
    let mut sessions = sessions.write().await;
    let Some(entry) = sessions.get_mut(&session_id) else {
        warn!("Booking session {} vanished before its submission finished", session_id);
        return;
    };

    entry.last_seen = Instant::now();
    if let Transition::Advanced { .. } = entry.wizard.complete_submission(result) {
        debug!("Booking session {} completed", session_id);
    }
}
