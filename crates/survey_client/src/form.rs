use std::{fmt, sync::Arc, time::Duration};

use shared::{
    domain::{AnswerRecord, ImportantService},
    protocol::{SubmissionOutcome, SUBMIT_FAILURE_PROMPT},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{error::FormError, transport::SubmissionTransport};

/// How long the thank-you confirmation stays up before the form resets.
pub const CONFIRMATION_WINDOW: Duration = Duration::from_secs(3);

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Submitted,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Submitted => "showing its confirmation",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    StatusChanged(SubmissionStatus),
    SubmissionFailed { message: String },
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub status: SubmissionStatus,
    pub record: AnswerRecord,
    pub error: Option<String>,
}

struct FormState {
    record: AnswerRecord,
    status: SubmissionStatus,
    error: Option<String>,
}

impl FormState {
    fn blank() -> Self {
        Self {
            record: AnswerRecord::default(),
            status: SubmissionStatus::Idle,
            error: None,
        }
    }
}

/// Owns one respondent's answers and drives the idle → submitting → submitted
/// lifecycle. Dropping the controller cancels a pending reset.
pub struct FormController {
    state: Arc<Mutex<FormState>>,
    transport: Arc<dyn SubmissionTransport>,
    events: broadcast::Sender<FormEvent>,
    reset_task: Mutex<Option<JoinHandle<()>>>,
    confirmation_window: Duration,
}

impl FormController {
    pub fn new(transport: Arc<dyn SubmissionTransport>) -> Self {
        Self::with_confirmation_window(transport, CONFIRMATION_WINDOW)
    }

    pub fn with_confirmation_window(
        transport: Arc<dyn SubmissionTransport>,
        confirmation_window: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(FormState::blank())),
            transport,
            events,
            reset_task: Mutex::new(None),
            confirmation_window,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        let state = self.state.lock().await;
        FormSnapshot {
            status: state.status,
            record: state.record.clone(),
            error: state.error.clone(),
        }
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.state.lock().await.status
    }

    pub async fn record(&self) -> AnswerRecord {
        self.state.lock().await.record.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Sets a field by its wire name; `importantServices` toggles membership.
    pub async fn update_field(&self, name: &str, value: &str) -> Result<(), FormError> {
        let mut state = self.state.lock().await;
        ensure_editable(&state)?;
        state.record.update_field(name, value)?;
        Ok(())
    }

    pub async fn toggle_service(&self, service: ImportantService) -> Result<bool, FormError> {
        let mut state = self.state.lock().await;
        ensure_editable(&state)?;
        Ok(state.record.important_services.toggle(service))
    }

    pub async fn set_rating(&self, rating: u8) -> Result<(), FormError> {
        let mut state = self.state.lock().await;
        ensure_editable(&state)?;
        state.record.set_rating(rating)?;
        Ok(())
    }

    /// Validates and sends the current answers. Validation failures return an
    /// error without contacting the relay; relay failures come back as
    /// `SubmissionOutcome::Failure` with the answers left intact.
    pub async fn submit(&self) -> Result<SubmissionOutcome, FormError> {
        let payload = {
            let mut state = self.state.lock().await;
            if state.status != SubmissionStatus::Idle {
                return Err(FormError::SubmissionInProgress(state.status));
            }
            if !state.record.overall_rating.is_set() {
                return Err(FormError::RatingRequired);
            }
            let missing = state.record.missing_required_fields();
            if !missing.is_empty() {
                return Err(FormError::MissingRequiredFields(missing));
            }

            let payload = serde_json::to_value(&state.record)?;
            state.status = SubmissionStatus::Submitting;
            state.error = None;
            payload
        };
        self.emit(FormEvent::StatusChanged(SubmissionStatus::Submitting));
        debug!("survey submission started");

        match self.transport.send(payload).await {
            Ok(()) => {
                self.state.lock().await.status = SubmissionStatus::Submitted;
                self.emit(FormEvent::StatusChanged(SubmissionStatus::Submitted));
                debug!(window = ?self.confirmation_window, "survey submitted; reset scheduled");
                self.schedule_reset().await;
                Ok(SubmissionOutcome::Success)
            }
            Err(err) => {
                warn!(error = %err, "survey submission failed");
                let message = SUBMIT_FAILURE_PROMPT.to_string();
                {
                    let mut state = self.state.lock().await;
                    state.status = SubmissionStatus::Idle;
                    state.error = Some(message.clone());
                }
                self.emit(FormEvent::SubmissionFailed {
                    message: message.clone(),
                });
                self.emit(FormEvent::StatusChanged(SubmissionStatus::Idle));
                Ok(SubmissionOutcome::Failure { message })
            }
        }
    }

    /// Cancels a pending reset, leaving the form as it is now.
    pub async fn shutdown(&self) {
        if let Some(task) = self.reset_task.lock().await.take() {
            task.abort();
        }
    }

    async fn schedule_reset(&self) {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let window = self.confirmation_window;

        let task = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            *state.lock().await = FormState::blank();
            let _ = events.send(FormEvent::Reset);
            let _ = events.send(FormEvent::StatusChanged(SubmissionStatus::Idle));
        });

        if let Some(previous) = self.reset_task.lock().await.replace(task) {
            previous.abort();
        }
    }

    fn emit(&self, event: FormEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for FormController {
    fn drop(&mut self) {
        if let Some(task) = self.reset_task.get_mut().take() {
            task.abort();
        }
    }
}

fn ensure_editable(state: &FormState) -> Result<(), FormError> {
    if state.status == SubmissionStatus::Submitted {
        return Err(FormError::ConfirmationShowing);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
