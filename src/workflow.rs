//! # RSVP Workflow
//!
//! The guest-visible state machine.
//!
//! ```text
//! Idle -> GateOpen -> FormOpen -> Submitting -> Success -> Idle
//!            |  ^                    |    ^
//!            v  |                    v    |
//!          GateError               Error --
//! ```
//!
//! Every transition goes through a `&mut self` method, so at most one gate check or
//! submission is in flight per session.
use std::{sync::Arc, time::Duration};

use invite::{
    Attending, FieldError, GateStrategy, RsvpSubmission, payloads::ConfirmationRequest,
    validate_submission,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{api::RsvpApi, debounce::SuggestionFeed};

/// How long the gate input shakes after a failed attempt.
pub const SHAKE_DURATION: Duration = Duration::from_millis(1500);

const NAME_NOT_FOUND: &str =
    "We couldn't find that name on the guest list. Please check the spelling and try again.";
const PIN_INCORRECT: &str = "Incorrect PIN. Please try again.";
const GATE_UNAVAILABLE: &str = "Something went wrong. Please try again in a moment.";
const SAVE_FAILED: &str = "We couldn't save your RSVP. Please try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateFailureKind {
    NotAdmitted,
    ServiceUnavailable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateFailure {
    pub kind: GateFailureKind,
    pub message: String,
    pub shake_until: Instant,
}

impl GateFailure {
    fn new(kind: GateFailureKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
            shake_until: Instant::now() + SHAKE_DURATION,
        }
    }

    pub fn is_shaking(&self) -> bool {
        Instant::now() < self.shake_until
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    GateOpen,
    GateError(GateFailure),
    FormOpen,
    Submitting,
    Success { email_sent: bool },
    Error(String),
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::GateOpen => "at the gate",
            Phase::GateError(_) => "showing a gate error",
            Phase::FormOpen => "filling the form",
            Phase::Submitting => "submitting",
            Phase::Success { .. } => "done",
            Phase::Error(_) => "showing a submit error",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GateSession {
    pub authenticated: bool,
    pub candidate_name: String,
}

/// Form contents. Both optional texts are kept while the guest flips between
/// answers; only the one for the chosen branch is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormData {
    pub name: String,
    pub email: String,
    pub attending: Attending,
    pub special_requests: String,
    pub well_wishes: String,
    pub submission_id: Uuid,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            attending: Attending::default(),
            special_requests: String::new(),
            well_wishes: String::new(),
            submission_id: Uuid::new_v4(),
        }
    }
}

impl FormData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn to_submission(&self) -> RsvpSubmission {
        let optional = |text: &str| {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        };

        let (special_requests, well_wishes) = match self.attending {
            Attending::Yes => (optional(&self.special_requests), None),
            Attending::No => (None, optional(&self.well_wishes)),
        };

        RsvpSubmission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            attending: self.attending,
            special_requests,
            well_wishes,
            submission_id: Some(self.submission_id),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("form has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldError>),
}

pub struct RsvpWorkflow {
    api: Arc<dyn RsvpApi>,
    phase: Phase,
    session: GateSession,
    form: FormData,
    field_errors: Vec<FieldError>,
    // Last submission sent for the current form, kept to spot edits made after a failure.
    attempted: Option<RsvpSubmission>,
    suggestions: SuggestionFeed,
}

impl RsvpWorkflow {
    pub fn new(api: Arc<dyn RsvpApi>) -> Self {
        Self::with_feed(api.clone(), SuggestionFeed::new(api))
    }

    pub fn with_feed(api: Arc<dyn RsvpApi>, suggestions: SuggestionFeed) -> Self {
        Self {
            api,
            phase: Phase::Idle,
            session: GateSession::default(),
            form: FormData::default(),
            field_errors: Vec::new(),
            attempted: None,
            suggestions,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn session(&self) -> &GateSession {
        &self.session
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormData {
        &mut self.form
    }

    /// Problems found by the last submit attempt, in form order.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn suggestions(&mut self) -> &mut SuggestionFeed {
        &mut self.suggestions
    }

    /// Whether the submit control should be enabled.
    pub fn submit_enabled(&self) -> bool {
        matches!(self.phase, Phase::FormOpen | Phase::Error(_))
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            action,
            phase: self.phase.label(),
        }
    }

    fn at_gate(&self) -> bool {
        matches!(self.phase, Phase::GateOpen | Phase::GateError(_))
    }

    pub fn open(&mut self) -> Result<(), WorkflowError> {
        if self.phase != Phase::Idle {
            return Err(self.invalid("open the RSVP"));
        }

        self.session = GateSession::default();
        self.phase = Phase::GateOpen;

        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        if !self.at_gate() {
            return Err(self.invalid("cancel"));
        }

        self.suggestions.dismiss();
        self.session = GateSession::default();
        self.phase = Phase::Idle;

        Ok(())
    }

    /// Replaces the gate input. Clears a shown gate error and, for the name
    /// gate, schedules a suggestion lookup.
    pub fn edit_candidate(&mut self, text: &str) -> Result<(), WorkflowError> {
        if !self.at_gate() {
            return Err(self.invalid("edit the name"));
        }

        self.session.candidate_name = text.to_string();
        self.phase = Phase::GateOpen;

        if self.api.strategy() == GateStrategy::Names {
            self.suggestions.input(text);
        }

        Ok(())
    }

    /// Fills the gate input with the suggestion at `index`. Does not admit.
    pub fn select_suggestion(&mut self, index: usize) -> Result<bool, WorkflowError> {
        if !self.at_gate() {
            return Err(self.invalid("pick a suggestion"));
        }

        Ok(match self.suggestions.select(index) {
            Some(name) => {
                self.session.candidate_name = name;
                self.phase = Phase::GateOpen;
                true
            }
            None => false,
        })
    }

    /// Fills the gate input with the highlighted suggestion. Does not admit.
    pub fn accept_suggestion(&mut self) -> Result<bool, WorkflowError> {
        if !self.at_gate() {
            return Err(self.invalid("pick a suggestion"));
        }

        Ok(match self.suggestions.accept() {
            Some(name) => {
                self.session.candidate_name = name;
                self.phase = Phase::GateOpen;
                true
            }
            None => false,
        })
    }

    /// Runs the gate on the current input. Blank input is ignored.
    pub async fn submit_gate(&mut self) -> Result<(), WorkflowError> {
        if !self.at_gate() {
            return Err(self.invalid("check the name"));
        }

        let candidate = self.session.candidate_name.trim().to_string();
        if candidate.is_empty() {
            return Ok(());
        }

        self.suggestions.dismiss();

        match self.api.verify(&candidate).await {
            Ok(admission) if admission.is_admitted() => {
                let name = match self.api.strategy() {
                    GateStrategy::Names => admission.canonical_name().unwrap_or(&candidate),
                    GateStrategy::Pin => "",
                };
                info!(name, "Guest admitted");

                self.form = FormData::new(name);
                self.field_errors.clear();
                self.attempted = None;
                self.session = GateSession {
                    authenticated: true,
                    candidate_name: String::new(),
                };
                self.phase = Phase::FormOpen;
            }
            Ok(_) => {
                let message = match self.api.strategy() {
                    GateStrategy::Names => NAME_NOT_FOUND,
                    GateStrategy::Pin => PIN_INCORRECT,
                };
                self.phase = Phase::GateError(GateFailure::new(GateFailureKind::NotAdmitted, message));
            }
            Err(e) => {
                warn!("Gate check failed: {e}");
                self.phase = Phase::GateError(GateFailure::new(
                    GateFailureKind::ServiceUnavailable,
                    GATE_UNAVAILABLE,
                ));
            }
        }

        Ok(())
    }

    /// Validates, records, then asks for the confirmation email.
    ///
    /// Invalid fields keep the form open and are listed in [`Self::field_errors`].
    /// A failed write moves to [`Phase::Error`] with the form untouched. Resending the
    /// same answers reuses the submission id; changed answers get a fresh one.
    pub async fn submit(&mut self) -> Result<(), WorkflowError> {
        if !self.submit_enabled() {
            return Err(self.invalid("submit"));
        }

        if self
            .attempted
            .as_ref()
            .is_some_and(|previous| !same_answers(previous, &self.form.to_submission()))
        {
            self.form.submission_id = Uuid::new_v4();
        }

        let submission = self.form.to_submission();
        if let Err(errors) = validate_submission(&submission) {
            self.field_errors = errors.0.clone();
            self.phase = Phase::FormOpen;
            return Err(WorkflowError::Invalid(errors.0));
        }

        self.field_errors.clear();
        self.attempted = Some(submission.clone());
        self.phase = Phase::Submitting;

        match self.api.submit_rsvp(&submission).await {
            Ok(response) => {
                info!(name = submission.name, duplicate = response.duplicate, "RSVP recorded");
            }
            Err(e) => {
                warn!("RSVP submit failed: {e}");
                self.phase = Phase::Error(SAVE_FAILED.to_string());
                return Ok(());
            }
        }

        let request = ConfirmationRequest::new(&submission.email, &submission.name, submission.attending);
        let email_sent = match self.api.send_confirmation(&request).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!("Confirmation email failed: {e}");
                false
            }
        };

        self.phase = Phase::Success { email_sent };

        Ok(())
    }

    /// Submits again after a failed write, with the same form and submission id.
    pub async fn retry(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.phase, Phase::Error(_)) {
            return Err(self.invalid("retry"));
        }

        self.submit().await
    }

    pub fn close(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.phase, Phase::Success { .. }) {
            return Err(self.invalid("close"));
        }

        self.form = FormData::default();
        self.field_errors.clear();
        self.attempted = None;
        self.session = GateSession::default();
        self.phase = Phase::Idle;

        Ok(())
    }
}

fn same_answers(a: &RsvpSubmission, b: &RsvpSubmission) -> bool {
    RsvpSubmission {
        submission_id: a.submission_id,
        ..b.clone()
    } == *a
}
