//! Per-page submission state machines.
//!
//! Each workflow owns its state and receives its client as a parameter.
//! Nothing here is process-wide.
//!
//! ```text
//! Idle ──submit(valid)──▶ Submitting ──ok──▶ Success(T)
//!   ▲                         │
//!   └──── guard dropped ──────┤
//!                             └──err──▶ Failed(message)
//! ```
//!
//! Success and Failed accept a new submit, which clears both payloads the
//! instant it begins. An invalid submit leaves the state as it was and
//! records a validation message instead.

pub mod diagnosis;
pub mod imaging;
pub mod listing;
pub mod upload;

pub use diagnosis::{DiagnosisSummary, DiagnosisWorkflow, DifferentialRow};
pub use imaging::ImageAnalysisWorkflow;
pub use listing::{HistoryView, PatientsView};
pub use upload::UploadWorkflow;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<T> {
    Idle,
    Submitting,
    Success(T),
    Failed(String),
}

impl<T> WorkflowState<T> {
    pub fn is_submitting(&self) -> bool {
        matches!(self, WorkflowState::Submitting)
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            WorkflowState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WorkflowState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What a call to `submit` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// Another submission was already in flight.
    Ignored,
    /// Rejected locally; no request was sent.
    Rejected(ValidationError),
}

/// Shared state cell behind every submission workflow.
pub struct Workflow<T> {
    state: Mutex<WorkflowState<T>>,
    validation: Mutex<Option<String>>,
}

impl<T> Default for Workflow<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Workflow<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WorkflowState::Idle),
            validation: Mutex::new(None),
        }
    }

    fn state_lock(&self) -> MutexGuard<'_, WorkflowState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_validation(&self, message: Option<String>) {
        *self.validation.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    pub fn state(&self) -> WorkflowState<T>
    where
        T: Clone,
    {
        self.state_lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state_lock().is_submitting()
    }

    pub fn validation_message(&self) -> Option<String> {
        self.validation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record a local rejection. The state, including any earlier result or
    /// error, is left alone.
    pub fn reject(&self, err: ValidationError) -> SubmitOutcome {
        tracing::debug!(reason = %err, "Submission rejected locally");
        self.set_validation(Some(err.to_string()));
        SubmitOutcome::Rejected(err)
    }

    /// Enter `Submitting`, clearing any result, error and validation message.
    /// Returns `None` when a submission is already in flight.
    pub fn begin(&self) -> Option<InFlight<'_, T>> {
        let mut state = self.state_lock();
        if state.is_submitting() {
            return None;
        }
        *state = WorkflowState::Submitting;
        drop(state);
        self.set_validation(None);
        Some(InFlight {
            workflow: self,
            settled: false,
        })
    }
}

/// Marks one submission in flight. Settle it with `succeed` or `fail`;
/// dropping it unsettled puts the workflow back to `Idle`.
pub struct InFlight<'a, T> {
    workflow: &'a Workflow<T>,
    settled: bool,
}

impl<T> InFlight<'_, T> {
    pub fn succeed(mut self, value: T) -> SubmitOutcome {
        self.settle(WorkflowState::Success(value));
        SubmitOutcome::Succeeded
    }

    pub fn fail(mut self, message: String) -> SubmitOutcome {
        self.settle(WorkflowState::Failed(message));
        SubmitOutcome::Failed
    }

    fn settle(&mut self, next: WorkflowState<T>) {
        *self.workflow.state_lock() = next;
        self.settled = true;
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("Submission abandoned before completion");
            *self.workflow.state_lock() = WorkflowState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_clears_terminal_payloads() {
        let flow: Workflow<u32> = Workflow::new();
        flow.begin().unwrap().fail("boom".into());
        assert_eq!(flow.state(), WorkflowState::Failed("boom".into()));

        let in_flight = flow.begin().unwrap();
        assert_eq!(flow.state(), WorkflowState::Submitting);
        in_flight.succeed(7);
        assert_eq!(flow.state().result(), Some(&7));
        assert_eq!(flow.state().error(), None);
    }

    #[test]
    fn second_begin_while_in_flight_is_refused() {
        let flow: Workflow<u32> = Workflow::new();
        let first = flow.begin().unwrap();
        assert!(flow.begin().is_none());
        first.succeed(1);
        assert!(flow.begin().is_some());
    }

    #[test]
    fn dropped_guard_returns_to_idle() {
        let flow: Workflow<u32> = Workflow::new();
        {
            let _in_flight = flow.begin().unwrap();
            assert!(flow.is_submitting());
        }
        assert_eq!(flow.state(), WorkflowState::Idle);
    }

    #[test]
    fn rejection_keeps_previous_result() {
        let flow: Workflow<u32> = Workflow::new();
        flow.begin().unwrap().succeed(3);

        let outcome = flow.reject(ValidationError::EmptySymptoms);
        assert_eq!(outcome, SubmitOutcome::Rejected(ValidationError::EmptySymptoms));
        assert_eq!(flow.state().result(), Some(&3));
        assert_eq!(
            flow.validation_message().as_deref(),
            Some("Please select at least one symptom")
        );

        let _in_flight = flow.begin().unwrap();
        assert_eq!(flow.validation_message(), None);
    }
}
