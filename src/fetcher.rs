//! In-flight Operations
//!
//! A `Fetcher` is one observation of a submitted mutation: its lifecycle
//! phase plus whatever request and response halves exist at that moment.

use serde::{Deserialize, Serialize};

use crate::error::{BoundaryError, ReconcileError};
use crate::form::FormData;
use crate::models::{ActionIntent, ActionResult};
use crate::request::{Submission, TodoRequest};

/// Lifecycle phase of a fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherState {
    /// Request sent, no response yet
    Submitting,
    /// Response received, confirmed data is being reloaded
    Loading,
    /// Settled
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetcher {
    pub state: FetcherState,
    pub submission: Option<Submission>,
    pub data: Option<ActionResult>,
}

impl Fetcher {
    pub fn submitting(request: TodoRequest) -> Self {
        Self {
            state: FetcherState::Submitting,
            submission: Some(Submission::new(request)),
            data: None,
        }
    }

    /// Response arrived; the submission is still attached while loading
    pub fn loading(request: TodoRequest, data: ActionResult) -> Self {
        Self {
            state: FetcherState::Loading,
            submission: Some(Submission::new(request)),
            data: Some(data),
        }
    }

    pub fn idle(data: ActionResult) -> Self {
        Self {
            state: FetcherState::Idle,
            submission: None,
            data: Some(data),
        }
    }

    /// Build an observation from the transport's raw halves: the urlencoded
    /// form body and the JSON action result.
    pub fn from_wire(
        state: FetcherState,
        form_body: Option<&str>,
        response_json: Option<&str>,
    ) -> Result<Self, BoundaryError> {
        let submission = form_body
            .map(|body| Submission::from_form(&FormData::parse(body)))
            .transpose()?;
        let data = response_json
            .map(|json| serde_json::from_str::<ActionResult>(json))
            .transpose()?;
        Ok(Self { state, submission, data })
    }

    pub fn request(&self) -> Option<&TodoRequest> {
        self.submission.as_ref().and_then(Submission::request)
    }

    /// The intent this observation is dispatched under. The response wins
    /// when present; a submission for another intent is a contract violation.
    pub fn intent(&self) -> Result<Option<ActionIntent>, ReconcileError> {
        match (&self.submission, &self.data) {
            (Some(submission), Some(data)) if submission.intent() != data.intent() => {
                Err(ReconcileError::IntentMismatch {
                    submitted: submission.intent(),
                    responded: data.intent(),
                })
            }
            (_, Some(data)) => Ok(Some(data.intent())),
            (Some(submission), None) => Ok(Some(submission.intent())),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_parses_both_halves() {
        let fetcher = Fetcher::from_wire(
            FetcherState::Loading,
            Some("intent=deleteTodo&id=9"),
            Some(r#"{"type":"success","intent":"deleteTodo","id":"9"}"#),
        )
        .unwrap();
        assert_eq!(fetcher.request(), Some(&TodoRequest::DeleteTodo { id: "9".to_string() }));
        assert_eq!(fetcher.intent(), Ok(Some(ActionIntent::DeleteTodo)));
    }

    #[test]
    fn test_from_wire_rejects_bad_json() {
        let err = Fetcher::from_wire(FetcherState::Idle, None, Some("{")).unwrap_err();
        assert!(matches!(err, BoundaryError::InvalidResult(_)));
    }

    #[test]
    fn test_intent_mismatch_is_an_error() {
        let fetcher = Fetcher {
            state: FetcherState::Loading,
            submission: Some(Submission::new(TodoRequest::DeleteTodo { id: "1".to_string() })),
            data: Some(ActionResult::success(ActionIntent::ToggleTodo, "1")),
        };
        assert_eq!(
            fetcher.intent(),
            Err(ReconcileError::IntentMismatch {
                submitted: ActionIntent::DeleteTodo,
                responded: ActionIntent::ToggleTodo,
            })
        );
    }

    #[test]
    fn test_empty_fetcher_has_no_intent() {
        let fetcher = Fetcher {
            state: FetcherState::Idle,
            submission: None,
            data: None,
        };
        assert_eq!(fetcher.intent(), Ok(None));
    }
}
