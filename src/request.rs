//! Typed Requests
//!
//! One validated request shape per intent. Raw form fields are read once
//! here; the reconciler only ever sees these values.

use serde::Serialize;

use crate::error::BoundaryError;
use crate::form::{to_complete_value, FormData};
use crate::models::ActionIntent;

/// A validated mutation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum TodoRequest {
    ClearTodos,
    #[serde(rename_all = "camelCase")]
    CreateTodo {
        id: String,
        title: String,
        created_at: i64,
    },
    DeleteTodo {
        id: String,
    },
    ToggleAllTodos {
        complete: bool,
    },
    ToggleTodo {
        id: String,
        complete: bool,
    },
    UpdateTodo {
        id: String,
        title: String,
    },
}

impl TodoRequest {
    /// Create request stamped with the client clock. The stamp only orders
    /// the optimistic record; the server assigns its own on insert.
    pub fn create_todo(id: impl Into<String>, title: impl Into<String>) -> Self {
        TodoRequest::CreateTodo {
            id: id.into(),
            title: title.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn intent(&self) -> ActionIntent {
        match self {
            TodoRequest::ClearTodos => ActionIntent::ClearTodos,
            TodoRequest::CreateTodo { .. } => ActionIntent::CreateTodo,
            TodoRequest::DeleteTodo { .. } => ActionIntent::DeleteTodo,
            TodoRequest::ToggleAllTodos { .. } => ActionIntent::ToggleAllTodos,
            TodoRequest::ToggleTodo { .. } => ActionIntent::ToggleTodo,
            TodoRequest::UpdateTodo { .. } => ActionIntent::UpdateTodo,
        }
    }

    /// The form `id` field. Bulk intents use their own name as id.
    pub fn subject_id(&self) -> &str {
        match self {
            TodoRequest::CreateTodo { id, .. }
            | TodoRequest::DeleteTodo { id }
            | TodoRequest::ToggleTodo { id, .. }
            | TodoRequest::UpdateTodo { id, .. } => id,
            TodoRequest::ClearTodos | TodoRequest::ToggleAllTodos { .. } => self.intent().as_str(),
        }
    }

    /// Read the fields `intent` needs. `None` when any is missing or invalid.
    pub fn from_form(intent: ActionIntent, form: &FormData) -> Option<Self> {
        let id = form.get("id");
        match intent {
            ActionIntent::ClearTodos => {
                (id? == ActionIntent::ClearTodos.as_str()).then_some(TodoRequest::ClearTodos)
            }
            ActionIntent::CreateTodo => Some(TodoRequest::CreateTodo {
                id: id?.to_string(),
                title: form.get("title")?.to_string(),
                created_at: form.get("created-at")?.trim().parse().ok()?,
            }),
            ActionIntent::DeleteTodo => Some(TodoRequest::DeleteTodo { id: id?.to_string() }),
            ActionIntent::ToggleAllTodos => {
                if id? != ActionIntent::ToggleAllTodos.as_str() {
                    return None;
                }
                Some(TodoRequest::ToggleAllTodos {
                    complete: to_complete_value(form)?,
                })
            }
            ActionIntent::ToggleTodo => Some(TodoRequest::ToggleTodo {
                id: id?.to_string(),
                complete: to_complete_value(form)?,
            }),
            ActionIntent::UpdateTodo => Some(TodoRequest::UpdateTodo {
                id: id?.to_string(),
                title: form.get("title")?.to_string(),
            }),
        }
    }

    /// The form a client submits for this request
    pub fn to_form(&self) -> FormData {
        let form = FormData::new()
            .with("intent", self.intent().as_str())
            .with("id", self.subject_id());
        match self {
            TodoRequest::ClearTodos | TodoRequest::DeleteTodo { .. } => form,
            TodoRequest::CreateTodo { title, created_at, .. } => form
                .with("title", title.as_str())
                .with("created-at", created_at.to_string()),
            TodoRequest::ToggleAllTodos { complete } | TodoRequest::ToggleTodo { complete, .. } => {
                form.with("complete", complete.to_string())
            }
            TodoRequest::UpdateTodo { title, .. } => form.with("title", title.as_str()),
        }
    }
}

/// The request half of an in-flight operation.
///
/// A submission always knows its intent; `request` is `None` when the form
/// fields were malformed, which makes the reconciler skip the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    intent: ActionIntent,
    request: Option<TodoRequest>,
}

impl Submission {
    pub fn new(request: TodoRequest) -> Self {
        Self {
            intent: request.intent(),
            request: Some(request),
        }
    }

    pub fn malformed(intent: ActionIntent) -> Self {
        Self { intent, request: None }
    }

    /// Missing or unknown intents are contract violations and fail.
    pub fn from_form(form: &FormData) -> Result<Self, BoundaryError> {
        let intent: ActionIntent = form.get("intent").ok_or(BoundaryError::MissingIntent)?.parse()?;
        match TodoRequest::from_form(intent, form) {
            Some(request) => Ok(Self::new(request)),
            None => {
                tracing::debug!(%intent, "malformed form data, operation will be skipped");
                Ok(Self::malformed(intent))
            }
        }
    }

    pub fn intent(&self) -> ActionIntent {
        self.intent
    }

    pub fn request(&self) -> Option<&TodoRequest> {
        self.request.as_ref()
    }
}

impl From<TodoRequest> for Submission {
    fn from(request: TodoRequest) -> Self {
        Self::new(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_todo_from_form() {
        let form = FormData::parse("intent=createTodo&id=new-1&title=Walk+dog&created-at=1700");
        let submission = Submission::from_form(&form).unwrap();
        assert_eq!(submission.intent(), ActionIntent::CreateTodo);
        assert_eq!(
            submission.request(),
            Some(&TodoRequest::CreateTodo {
                id: "new-1".to_string(),
                title: "Walk dog".to_string(),
                created_at: 1700,
            })
        );
    }

    #[test]
    fn test_malformed_fields_keep_intent() {
        let cases = [
            "intent=createTodo&id=new-1&title=x&created-at=soon",
            "intent=createTodo&id=new-1&title=x",
            "intent=deleteTodo",
            "intent=toggleTodo&id=a&complete=yes",
            "intent=toggleAllTodos&id=other&complete=true",
            "intent=clearTodos&id=nope",
            "intent=updateTodo&id=a",
        ];
        for body in cases {
            let submission = Submission::from_form(&FormData::parse(body)).unwrap();
            assert!(submission.request().is_none(), "{body} should be malformed");
        }
    }

    #[test]
    fn test_missing_or_unknown_intent_fails() {
        let missing = Submission::from_form(&FormData::parse("id=a")).unwrap_err();
        assert!(matches!(missing, BoundaryError::MissingIntent));

        let unknown = Submission::from_form(&FormData::parse("intent=archive&id=a")).unwrap_err();
        assert!(matches!(unknown, BoundaryError::UnsupportedIntent(name) if name == "archive"));
    }

    #[test]
    fn test_bulk_subject_ids() {
        assert_eq!(TodoRequest::ClearTodos.subject_id(), "clearTodos");
        assert_eq!(TodoRequest::ToggleAllTodos { complete: true }.subject_id(), "toggleAllTodos");
    }

    #[test]
    fn test_to_form_is_accepted_by_from_form() {
        let requests = [
            TodoRequest::ClearTodos,
            TodoRequest::create_todo("new-2", "Read"),
            TodoRequest::DeleteTodo { id: "5".to_string() },
            TodoRequest::ToggleAllTodos { complete: false },
            TodoRequest::ToggleTodo { id: "5".to_string(), complete: true },
            TodoRequest::UpdateTodo { id: "5".to_string(), title: "a & b".to_string() },
        ];
        for request in requests {
            let body = request.to_form().encode();
            let parsed = Submission::from_form(&FormData::parse(&body)).unwrap();
            assert_eq!(parsed.request(), Some(&request));
        }
    }
}
