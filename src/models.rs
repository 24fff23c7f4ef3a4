//! Frontend Models
//!
//! Data structures exchanged with the todo actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BoundaryError;

/// Todo record as rendered (matches backend view)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    /// Durable id, or a temporary `new-<n>` id while the creation is in flight
    pub id: String,
    pub title: String,
    pub complete: bool,
    /// Milliseconds since the epoch
    pub created_at: i64,
}

impl TodoView {
    pub fn new(id: impl Into<String>, title: impl Into<String>, complete: bool, created_at: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            complete,
            created_at,
        }
    }
}

/// The six mutations a todo list accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionIntent {
    ClearTodos,
    CreateTodo,
    DeleteTodo,
    ToggleAllTodos,
    ToggleTodo,
    UpdateTodo,
}

impl ActionIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionIntent::ClearTodos => "clearTodos",
            ActionIntent::CreateTodo => "createTodo",
            ActionIntent::DeleteTodo => "deleteTodo",
            ActionIntent::ToggleAllTodos => "toggleAllTodos",
            ActionIntent::ToggleTodo => "toggleTodo",
            ActionIntent::UpdateTodo => "updateTodo",
        }
    }
}

impl fmt::Display for ActionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionIntent {
    type Err = BoundaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clearTodos" => Ok(ActionIntent::ClearTodos),
            "createTodo" => Ok(ActionIntent::CreateTodo),
            "deleteTodo" => Ok(ActionIntent::DeleteTodo),
            "toggleAllTodos" => Ok(ActionIntent::ToggleAllTodos),
            "toggleTodo" => Ok(ActionIntent::ToggleTodo),
            "updateTodo" => Ok(ActionIntent::UpdateTodo),
            other => Err(BoundaryError::UnsupportedIntent(other.to_string())),
        }
    }
}

/// Tagged result returned by every todo action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionResult {
    Success {
        intent: ActionIntent,
        id: String,
    },
    Error {
        intent: ActionIntent,
        id: String,
        message: String,
    },
}

impl ActionResult {
    pub fn success(intent: ActionIntent, id: impl Into<String>) -> Self {
        ActionResult::Success { intent, id: id.into() }
    }

    pub fn error(intent: ActionIntent, id: impl Into<String>, message: impl Into<String>) -> Self {
        ActionResult::Error {
            intent,
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn intent(&self) -> ActionIntent {
        match self {
            ActionResult::Success { intent, .. } | ActionResult::Error { intent, .. } => *intent,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ActionResult::Success { id, .. } | ActionResult::Error { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_round_trips_through_str() {
        for intent in [
            ActionIntent::ClearTodos,
            ActionIntent::CreateTodo,
            ActionIntent::DeleteTodo,
            ActionIntent::ToggleAllTodos,
            ActionIntent::ToggleTodo,
            ActionIntent::UpdateTodo,
        ] {
            assert_eq!(intent.as_str().parse::<ActionIntent>().unwrap(), intent);
        }
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        let err = "archiveTodo".parse::<ActionIntent>().unwrap_err();
        assert!(matches!(err, BoundaryError::UnsupportedIntent(name) if name == "archiveTodo"));
    }

    #[test]
    fn test_action_result_wire_shape() {
        let json = r#"{"type":"error","intent":"updateTodo","id":"7","message":"Title required"}"#;
        let result: ActionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result, ActionResult::error(ActionIntent::UpdateTodo, "7", "Title required"));
        assert_eq!(result.intent(), ActionIntent::UpdateTodo);
        assert_eq!(result.id(), "7");
        assert!(!result.is_success());

        let encoded = serde_json::to_string(&ActionResult::success(ActionIntent::ClearTodos, "clearTodos")).unwrap();
        assert_eq!(encoded, r#"{"type":"success","intent":"clearTodos","id":"clearTodos"}"#);
    }

    #[test]
    fn test_todo_view_uses_camel_case() {
        let todo = TodoView::new("a", "x", false, 100);
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["createdAt"], 100);
    }
}
