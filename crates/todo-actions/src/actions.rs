//! Todo Actions
//!
//! Form-driven mutations and the confirmed-list loader. Validation failures
//! a user can fix come back as `ActionResult::Error`; everything else is an
//! `ActionError`.

use thiserror::Error;
use tobe_todos::form::to_complete_value;
use tobe_todos::{validate_new_id, ActionIntent, ActionResult, BoundaryError, FormData, TodoView};

use crate::domain::{DomainError, TodoId};
use crate::repository::TodoRepository;

const DEMO_TITLE_ERROR: &str = "Todos cannot include the word \"error\"";
const TITLE_REQUIRED: &str = "Title required";

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Invalid Form Data: {0}")]
    InvalidFormData(String),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

fn required<'f>(form: &'f FormData, name: &str) -> Result<&'f str, ActionError> {
    form.get(name)
        .ok_or_else(|| ActionError::InvalidFormData(format!("missing field `{name}`")))
}

fn required_complete(form: &FormData) -> Result<bool, ActionError> {
    to_complete_value(form).ok_or_else(|| ActionError::InvalidFormData("`complete` must be true or false".to_string()))
}

/// First message a title would be rejected with
fn title_error(title: &str) -> Option<&'static str> {
    if title.contains("error") {
        Some(DEMO_TITLE_ERROR)
    } else if title.trim().is_empty() {
        Some(TITLE_REQUIRED)
    } else {
        None
    }
}

/// Durable id named by a form. Anything else (e.g. a temporary id that
/// never got confirmed) matches no stored todo.
fn parse_todo_id(id: &str) -> Option<TodoId> {
    id.parse().ok()
}

/// Run the action named by the form's `intent` for `user_id`
pub async fn perform_action<R>(repo: &R, user_id: &str, form: &FormData) -> Result<ActionResult, ActionError>
where
    R: TodoRepository + ?Sized,
{
    let intent: ActionIntent = form.get("intent").ok_or(BoundaryError::MissingIntent)?.parse()?;

    let result = match intent {
        ActionIntent::ClearTodos => {
            let removed = repo.delete_complete(user_id).await?;
            tracing::info!(user_id, removed, "cleared complete todos");
            ActionResult::success(intent, intent.as_str())
        }
        ActionIntent::CreateTodo => {
            let id = required(form, "id")?;
            let title = required(form, "title")?;
            if let Some(message) = validate_new_id(id) {
                return Err(ActionError::InvalidFormData(message.to_string()));
            }
            if let Some(message) = title_error(title) {
                return Ok(ActionResult::error(intent, id, message));
            }

            let todo = repo.insert(user_id, title).await?;
            tracing::info!(user_id, new_id = id, id = %todo.id, "created todo");
            ActionResult::success(intent, id)
        }
        ActionIntent::DeleteTodo => {
            let id = required(form, "id")?;
            let removed = match parse_todo_id(id) {
                Some(todo_id) => repo.delete(user_id, todo_id).await?,
                None => 0,
            };
            tracing::info!(user_id, id, removed, "deleted todo");
            ActionResult::success(intent, id)
        }
        ActionIntent::ToggleAllTodos => {
            let complete = required_complete(form)?;
            let updated = repo.set_all_complete(user_id, complete).await?;
            tracing::info!(user_id, complete, updated, "toggled all todos");
            ActionResult::success(intent, intent.as_str())
        }
        ActionIntent::ToggleTodo => {
            let id = required(form, "id")?;
            let complete = required_complete(form)?;
            let updated = match parse_todo_id(id) {
                Some(todo_id) => repo.set_complete(user_id, todo_id, complete).await?,
                None => 0,
            };
            tracing::info!(user_id, id, complete, updated, "toggled todo");
            ActionResult::success(intent, id)
        }
        ActionIntent::UpdateTodo => {
            let id = required(form, "id")?;
            let title = required(form, "title")?;
            if let Some(message) = title_error(title) {
                return Ok(ActionResult::error(intent, id, message));
            }

            let updated = match parse_todo_id(id) {
                Some(todo_id) => repo.set_title(user_id, todo_id, title).await?,
                None => 0,
            };
            tracing::info!(user_id, id, updated, "updated todo title");
            ActionResult::success(intent, id)
        }
    };

    Ok(result)
}

/// The user's confirmed todos
pub async fn load_todos<R>(repo: &R, user_id: &str) -> Result<Vec<TodoView>, ActionError>
where
    R: TodoRepository + ?Sized,
{
    let todos = repo.list(user_id).await?;
    Ok(todos.iter().map(|todo| todo.to_view()).collect())
}
