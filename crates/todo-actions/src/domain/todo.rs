//! Todo Entity
//!
//! A persisted todo owned by one user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tobe_todos::TodoView;

use super::entity::Entity;

/// Durable todo id. Rendered as a plain decimal so it can never be
/// mistaken for a client-side temporary id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub u64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(TodoId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: String,
    pub title: String,
    pub complete: bool,
    /// Unix milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl Todo {
    pub fn new(id: TodoId, user_id: impl Into<String>, title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            title: title.into(),
            complete: false,
            created_at,
            updated_at: created_at,
        }
    }

    /// The client-facing projection
    pub fn to_view(&self) -> TodoView {
        TodoView::new(self.id.to_string(), self.title.as_str(), self.complete, self.created_at)
    }
}

impl Entity for Todo {
    type Id = TodoId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
