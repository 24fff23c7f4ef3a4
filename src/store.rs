//! Todos Store
//!
//! Caller-side state between observations. The only thing that survives a
//! pass is the temporary id list, so that is all the store keeps.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ReconcileError;
use crate::fetcher::Fetcher;
use crate::models::TodoView;
use crate::new_ids::NewIds;
use crate::project::{project, TodosFilter, TodosProjection};
use crate::reconcile::reconcile;

/// Everything the todo page renders for one observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodosView {
    /// Error messages by todo id or temporary id
    pub errors: HashMap<String, String>,
    /// One new-todo input is mounted per temporary id
    pub new_ids: NewIds,
    /// The only new-todo input not hidden
    pub show_new_id: String,
    #[serde(flatten)]
    pub projection: TodosProjection,
}

impl TodosView {
    pub fn error_for(&self, id: &str) -> Option<&str> {
        self.errors.get(id).map(String::as_str)
    }
}

/// Carries the temporary ids from one observation to the next
#[derive(Debug, Clone, Default)]
pub struct TodosStore {
    new_ids: Option<NewIds>,
}

impl TodosStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume with ids carried from elsewhere (e.g. a previous page state)
    pub fn with_new_ids(new_ids: NewIds) -> Self {
        Self { new_ids: Some(new_ids) }
    }

    pub fn new_ids(&self) -> Option<&NewIds> {
        self.new_ids.as_ref()
    }

    /// Reconcile and project the current observation. The carried ids only
    /// advance when the pass succeeds.
    pub fn observe<'a>(
        &mut self,
        confirmed: &[TodoView],
        fetchers: impl IntoIterator<Item = &'a Fetcher>,
        filter: TodosFilter,
    ) -> Result<TodosView, ReconcileError> {
        let result = reconcile(confirmed, self.new_ids.clone(), fetchers)?;
        let mut visible = result.visible;
        let projection = project(result.render, &mut visible, filter);

        self.new_ids = Some(result.new_ids.clone());
        Ok(TodosView {
            errors: result.errors,
            new_ids: result.new_ids,
            show_new_id: result.show_new_id,
            projection,
        })
    }
}
