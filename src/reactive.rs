//! Leptos Binding
//!
//! Recomputes the todos view whenever the confirmed list, the tracked
//! fetchers or the route filter change.

use std::sync::{Arc, Mutex, PoisonError};

use leptos::prelude::*;

use crate::error::ReconcileError;
use crate::fetcher::Fetcher;
use crate::models::TodoView;
use crate::project::TodosFilter;
use crate::store::{TodosStore, TodosView};

/// Memoized optimistic view. One store lives as long as the memo, so a
/// failed pass keeps the last good temporary ids.
pub fn use_to_be_todos(
    todos: Signal<Vec<TodoView>>,
    fetchers: Signal<Vec<Fetcher>>,
    filter: Signal<TodosFilter>,
) -> Memo<Result<TodosView, ReconcileError>> {
    let store = Arc::new(Mutex::new(TodosStore::new()));
    Memo::new(move |_| {
        let filter = filter.get();
        let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
        todos.with(|todos| fetchers.with(|fetchers| store.observe(todos, fetchers, filter)))
    })
}
