//! Optimistic ("to-be") Todos
//!
//! Rebuilds the todo list the user should see right now: the confirmed list
//! with every in-flight mutation applied on top of it.
//!
//! The working set is rebuilt from scratch on every observation. Only the
//! temporary id list ([`NewIds`]) is carried over, and the caller threads it
//! explicitly from one pass to the next.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::ReconcileError;
use crate::fetcher::{Fetcher, FetcherState};
use crate::models::{ActionIntent, ActionResult, TodoView};
use crate::new_ids::{is_new_id, NewIds};
use crate::request::TodoRequest;

// ========================
// Working Set
// ========================

/// `render` owns the records; `index` points into it by id and `visible`
/// holds the ids not hidden by a pending delete or clear.
struct Todos {
    index: HashMap<String, usize>,
    render: Vec<TodoView>,
    visible: HashSet<String>,
}

impl Todos {
    fn from_confirmed(confirmed: &[TodoView]) -> Self {
        let mut todos = Todos {
            index: HashMap::with_capacity(confirmed.len()),
            render: Vec::with_capacity(confirmed.len()),
            visible: HashSet::with_capacity(confirmed.len()),
        };
        for todo in confirmed {
            if todos.index.contains_key(&todo.id) {
                tracing::warn!(id = %todo.id, "duplicate id in confirmed todos, keeping the first");
                continue;
            }
            todos.push(todo.clone());
        }
        todos
    }

    fn push(&mut self, todo: TodoView) {
        self.index.insert(todo.id.clone(), self.render.len());
        self.visible.insert(todo.id.clone());
        self.render.push(todo);
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut TodoView> {
        let position = *self.index.get(id)?;
        self.render.get_mut(position)
    }

    /// Insert an optimistic record, or re-apply onto the one already there.
    fn upsert(&mut self, todo: TodoView) {
        match self.get_mut(&todo.id) {
            Some(existing) => {
                existing.title = todo.title;
                existing.complete = todo.complete;
                existing.created_at = todo.created_at;
                self.visible.insert(todo.id);
            }
            None => self.push(todo),
        }
    }
}

/// Temporary id bookkeeping for one pass
struct CreateTodoState {
    previous_ids: NewIds,
    done: Vec<String>,
    pending: Vec<String>,
    failed: Vec<String>,
}

impl CreateTodoState {
    fn is_used(&self, id: &str) -> bool {
        [&self.pending, &self.done, &self.failed]
            .iter()
            .any(|ids| ids.iter().any(|used| used == id))
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|known| known == id) {
        ids.push(id.to_string());
    }
}

// ========================
// Observation Kinds
// ========================

/// Create/update observations also distinguish done and failed outcomes
#[derive(Debug, PartialEq, Eq)]
enum Outcome<'a> {
    Pending(&'a str),
    Done(&'a str),
    Error { id: &'a str, message: &'a str },
}

/// Subject id of an observation that should be applied optimistically.
/// Submitting and successfully loading fetchers both count.
fn to_be_id(fetcher: &Fetcher) -> Option<&str> {
    match fetcher.state {
        FetcherState::Submitting => fetcher.request().map(TodoRequest::subject_id),
        FetcherState::Loading => match &fetcher.data {
            Some(ActionResult::Success { id, .. }) => Some(id.as_str()),
            _ => None,
        },
        FetcherState::Idle => None,
    }
}

fn to_be_outcome(fetcher: &Fetcher) -> Option<Outcome<'_>> {
    match (fetcher.state, &fetcher.data) {
        (FetcherState::Submitting, _) => fetcher.request().map(|r| Outcome::Pending(r.subject_id())),
        (_, Some(ActionResult::Error { id, message, .. })) => Some(Outcome::Error {
            id: id.as_str(),
            message: message.as_str(),
        }),
        (FetcherState::Loading, Some(ActionResult::Success { id, .. })) => Some(Outcome::Pending(id.as_str())),
        (FetcherState::Idle, Some(ActionResult::Success { id, .. })) => Some(Outcome::Done(id.as_str())),
        (_, None) => None,
    }
}

fn skip(fetcher: &Fetcher, intent: ActionIntent) {
    tracing::debug!(%intent, state = ?fetcher.state, "no usable request payload, skipping");
}

// ========================
// Reconciler
// ========================

/// Output of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Error messages by todo id (or temporary id)
    pub errors: HashMap<String, String>,
    /// Temporary-id records first, then newest first
    pub render: Vec<TodoView>,
    /// Records not hidden by an optimistic delete or clear
    pub visible: HashMap<String, TodoView>,
    /// Temporary ids to carry into the next pass
    pub new_ids: NewIds,
    /// Temporary id the new-todo input is shown for
    pub show_new_id: String,
}

/// Working set of a single pass. Feed every current fetcher through
/// [`ToBeTodos::add_fetcher`], then call [`ToBeTodos::build_result`].
pub struct ToBeTodos {
    errors: HashMap<String, String>,
    todos: Todos,
    create_todo: CreateTodoState,
}

impl ToBeTodos {
    /// Clone the confirmed todos into a fresh working set. Without carried
    /// ids the first temporary id is allocated.
    pub fn new(confirmed: &[TodoView], previous_ids: Option<NewIds>) -> Self {
        Self {
            errors: HashMap::new(),
            todos: Todos::from_confirmed(confirmed),
            create_todo: CreateTodoState {
                previous_ids: previous_ids.unwrap_or_default(),
                done: Vec::new(),
                pending: Vec::new(),
                failed: Vec::new(),
            },
        }
    }

    /// Apply one observation. Fails only on a request/response intent mismatch.
    pub fn add_fetcher(&mut self, fetcher: &Fetcher) -> Result<(), ReconcileError> {
        let Some(intent) = fetcher.intent()? else {
            return Ok(());
        };

        match intent {
            ActionIntent::ClearTodos => self.clear_todos(fetcher),
            ActionIntent::CreateTodo => self.create_todo(fetcher),
            ActionIntent::DeleteTodo => self.delete_todo(fetcher),
            ActionIntent::ToggleAllTodos => self.toggle_all_todos(fetcher),
            ActionIntent::ToggleTodo => self.toggle_todo(fetcher),
            ActionIntent::UpdateTodo => self.update_todo(fetcher),
        }
        Ok(())
    }

    /// Hide every visible complete todo
    fn clear_todos(&mut self, fetcher: &Fetcher) {
        if to_be_id(fetcher) != Some(ActionIntent::ClearTodos.as_str()) {
            return;
        }

        let Todos { index, render, visible } = &mut self.todos;
        visible.retain(|id| !index.get(id).is_some_and(|&position| render[position].complete));
    }

    fn create_todo(&mut self, fetcher: &Fetcher) {
        let Some(outcome) = to_be_outcome(fetcher) else {
            return;
        };

        match outcome {
            Outcome::Pending(id) => {
                let Some(TodoRequest::CreateTodo { title, created_at, .. }) = fetcher.request() else {
                    skip(fetcher, ActionIntent::CreateTodo);
                    return;
                };
                self.todos.upsert(TodoView::new(id, title.as_str(), false, *created_at));
                push_unique(&mut self.create_todo.pending, id);
            }
            Outcome::Done(id) => push_unique(&mut self.create_todo.done, id),
            Outcome::Error { id, message } => {
                self.errors.insert(id.to_string(), message.to_string());
                push_unique(&mut self.create_todo.failed, id);
            }
        }
    }

    /// Hide the todo; it leaves `render` once the confirmed list drops it
    fn delete_todo(&mut self, fetcher: &Fetcher) {
        if let Some(id) = to_be_id(fetcher) {
            self.todos.visible.remove(id);
        }
    }

    fn toggle_all_todos(&mut self, fetcher: &Fetcher) {
        if to_be_id(fetcher) != Some(ActionIntent::ToggleAllTodos.as_str()) {
            return;
        }
        let Some(&TodoRequest::ToggleAllTodos { complete }) = fetcher.request() else {
            skip(fetcher, ActionIntent::ToggleAllTodos);
            return;
        };

        let Todos { index, render, visible } = &mut self.todos;
        for id in visible.iter() {
            if let Some(&position) = index.get(id) {
                render[position].complete = complete;
            }
        }
    }

    fn toggle_todo(&mut self, fetcher: &Fetcher) {
        let Some(id) = to_be_id(fetcher) else {
            return;
        };
        let Some(&TodoRequest::ToggleTodo { complete, .. }) = fetcher.request() else {
            skip(fetcher, ActionIntent::ToggleTodo);
            return;
        };

        if let Some(todo) = self.todos.get_mut(id) {
            todo.complete = complete;
        }
    }

    fn update_todo(&mut self, fetcher: &Fetcher) {
        let Some(outcome) = to_be_outcome(fetcher) else {
            return;
        };

        match outcome {
            Outcome::Pending(id) => {
                let Some(TodoRequest::UpdateTodo { title, .. }) = fetcher.request() else {
                    skip(fetcher, ActionIntent::UpdateTodo);
                    return;
                };
                if let Some(todo) = self.todos.get_mut(id) {
                    todo.title = title.clone();
                }
            }
            Outcome::Done(_) => {}
            Outcome::Error { id, message } => {
                self.errors.insert(id.to_string(), message.to_string());
            }
        }
    }

    /// Advance the temporary ids, sort the render list and hand out the result
    pub fn build_result(self) -> Result<ReconcileResult, ReconcileError> {
        let ToBeTodos {
            errors,
            todos: Todos { mut render, visible, .. },
            create_todo,
        } = self;

        // Drop spent ids; bind the input to a fresh one once the current is in use
        let current_used = create_todo.is_used(create_todo.previous_ids.current());
        let new_ids = create_todo.previous_ids.advance(&create_todo.done, current_used)?;
        let show_new_id = create_todo
            .failed
            .first()
            .cloned()
            .unwrap_or_else(|| new_ids.current().to_string());

        render.sort_by(by_created_at_desc);

        let visible: HashMap<String, TodoView> = render
            .iter()
            .filter(|todo| visible.contains(&todo.id))
            .map(|todo| (todo.id.clone(), todo.clone()))
            .collect();

        tracing::debug!(
            render = render.len(),
            visible = visible.len(),
            errors = errors.len(),
            pending = create_todo.pending.len(),
            failed = create_todo.failed.len(),
            %show_new_id,
            "reconciled todos"
        );

        Ok(ReconcileResult {
            errors,
            render,
            visible,
            new_ids,
            show_new_id,
        })
    }
}

/// Optimistic creations first, then newer first
fn by_created_at_desc(a: &TodoView, b: &TodoView) -> Ordering {
    match (is_new_id(&a.id), is_new_id(&b.id)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.created_at.cmp(&a.created_at),
    }
}

/// Run a full pass over `fetchers` in the order given
pub fn reconcile<'a>(
    confirmed: &[TodoView],
    previous_ids: Option<NewIds>,
    fetchers: impl IntoIterator<Item = &'a Fetcher>,
) -> Result<ReconcileResult, ReconcileError> {
    let mut to_be = ToBeTodos::new(confirmed, previous_ids);
    for fetcher in fetchers {
        to_be.add_fetcher(fetcher)?;
    }
    to_be.build_result()
}
