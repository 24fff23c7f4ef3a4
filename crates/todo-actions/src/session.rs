//! Optimistic Session
//!
//! One client page driven against a repository. Submitted forms become
//! fetchers, the repository answers them, and reloading the confirmed list
//! settles every answered fetcher. `view` renders the optimistic state at any
//! point in between.
//!
//! Each form owns one fetcher: resubmitting a form (same intent and subject
//! id) replaces whatever was tracked for it. A settled success is reported
//! to one `view` and then dropped; a settled error stays until its form is
//! resubmitted.

use std::sync::Arc;

use thiserror::Error;
use tobe_todos::{
    ActionResult, BoundaryError, Fetcher, FetcherState, FormData, ReconcileError, TodoRequest, TodoView, TodosFilter,
    TodosStore, TodosView,
};

use crate::actions::{load_todos, perform_action, ActionError};
use crate::repository::TodoRepository;

/// Handle of a tracked fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetcherKey(u64);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no fetcher tracked under {0:?}")]
    UnknownFetcher(FetcherKey),

    #[error("fetcher {key:?} is {actual:?}, expected {expected:?}")]
    UnexpectedState {
        key: FetcherKey,
        actual: FetcherState,
        expected: FetcherState,
    },

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

struct Tracked {
    key: FetcherKey,
    /// The form as submitted, replayed against the repository on respond
    form: FormData,
    fetcher: Fetcher,
    /// Already seen by a `view` while idle
    reported: bool,
}

impl Tracked {
    fn is_same_form(&self, form: &FormData) -> bool {
        self.form.get("intent") == form.get("intent") && self.form.get("id") == form.get("id")
    }

    fn is_reported_success(&self) -> bool {
        self.reported
            && self.fetcher.state == FetcherState::Idle
            && self.fetcher.data.as_ref().is_some_and(ActionResult::is_success)
    }
}

pub struct OptimisticSession<R: ?Sized> {
    repo: Arc<R>,
    user_id: String,
    confirmed: Vec<TodoView>,
    tracked: Vec<Tracked>,
    next_key: u64,
    store: TodosStore,
    filter: TodosFilter,
}

impl<R> OptimisticSession<R>
where
    R: TodoRepository + ?Sized,
{
    /// Load the user's confirmed todos and start with no fetchers
    pub async fn open(repo: Arc<R>, user_id: impl Into<String>) -> Result<Self, SessionError> {
        let user_id = user_id.into();
        let confirmed = load_todos(repo.as_ref(), &user_id).await?;
        tracing::debug!(%user_id, todos = confirmed.len(), "session opened");

        Ok(Self {
            repo,
            user_id,
            confirmed,
            tracked: Vec::new(),
            next_key: 0,
            store: TodosStore::new(),
            filter: TodosFilter::default(),
        })
    }

    pub fn confirmed(&self) -> &[TodoView] {
        &self.confirmed
    }

    pub fn set_filter(&mut self, filter: TodosFilter) {
        self.filter = filter;
    }

    pub fn fetcher(&self, key: FetcherKey) -> Option<&Fetcher> {
        self.tracked.iter().find(|t| t.key == key).map(|t| &t.fetcher)
    }

    /// Fetchers in submission order
    pub fn fetchers(&self) -> impl Iterator<Item = &Fetcher> {
        self.tracked.iter().map(|t| &t.fetcher)
    }

    fn track(&mut self, form: FormData, fetcher: Fetcher) -> FetcherKey {
        if let Some(position) = self.tracked.iter().position(|t| t.is_same_form(&form)) {
            let replaced = self.tracked.remove(position);
            tracing::debug!(key = ?replaced.key, state = ?replaced.fetcher.state, "form resubmitted, replacing fetcher");
        }

        self.next_key += 1;
        let key = FetcherKey(self.next_key);
        self.tracked.push(Tracked {
            key,
            form,
            fetcher,
            reported: false,
        });
        key
    }

    fn tracked_mut(&mut self, key: FetcherKey) -> Result<&mut Tracked, SessionError> {
        self.tracked
            .iter_mut()
            .find(|t| t.key == key)
            .ok_or(SessionError::UnknownFetcher(key))
    }

    pub fn submit(&mut self, request: TodoRequest) -> FetcherKey {
        let form = request.to_form();
        self.track(form, Fetcher::submitting(request))
    }

    /// Submit a raw urlencoded body, as a browser form would
    pub fn submit_form(&mut self, body: &str) -> Result<FetcherKey, SessionError> {
        let fetcher = Fetcher::from_wire(FetcherState::Submitting, Some(body), None)?;
        Ok(self.track(FormData::parse(body), fetcher))
    }

    /// Submit a new todo titled `title` under the id the input is shown for
    pub fn create(&mut self, title: &str) -> Result<FetcherKey, SessionError> {
        let id = self.view()?.show_new_id;
        Ok(self.submit(TodoRequest::create_todo(id, title)))
    }

    /// Let the repository answer a submitting fetcher. A failed action
    /// drops the fetcher.
    pub async fn respond(&mut self, key: FetcherKey) -> Result<ActionResult, SessionError> {
        let tracked = self.tracked_mut(key)?;
        if tracked.fetcher.state != FetcherState::Submitting {
            return Err(SessionError::UnexpectedState {
                key,
                actual: tracked.fetcher.state,
                expected: FetcherState::Submitting,
            });
        }
        let form = tracked.form.clone();

        match perform_action(self.repo.as_ref(), &self.user_id, &form).await {
            Ok(data) => {
                let tracked = self.tracked_mut(key)?;
                tracked.fetcher.state = FetcherState::Loading;
                tracked.fetcher.data = Some(data.clone());
                Ok(data)
            }
            Err(err) => {
                tracing::warn!(?key, error = %err, "action failed, dropping fetcher");
                self.retire(key);
                Err(err.into())
            }
        }
    }

    /// Reload the confirmed todos; every answered fetcher becomes idle
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        self.confirmed = load_todos(self.repo.as_ref(), &self.user_id).await?;
        for tracked in &mut self.tracked {
            if tracked.fetcher.state != FetcherState::Loading {
                continue;
            }
            if let Some(data) = tracked.fetcher.data.take() {
                tracked.fetcher = Fetcher::idle(data);
            }
        }
        Ok(())
    }

    /// Submit, answer and reload in one go
    pub async fn run(&mut self, request: TodoRequest) -> Result<ActionResult, SessionError> {
        let key = self.submit(request);
        let data = self.respond(key).await?;
        self.reload().await?;
        Ok(data)
    }

    /// Stop tracking a fetcher, as when its form unmounts
    pub fn retire(&mut self, key: FetcherKey) -> Option<Fetcher> {
        let position = self.tracked.iter().position(|t| t.key == key)?;
        Some(self.tracked.remove(position).fetcher)
    }

    /// Render the optimistic state for the current filter
    pub fn view(&mut self) -> Result<TodosView, SessionError> {
        self.tracked.retain(|t| !t.is_reported_success());

        let fetchers = self.tracked.iter().map(|t| &t.fetcher);
        let view = self.store.observe(&self.confirmed, fetchers, self.filter)?;

        for tracked in &mut self.tracked {
            if tracked.fetcher.state == FetcherState::Idle {
                tracked.reported = true;
            }
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryTodoRepository;
    use tobe_todos::ActionIntent;

    async fn setup_session() -> OptimisticSession<InMemoryTodoRepository> {
        let repo = Arc::new(InMemoryTodoRepository::with_users(["alice"]));
        OptimisticSession::open(repo, "alice").await.unwrap()
    }

    #[tokio::test]
    async fn test_respond_moves_to_loading() {
        let mut session = setup_session().await;
        let key = session.create("Walk the dog").unwrap();
        assert_eq!(session.fetcher(key).map(|f| f.state), Some(FetcherState::Submitting));

        let data = session.respond(key).await.unwrap();
        assert_eq!(data, ActionResult::success(ActionIntent::CreateTodo, "new-1"));
        let fetcher = session.fetcher(key).unwrap();
        assert_eq!(fetcher.state, FetcherState::Loading);
        assert!(fetcher.request().is_some());

        let err = session.respond(key).await.unwrap_err();
        assert!(matches!(err, SessionError::UnexpectedState { .. }));
    }

    #[tokio::test]
    async fn test_failed_action_drops_fetcher() {
        let mut session = setup_session().await;
        let key = session.submit_form("intent=toggleTodo&id=1&complete=maybe").unwrap();
        // malformed payload: tracked, but never applied optimistically
        let view = session.view().unwrap();
        assert!(view.projection.render_list.is_empty());

        let err = session.respond(key).await.unwrap_err();
        assert!(matches!(err, SessionError::Action(ActionError::InvalidFormData(_))));
        assert!(session.fetcher(key).is_none());
    }

    #[tokio::test]
    async fn test_unknown_intent_is_rejected_at_submit() {
        let mut session = setup_session().await;
        let err = session.submit_form("intent=archiveTodo&id=1").unwrap_err();
        assert!(matches!(err, SessionError::Boundary(BoundaryError::UnsupportedIntent(_))));
        assert_eq!(session.fetchers().count(), 0);
    }

    #[tokio::test]
    async fn test_resubmitted_form_replaces_fetcher() {
        let mut session = setup_session().await;
        let first = session.submit(TodoRequest::ToggleTodo {
            id: "1".to_string(),
            complete: true,
        });
        let other = session.submit(TodoRequest::ToggleTodo {
            id: "2".to_string(),
            complete: true,
        });
        let second = session.submit(TodoRequest::ToggleTodo {
            id: "1".to_string(),
            complete: false,
        });

        assert!(session.fetcher(first).is_none());
        assert!(session.fetcher(other).is_some());
        assert!(session.fetcher(second).is_some());
        assert_eq!(session.fetchers().count(), 2);
    }

    #[tokio::test]
    async fn test_settled_success_reported_once() {
        let mut session = setup_session().await;
        session.run(TodoRequest::ToggleAllTodos { complete: true }).await.unwrap();
        assert_eq!(session.fetchers().count(), 1);

        session.view().unwrap();
        assert_eq!(session.fetchers().count(), 1);
        session.view().unwrap();
        assert_eq!(session.fetchers().count(), 0);
    }

    #[tokio::test]
    async fn test_settled_error_stays_reported() {
        let mut session = setup_session().await;
        let key = session.create("").unwrap();
        session.respond(key).await.unwrap();
        session.reload().await.unwrap();

        for _ in 0..3 {
            let view = session.view().unwrap();
            assert_eq!(view.error_for("new-1"), Some("Title required"));
            assert_eq!(view.show_new_id, "new-1");
        }
    }

    #[tokio::test]
    async fn test_retire_unknown_key() {
        let mut session = setup_session().await;
        let key = session.submit(TodoRequest::ClearTodos);
        assert!(session.retire(key).is_some());
        assert!(session.retire(key).is_none());
        assert!(matches!(session.respond(key).await, Err(SessionError::UnknownFetcher(_))));
    }
}
