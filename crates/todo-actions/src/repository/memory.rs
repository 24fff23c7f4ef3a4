//! In-Memory Todo Repository
//!
//! Per-user todo lists behind a `tokio` mutex.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::TodoRepository;
use crate::domain::{DomainError, DomainResult, Entity, Todo, TodoId};

#[derive(Default)]
struct State {
    next_id: u64,
    /// Last timestamp handed out, keeps `created_at` strictly increasing
    last_stamp: i64,
    lists: HashMap<String, Vec<Todo>>,
}

impl State {
    fn list_mut(&mut self, user_id: &str) -> DomainResult<&mut Vec<Todo>> {
        self.lists
            .get_mut(user_id)
            .ok_or_else(|| DomainError::NotFound(format!("todo list of user {user_id}")))
    }

    fn stamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }
}

fn check_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidInput("todo title is empty".to_string()));
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryTodoRepository {
    state: Mutex<State>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository with an empty list for each given user
    pub fn with_users<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lists = users.into_iter().map(|user| (user.into(), Vec::new())).collect();
        Self {
            state: Mutex::new(State {
                lists,
                ..State::default()
            }),
        }
    }

    /// Create an empty list for the user. Fails if one already exists.
    pub async fn add_user(&self, user_id: &str) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state.lists.contains_key(user_id) {
            return Err(DomainError::Conflict(format!("user {user_id} already exists")));
        }
        state.lists.insert(user_id.to_string(), Vec::new());
        Ok(())
    }

    /// Apply `change` to the user's todos that match `select`
    async fn update_where(
        &self,
        user_id: &str,
        select: impl Fn(&Todo) -> bool + Send,
        change: impl Fn(&mut Todo) + Send,
    ) -> DomainResult<usize> {
        let mut state = self.state.lock().await;
        let stamp = state.stamp();
        let list = state.list_mut(user_id)?;

        let mut count = 0;
        for todo in list.iter_mut().filter(|todo| select(todo)) {
            change(todo);
            todo.updated_at = stamp;
            count += 1;
        }
        Ok(count)
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list(&self, user_id: &str) -> DomainResult<Vec<Todo>> {
        let mut state = self.state.lock().await;
        Ok(state.list_mut(user_id)?.clone())
    }

    async fn insert(&self, user_id: &str, title: &str) -> DomainResult<Todo> {
        check_title(title)?;
        let mut state = self.state.lock().await;
        state.list_mut(user_id)?;

        state.next_id = state
            .next_id
            .checked_add(1)
            .ok_or_else(|| DomainError::Internal("todo id space exhausted".to_string()))?;
        let id = TodoId(state.next_id);
        let stamp = state.stamp();
        let todo = Todo::new(id, user_id, title, stamp);
        state.list_mut(user_id)?.push(todo.clone());
        Ok(todo)
    }

    async fn delete(&self, user_id: &str, id: TodoId) -> DomainResult<usize> {
        let mut state = self.state.lock().await;
        let list = state.list_mut(user_id)?;
        let before = list.len();
        list.retain(|todo| todo.id() != id);
        Ok(before - list.len())
    }

    async fn delete_complete(&self, user_id: &str) -> DomainResult<usize> {
        let mut state = self.state.lock().await;
        let list = state.list_mut(user_id)?;
        let before = list.len();
        list.retain(|todo| !todo.complete);
        Ok(before - list.len())
    }

    async fn set_all_complete(&self, user_id: &str, complete: bool) -> DomainResult<usize> {
        self.update_where(user_id, |_| true, |todo| todo.complete = complete).await
    }

    async fn set_complete(&self, user_id: &str, id: TodoId, complete: bool) -> DomainResult<usize> {
        self.update_where(user_id, |todo| todo.id() == id, |todo| todo.complete = complete)
            .await
    }

    async fn set_title(&self, user_id: &str, id: TodoId, title: &str) -> DomainResult<usize> {
        check_title(title)?;
        self.update_where(user_id, |todo| todo.id() == id, |todo| todo.title = title.to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exhausted_id_space_is_internal() {
        let repo = InMemoryTodoRepository::with_users(["alice"]);
        repo.state.lock().await.next_id = u64::MAX - 1;

        let last = repo.insert("alice", "Last").await.unwrap();
        assert_eq!(last.id, TodoId(u64::MAX));

        let err = repo.insert("alice", "One too many").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(repo.list("alice").await.unwrap().len(), 1);
    }
}
