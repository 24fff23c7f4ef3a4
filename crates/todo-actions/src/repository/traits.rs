//! Repository Layer - Core Traits
//!
//! Every operation is scoped to one user. An unknown user fails with
//! `DomainError::NotFound`; an unknown todo id simply affects nothing.

use async_trait::async_trait;

use crate::domain::{DomainResult, Todo, TodoId};

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Todos of the user in insertion order
    async fn list(&self, user_id: &str) -> DomainResult<Vec<Todo>>;

    /// Store a new incomplete todo and assign its durable id
    async fn insert(&self, user_id: &str, title: &str) -> DomainResult<Todo>;

    /// Returns the number of removed todos
    async fn delete(&self, user_id: &str, id: TodoId) -> DomainResult<usize>;

    async fn delete_complete(&self, user_id: &str) -> DomainResult<usize>;

    async fn set_all_complete(&self, user_id: &str, complete: bool) -> DomainResult<usize>;

    async fn set_complete(&self, user_id: &str, id: TodoId, complete: bool) -> DomainResult<usize>;

    async fn set_title(&self, user_id: &str, id: TodoId, title: &str) -> DomainResult<usize>;
}
