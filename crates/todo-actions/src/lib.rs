//! Todo Actions
//!
//! Server side of the todo page, layered:
//! - domain: persisted todos and domain errors
//! - repository: data access trait plus an in-memory implementation
//! - actions: form-driven mutations and the confirmed-list loader
//! - session: a client page driven end to end against a repository

pub mod actions;
pub mod domain;
pub mod repository;
pub mod session;

pub use actions::{load_todos, perform_action, ActionError};
pub use domain::{DomainError, DomainResult, Todo, TodoId};
pub use repository::{InMemoryTodoRepository, TodoRepository};
pub use session::{FetcherKey, OptimisticSession, SessionError};
