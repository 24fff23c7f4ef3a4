//! Domain Layer
//!
//! Server-side todo records and the errors data access can raise.

mod entity;
mod todo;

pub use entity::{DomainError, DomainResult, Entity};
pub use todo::{Todo, TodoId};
