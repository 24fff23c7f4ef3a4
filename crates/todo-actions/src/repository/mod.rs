//! Repository Layer
//!
//! Data access abstraction and the in-memory implementation.

mod memory;
mod traits;


pub use memory::InMemoryTodoRepository;
pub use traits::TodoRepository;
