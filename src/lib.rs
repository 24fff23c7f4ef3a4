//! To-be Todos
//!
//! Optimistic view of a todo list: the confirmed todos merged with every
//! mutation that is still in flight or has just settled.
//!
//! - `new_ids`: temporary ids for unconfirmed creations
//! - `form`, `request`, `fetcher`: typed operations built at the transport boundary
//! - `reconcile`: the per-observation working set
//! - `project`: counts, filtering and hidden ids for rendering
//! - `store`: carries the temporary ids between observations

pub mod error;
pub mod fetcher;
pub mod form;
pub mod models;
pub mod new_ids;
pub mod project;
#[cfg(feature = "leptos")]
pub mod reactive;
pub mod reconcile;
pub mod request;
pub mod store;


pub use error::{BoundaryError, ReconcileError};
pub use fetcher::{Fetcher, FetcherState};
pub use form::FormData;
pub use models::{ActionIntent, ActionResult, TodoView};
pub use new_ids::{is_new_id, validate_new_id, NewIds};
pub use project::{count_and_filter, project, TodosFilter, TodosProjection, ToggleAll};
pub use reconcile::{reconcile, ReconcileResult, ToBeTodos};
pub use request::{Submission, TodoRequest};
pub use store::{TodosStore, TodosView};
