//! todo-sim
//!
//! Plays a scripted optimistic session against the in-memory repository
//! and prints the rendered view after each step as JSON.
//!
//! Usage: `todo-sim [LOG_DIR]`. Verbosity follows `RUST_LOG`.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use todo_actions::{InMemoryTodoRepository, OptimisticSession};
use tobe_todos::{TodoRequest, TodosFilter};

const USER: &str = "demo";

fn print_view(step: &str, session: &mut OptimisticSession<InMemoryTodoRepository>) -> Result<(), Box<dyn Error>> {
    let view = session.view()?;
    println!("// {step}");
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn confirmed_id(session: &OptimisticSession<InMemoryTodoRepository>, title: &str) -> Option<String> {
    session
        .confirmed()
        .iter()
        .find(|todo| todo.title == title)
        .map(|todo| todo.id.clone())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let log_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("todo-sim"));
    let recent = rolling_logger::init_logger(&log_dir, "todo-sim")?;

    let repo = Arc::new(InMemoryTodoRepository::with_users([USER]));
    let mut session = OptimisticSession::open(repo, USER).await?;
    print_view("empty list", &mut session)?;

    // create: pending, answered, settled
    let milk = session.create("Buy milk")?;
    print_view("create submitted", &mut session)?;
    session.respond(milk).await?;
    session.reload().await?;
    print_view("create settled", &mut session)?;

    session.create("Write report")?;
    let rejected = session.create("this has an error")?;
    session.respond(rejected).await?;
    session.reload().await?;
    print_view("rejected create keeps its input", &mut session)?;

    let milk_id = confirmed_id(&session, "Buy milk").ok_or("confirmed list lost the created todo")?;
    let toggle = session.submit(TodoRequest::ToggleTodo {
        id: milk_id,
        complete: true,
    });
    print_view("toggle in flight", &mut session)?;
    session.respond(toggle).await?;
    session.reload().await?;

    session.set_filter(TodosFilter::Complete);
    print_view("complete filter", &mut session)?;
    session.set_filter(TodosFilter::All);

    session.submit(TodoRequest::ClearTodos);
    print_view("clear in flight", &mut session)?;

    tracing::info!(lines = recent.lines().len(), dir = %log_dir.display(), "simulation finished");
    Ok(())
}
