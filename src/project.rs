//! Count and Filter
//!
//! Turns a reconciled working set into what the list and footer render.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::Serialize;

use crate::models::TodoView;

/// Keep-function applied to the render list
pub type KeepFn<'a> = &'a dyn Fn(&TodoView) -> bool;

/// Route filters of the todo list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TodosFilter {
    #[default]
    All,
    Active,
    Complete,
}

fn is_active(todo: &TodoView) -> bool {
    !todo.complete
}

fn is_complete(todo: &TodoView) -> bool {
    todo.complete
}

impl TodosFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodosFilter::All => "all",
            TodosFilter::Active => "active",
            TodosFilter::Complete => "complete",
        }
    }

    /// Filter named by the last path segment; anything unknown shows all
    pub fn from_route_leaf(pathname: &str) -> Self {
        let leaf = pathname.rsplit('/').next().unwrap_or_default();
        leaf.parse().unwrap_or_default()
    }

    /// `None` keeps every todo
    pub fn predicate(&self) -> Option<fn(&TodoView) -> bool> {
        match self {
            TodosFilter::All => None,
            TodosFilter::Active => Some(is_active),
            TodosFilter::Complete => Some(is_complete),
        }
    }
}

impl FromStr for TodosFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TodosFilter::All),
            "active" => Ok(TodosFilter::Active),
            "complete" => Ok(TodosFilter::Complete),
            _ => Err(()),
        }
    }
}

/// What the toggle-all control does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleAll {
    MarkAllComplete,
    MarkAllIncomplete,
    NoTodos,
}

impl ToggleAll {
    /// The `complete` value submitted with `toggleAllTodos`
    pub fn complete_value(&self) -> bool {
        !matches!(self, ToggleAll::MarkAllIncomplete)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ToggleAll::MarkAllComplete => "Mark all as complete",
            ToggleAll::MarkAllIncomplete => "Mark all as incomplete",
            ToggleAll::NoTodos => "",
        }
    }
}

/// Render payload for the list and its footer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodosProjection {
    /// Complete todos among the visible ones (before filtering)
    pub complete_count: usize,
    pub incomplete_count: usize,
    pub render_list: Vec<TodoView>,
    /// Ids to keep mounted but hidden
    pub hidden_ids: HashSet<String>,
    /// Nothing in `render_list` would actually show
    pub is_empty: bool,
}

impl TodosProjection {
    pub fn total(&self) -> usize {
        self.complete_count + self.incomplete_count
    }

    pub fn toggle_all(&self) -> ToggleAll {
        if self.incomplete_count > 0 {
            ToggleAll::MarkAllComplete
        } else if self.total() > 0 {
            ToggleAll::MarkAllIncomplete
        } else {
            ToggleAll::NoTodos
        }
    }

    pub fn items_left_label(&self) -> String {
        let noun = if self.incomplete_count == 1 { "item" } else { "items" };
        format!("{} {} left", self.incomplete_count, noun)
    }

    pub fn show_clear_completed(&self) -> bool {
        self.complete_count > 0
    }
}

/// Count the visible todos, then narrow `render` with `keep`.
///
/// Todos rejected by `keep` also leave `visible`. Todos kept but already
/// invisible stay in the list as hidden so they can animate out.
pub fn count_and_filter(
    render: Vec<TodoView>,
    visible: &mut HashMap<String, TodoView>,
    keep: Option<KeepFn<'_>>,
) -> TodosProjection {
    let complete_count = visible.values().filter(|todo| todo.complete).count();
    let incomplete_count = visible.len() - complete_count;

    let (render_list, hidden_ids) = match keep {
        None => {
            let hidden_ids = render
                .iter()
                .filter(|todo| !visible.contains_key(&todo.id))
                .map(|todo| todo.id.clone())
                .collect();
            (render, hidden_ids)
        }
        Some(keep) => {
            let mut hidden_ids = HashSet::new();
            let mut render_list = Vec::with_capacity(render.len());
            for todo in render {
                if keep(&todo) {
                    if !visible.contains_key(&todo.id) {
                        hidden_ids.insert(todo.id.clone());
                    }
                    render_list.push(todo);
                } else {
                    visible.remove(&todo.id);
                }
            }
            (render_list, hidden_ids)
        }
    };

    let is_empty = render_list.len() <= hidden_ids.len();

    TodosProjection {
        complete_count,
        incomplete_count,
        render_list,
        hidden_ids,
        is_empty,
    }
}

/// [`count_and_filter`] with one of the route filters
pub fn project(
    render: Vec<TodoView>,
    visible: &mut HashMap<String, TodoView>,
    filter: TodosFilter,
) -> TodosProjection {
    let predicate = filter.predicate();
    count_and_filter(render, visible, predicate.as_ref().map(|keep| keep as KeepFn<'_>))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_todo(id: &str, complete: bool) -> TodoView {
        TodoView::new(id, format!("Todo {}", id), complete, 0)
    }

    fn visible_of(todos: &[TodoView]) -> HashMap<String, TodoView> {
        todos.iter().map(|todo| (todo.id.clone(), todo.clone())).collect()
    }

    #[test]
    fn test_counts_ignore_hidden_todos() {
        let render = vec![make_todo("a", true), make_todo("b", false), make_todo("c", true)];
        let mut visible = visible_of(&render[..2]);

        let projection = count_and_filter(render, &mut visible, None);
        assert_eq!(projection.complete_count, 1);
        assert_eq!(projection.incomplete_count, 1);
        assert_eq!(projection.render_list.len(), 3);
        assert_eq!(projection.hidden_ids, HashSet::from(["c".to_string()]));
        assert!(!projection.is_empty);
    }

    #[test]
    fn test_filter_drops_and_hides() {
        let render = vec![make_todo("a", true), make_todo("b", false), make_todo("c", false)];
        let mut visible = visible_of(&render[..2]);
        let projection = project(render, &mut visible, TodosFilter::Active);
        let ids: Vec<_> = projection.render_list.iter().map(|todo| todo.id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(projection.hidden_ids, HashSet::from(["c".to_string()]));
        assert!(!visible.contains_key("a"));
        // counted before filtering
        assert_eq!(projection.complete_count, 1);
        assert_eq!(projection.incomplete_count, 1);
    }

    #[test]
    fn test_all_hidden_is_empty() {
        let render = vec![make_todo("a", false)];
        let mut visible = HashMap::new();
        let projection = count_and_filter(render, &mut visible, None);
        assert!(projection.is_empty);

        let projection = count_and_filter(Vec::new(), &mut HashMap::new(), None);
        assert!(projection.is_empty);
        assert_eq!(projection.toggle_all(), ToggleAll::NoTodos);
    }

    #[test]
    fn test_route_leaf_filters() {
        assert_eq!(TodosFilter::from_route_leaf("/todos/active"), TodosFilter::Active);
        assert_eq!(TodosFilter::from_route_leaf("/todos/complete"), TodosFilter::Complete);
        assert_eq!(TodosFilter::from_route_leaf("/todos"), TodosFilter::All);
        assert_eq!(TodosFilter::from_route_leaf(""), TodosFilter::All);
        assert!(TodosFilter::All.predicate().is_none());
    }

    #[test]
    fn test_footer_helpers() {
        let render = vec![make_todo("a", true), make_todo("b", false)];
        let mut visible = visible_of(&render);
        let projection = count_and_filter(render, &mut visible, None);
        assert_eq!(projection.items_left_label(), "1 item left");
        assert_eq!(projection.toggle_all(), ToggleAll::MarkAllComplete);
        assert!(projection.toggle_all().complete_value());
        assert!(projection.show_clear_completed());

        let render = vec![make_todo("a", true)];
        let mut visible = visible_of(&render);
        let projection = count_and_filter(render, &mut visible, None);
        assert_eq!(projection.items_left_label(), "0 items left");
        assert_eq!(projection.toggle_all(), ToggleAll::MarkAllIncomplete);
        assert!(!projection.toggle_all().complete_value());
    }
}
