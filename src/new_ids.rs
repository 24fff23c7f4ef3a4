//! Temporary Todo IDs
//!
//! Optimistic creations render under a `new-<n>` id until the server
//! confirms them. The carried list (and its allocation counter) is plain data
//! handed from one reconciliation pass to the next.

use serde::Serialize;

use crate::error::ReconcileError;

pub const NEW_ID_PREFIX: &str = "new-";

fn new_id_seq(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(NEW_ID_PREFIX)?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn format_new_id(seq: u64) -> String {
    format!("{NEW_ID_PREFIX}{seq}")
}

/// Whether `id` belongs to the temporary id space
pub fn is_new_id(id: &str) -> bool {
    new_id_seq(id).is_some()
}

/// Validation message for ids that a create action must reject
pub fn validate_new_id(id: &str) -> Option<&'static str> {
    if is_new_id(id) {
        None
    } else {
        Some("Invalid new todo id")
    }
}

/// Active temporary ids, oldest first. The last entry is the id the
/// new-todo input is currently bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIds {
    /// Never empty: `new` seeds one id, `TryFrom` rejects an empty list and
    /// `advance` allocates whenever filtering would leave it empty.
    ids: Vec<String>,
    next_seq: u64,
}

impl NewIds {
    pub fn new() -> Self {
        Self {
            ids: vec![format_new_id(1)],
            next_seq: 2,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// The id waiting for the next new todo title
    pub fn current(&self) -> &str {
        &self.ids[self.ids.len() - 1]
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Next carried value: spent (`done`) ids are dropped and a fresh id is
    /// appended when the current one has been used.
    pub(crate) fn advance(&self, done: &[String], current_used: bool) -> Result<NewIds, ReconcileError> {
        let mut next = NewIds {
            ids: self.ids.iter().filter(|id| !done.contains(id)).cloned().collect(),
            next_seq: self.next_seq,
        };
        if current_used || next.ids.is_empty() {
            let seq = next.next_seq;
            next.next_seq = seq.checked_add(1).ok_or(ReconcileError::NewIdsExhausted)?;
            next.ids.push(format_new_id(seq));
        }
        Ok(next)
    }
}

impl Default for NewIds {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<String>> for NewIds {
    type Error = ReconcileError;

    /// Rebuild a carried list; allocation resumes after the highest suffix.
    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        let mut max_seq = 0;
        for id in &ids {
            let seq = new_id_seq(id).ok_or_else(|| ReconcileError::NotANewId(id.clone()))?;
            max_seq = max_seq.max(seq);
        }
        if ids.is_empty() {
            return Err(ReconcileError::EmptyNewIds);
        }
        let next_seq = max_seq.checked_add(1).ok_or(ReconcileError::NewIdsExhausted)?;
        Ok(Self { ids, next_seq })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_recognition() {
        assert!(is_new_id("new-1"));
        assert!(is_new_id("new-42"));
        assert!(!is_new_id("new-"));
        assert!(!is_new_id("new-0"));
        assert!(!is_new_id("new-01"));
        assert!(!is_new_id("new-+1"));
        assert!(!is_new_id("42"));
        assert!(!is_new_id("clearTodos"));
    }

    #[test]
    fn test_validate_new_id() {
        assert_eq!(validate_new_id("new-3"), None);
        assert_eq!(validate_new_id("3"), Some("Invalid new todo id"));
    }

    #[test]
    fn test_initial_ids() {
        let ids = NewIds::new();
        assert_eq!(ids.ids(), ["new-1"]);
        assert_eq!(ids.current(), "new-1");
    }

    #[test]
    fn test_advance_allocates_when_current_used() {
        let ids = NewIds::new();
        let next = ids.advance(&[], true).unwrap();
        assert_eq!(next.ids(), ["new-1", "new-2"]);
        assert_eq!(next.current(), "new-2");

        let unchanged = next.advance(&[], false).unwrap();
        assert_eq!(unchanged, next);
    }

    #[test]
    fn test_advance_retires_done_ids_without_reuse() {
        let ids = NewIds::try_from(vec!["new-1".to_string(), "new-2".to_string()]).unwrap();
        let next = ids.advance(&["new-2".to_string()], true).unwrap();
        assert_eq!(next.ids(), ["new-1", "new-3"]);

        let next = next.advance(&["new-1".to_string(), "new-3".to_string()], true).unwrap();
        assert_eq!(next.ids(), ["new-4"]);
    }

    #[test]
    fn test_try_from_rejects_bad_lists() {
        assert_eq!(NewIds::try_from(Vec::new()), Err(ReconcileError::EmptyNewIds));
        assert_eq!(
            NewIds::try_from(vec!["new-1".to_string(), "17".to_string()]),
            Err(ReconcileError::NotANewId("17".to_string()))
        );
    }

    #[test]
    fn test_try_from_resumes_after_highest_suffix() {
        let ids = NewIds::try_from(vec!["new-9".to_string(), "new-4".to_string()]).unwrap();
        assert_eq!(ids.current(), "new-4");
        assert_eq!(ids.advance(&[], true).unwrap().current(), "new-10");
    }

    #[test]
    fn test_highest_suffix_cannot_resume() {
        let last = format!("new-{}", u64::MAX);
        assert!(is_new_id(&last));
        assert_eq!(NewIds::try_from(vec![last]), Err(ReconcileError::NewIdsExhausted));
    }

    #[test]
    fn test_advance_stops_at_exhaustion() {
        let ids = NewIds::try_from(vec![format!("new-{}", u64::MAX - 1)]).unwrap();
        assert_eq!(ids.advance(&[], true), Err(ReconcileError::NewIdsExhausted));
        // nothing to allocate, nothing to fail
        assert_eq!(ids.advance(&[], false).unwrap(), ids);
    }

    #[test]
    fn test_advance_never_leaves_list_empty() {
        let ids = NewIds::new();
        let next = ids.advance(&["new-1".to_string()], false).unwrap();
        assert_eq!(next.ids(), ["new-2"]);
        assert_eq!(next.current(), "new-2");
    }
}
