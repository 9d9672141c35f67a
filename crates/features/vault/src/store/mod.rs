//! Owner-scoped persistence for vault entries.
//!
//! Every operation takes the owner id next to the entry id. An entry owned by someone else
//! is reported exactly like a missing one.

mod memory;
#[cfg(feature = "server")]
mod surreal;

pub use memory::MemoryStore;
#[cfg(feature = "server")]
pub use surreal::{MIGRATIONS, SurrealStore};

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::VaultError;
use crate::model::{EntryPatch, NewEntry, VaultEntry};

#[async_trait]
pub trait VaultStore: Debug + Send + Sync {
    /// Assigns id and timestamps and persists the entry.
    async fn create(&self, entry: NewEntry) -> Result<VaultEntry, VaultError>;

    async fn get(&self, id: &str, owner_id: &str) -> Result<VaultEntry, VaultError>;

    /// Merges `patch` into the owner's entry and refreshes `updated_at`. Last write wins.
    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        patch: EntryPatch,
    ) -> Result<VaultEntry, VaultError>;

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), VaultError>;

    /// The owner's entries, newest first, optionally narrowed by `search`.
    async fn list(
        &self,
        owner_id: &str,
        search: Option<&SearchFilter>,
    ) -> Result<Vec<VaultEntry>, VaultError>;
}

/// A literal, case-insensitive substring filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    term: String,
    include_username: bool,
}

impl SearchFilter {
    /// Returns `None` for a blank term, which means "no filter".
    #[must_use]
    pub fn new(term: &str, include_username: bool) -> Option<Self> {
        let term = term.trim();
        (!term.is_empty()).then(|| Self { term: term.to_lowercase(), include_username })
    }

    /// The trimmed, lower-cased term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub const fn include_username(&self) -> bool {
        self.include_username
    }

    #[must_use]
    pub fn matches(&self, entry: &VaultEntry) -> bool {
        entry.title.to_lowercase().contains(&self.term)
            || (self.include_username && entry.username.to_lowercase().contains(&self.term))
    }
}

/// `created_at` descending, then `id` descending.
pub(crate) fn sort_newest_first(entries: &mut [VaultEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntryFields;
    use chrono::{TimeDelta, Utc};

    fn entry(id: &str, title: &str, username: &str, age_secs: i64) -> VaultEntry {
        let mut entry = NewEntry::from_fields(
            "o",
            EntryFields {
                title: Some(title.to_owned()),
                password: Some("p".to_owned()),
                username: Some(username.to_owned()),
                ..EntryFields::default()
            },
        )
        .unwrap()
        .into_entry(id.to_owned(), Utc::now());
        entry.created_at -= TimeDelta::seconds(age_secs);
        entry
    }

    #[test]
    fn blank_terms_mean_no_filter() {
        assert!(SearchFilter::new("", true).is_none());
        assert!(SearchFilter::new(" \t ", true).is_none());
        assert_eq!(SearchFilter::new("  GMail ", false).unwrap().term(), "gmail");
    }

    #[test]
    fn username_matching_is_optional() {
        let e = entry("a", "Bank", "gmail-user", 0);

        assert!(SearchFilter::new("gmail", true).unwrap().matches(&e));
        assert!(!SearchFilter::new("gmail", false).unwrap().matches(&e));
    }

    #[test]
    fn metacharacters_match_literally() {
        let e = entry("a", "a.b (work)", "", 0);

        assert!(SearchFilter::new("(work)", false).unwrap().matches(&e));
        assert!(!SearchFilter::new("a.*", false).unwrap().matches(&e));
    }

    #[test]
    fn ordering_is_newest_first_with_id_tiebreak() {
        let mut entries = vec![entry("a", "old", "", 60), entry("b", "new", "", 0), entry("c", "new", "", 0)];
        let now = entries[1].created_at;
        entries[2].created_at = now;

        sort_newest_first(&mut entries);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}
