use async_trait::async_trait;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use svault_kernel::safe_nanoid;
use tracing::{debug, instrument};

use super::{SearchFilter, VaultStore, sort_newest_first};
use crate::error::VaultError;
use crate::model::{EntryPatch, NewEntry, VaultEntry, timestamp_now};

/// Process-local store. Each call holds the lock for one map operation only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<FxHashMap<String, VaultEntry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    #[instrument(skip_all, fields(owner_id = %entry.owner_id))]
    async fn create(&self, entry: NewEntry) -> Result<VaultEntry, VaultError> {
        entry.validate()?;
        let now = timestamp_now();

        let mut entries = self.entries.write();
        let mut id = safe_nanoid!();
        while entries.contains_key(&id) {
            id = safe_nanoid!();
        }
        let stored = entry.into_entry(id, now);
        entries.insert(stored.id.clone(), stored.clone());

        debug!(entry_id = %stored.id, "Vault entry stored");
        Ok(stored)
    }

    async fn get(&self, id: &str, owner_id: &str) -> Result<VaultEntry, VaultError> {
        self.entries
            .read()
            .get(id)
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .ok_or_else(VaultError::not_found)
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        patch: EntryPatch,
    ) -> Result<VaultEntry, VaultError> {
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(id)
            .filter(|e| e.owner_id == owner_id)
            .ok_or_else(VaultError::not_found)?;

        patch.apply(entry, timestamp_now());
        Ok(entry.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), VaultError> {
        let mut entries = self.entries.write();
        match entries.get(id) {
            Some(e) if e.owner_id == owner_id => {
                entries.remove(id);
                Ok(())
            },
            _ => Err(VaultError::not_found()),
        }
    }

    async fn list(
        &self,
        owner_id: &str,
        search: Option<&SearchFilter>,
    ) -> Result<Vec<VaultEntry>, VaultError> {
        let mut found: Vec<VaultEntry> = self
            .entries
            .read()
            .values()
            .filter(|e| e.owner_id == owner_id)
            .filter(|e| search.is_none_or(|s| s.matches(e)))
            .cloned()
            .collect();

        sort_newest_first(&mut found);
        Ok(found)
    }
}
