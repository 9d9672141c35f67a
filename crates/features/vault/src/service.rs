use std::sync::Arc;
use svault_domain::constants::VAULT_TABLE;
use svault_kernel::security::ResourceGuard;
use tracing::{debug, info, instrument};

use crate::codec::FieldCodec;
use crate::error::VaultError;
use crate::model::{EntryFields, EntryPatch, NewEntry, VaultEntry};
use crate::store::{SearchFilter, VaultStore};

/// Owner-scoped vault operations.
///
/// Without a codec (the default) sensitive fields arrive encrypted and are stored and
/// returned untouched. With [`VaultService::with_codec`] the service encrypts them before
/// they reach the store and decrypts them for responses.
#[derive(Debug, Clone)]
pub struct VaultService {
    store: Arc<dyn VaultStore>,
    codec: Option<FieldCodec>,
    search_username: bool,
}

impl VaultService {
    #[must_use]
    pub fn new(store: Arc<dyn VaultStore>) -> Self {
        Self { store, codec: None, search_username: true }
    }

    /// Moves field encryption to the server.
    #[must_use]
    pub fn with_codec(mut self, codec: FieldCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Whether a search term is also matched against `username`.
    #[must_use]
    pub const fn search_username(mut self, enabled: bool) -> Self {
        self.search_username = enabled;
        self
    }

    #[must_use]
    pub const fn encrypts_on_server(&self) -> bool {
        self.codec.is_some()
    }

    /// # Errors
    /// * [`VaultError::Validation`] if `title` or `password` is missing.
    /// * [`VaultError::Cipher`] / storage errors otherwise.
    #[instrument(skip(self, fields))]
    pub async fn create_entry(&self, owner_id: &str, fields: EntryFields) -> Result<VaultEntry, VaultError> {
        let mut entry = NewEntry::from_fields(owner_id, fields)?;
        if let Some(codec) = &self.codec {
            let sealed = codec.encrypt_entry(
                owner_id,
                EntryFields {
                    username: Some(entry.username),
                    password: Some(entry.password),
                    notes: Some(entry.notes),
                    ..EntryFields::default()
                },
            )?;
            entry.username = sealed.username.unwrap_or_default();
            entry.password = sealed.password.unwrap_or_default();
            entry.notes = sealed.notes.unwrap_or_default();
        }

        let created = self.store.create(entry).await?;
        info!(entry_id = %created.id, "Vault entry created");
        self.reveal(created)
    }

    /// # Errors
    /// [`VaultError::NotFound`] if the entry is absent or owned by someone else.
    #[instrument(skip(self))]
    pub async fn get_entry(&self, owner_id: &str, id: &str) -> Result<VaultEntry, VaultError> {
        let key = entry_key(id)?;
        let entry = self.store.get(&key, owner_id).await?;
        self.reveal(entry)
    }

    /// Replaces the fields present in `fields` (see [`EntryPatch`]).
    ///
    /// # Errors
    /// [`VaultError::NotFound`] if the entry is absent or owned by someone else.
    #[instrument(skip(self, fields))]
    pub async fn update_entry(
        &self,
        owner_id: &str,
        id: &str,
        fields: EntryFields,
    ) -> Result<VaultEntry, VaultError> {
        let key = entry_key(id)?;
        let mut patch = EntryPatch::from_fields(fields);
        if let Some(codec) = &self.codec {
            patch = codec.encrypt_changes(owner_id, patch)?;
        }

        let updated = self.store.update(&key, owner_id, patch).await?;
        info!(entry_id = %updated.id, "Vault entry updated");
        self.reveal(updated)
    }

    /// # Errors
    /// [`VaultError::NotFound`] if the entry is absent or owned by someone else.
    #[instrument(skip(self))]
    pub async fn delete_entry(&self, owner_id: &str, id: &str) -> Result<(), VaultError> {
        let key = entry_key(id)?;
        self.store.delete(&key, owner_id).await?;
        info!(entry_id = %key, "Vault entry deleted");
        Ok(())
    }

    /// The owner's entries, newest first.
    ///
    /// A blank `search` lists everything. With server-side encryption the term is matched
    /// after decryption, so `username` matches what the user actually typed.
    ///
    /// # Errors
    /// Storage errors only.
    #[instrument(skip(self, search), fields(search = search.is_some()))]
    pub async fn list_entries(
        &self,
        owner_id: &str,
        search: Option<&str>,
    ) -> Result<Vec<VaultEntry>, VaultError> {
        let filter = search.and_then(|term| SearchFilter::new(term, self.search_username));

        let entries = match &self.codec {
            None => self.store.list(owner_id, filter.as_ref()).await?,
            Some(codec) => {
                let mut revealed = Vec::new();
                for entry in self.store.list(owner_id, None).await? {
                    let entry = codec.decrypt_entry(entry)?;
                    if filter.as_ref().is_none_or(|f| f.matches(&entry)) {
                        revealed.push(entry);
                    }
                }
                revealed
            },
        };

        debug!(count = entries.len(), "Vault entries listed");
        Ok(entries)
    }

    fn reveal(&self, entry: VaultEntry) -> Result<VaultEntry, VaultError> {
        match &self.codec {
            Some(codec) => codec.decrypt_entry(entry),
            None => Ok(entry),
        }
    }
}

/// A malformed id cannot name an entry, so it gets the same answer as a missing one.
fn entry_key(id: &str) -> Result<String, VaultError> {
    ResourceGuard::verify(id, VAULT_TABLE).map_err(|e| {
        debug!(error = %e, "Rejected entry id");
        VaultError::not_found()
    })
}
