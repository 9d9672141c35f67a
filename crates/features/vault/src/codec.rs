//! Applies the cipher engine to the sensitive fields of an entry.
//!
//! `password` is always encrypted; `username` and `notes` only when non-empty, so an empty
//! optional field stays `""` instead of becoming a blob of a known length. `title` and
//! `url` pass through untouched in both directions.

use svault_cipher::{KeySource, Passphrase, decrypt, encrypt};
use tracing::warn;

use crate::error::{VaultError, VaultErrorExt};
use crate::model::{EntryFields, EntryPatch, VaultEntry};
use crate::store::SearchFilter;

#[derive(Debug, Clone)]
pub struct FieldCodec {
    keys: KeySource,
}

impl FieldCodec {
    #[must_use]
    pub const fn new(keys: KeySource) -> Self {
        Self { keys }
    }

    #[must_use]
    pub const fn keys(&self) -> &KeySource {
        &self.keys
    }

    /// Encrypts a create payload for `owner_id`.
    ///
    /// # Errors
    /// [`VaultError::Cipher`] if the passphrase cannot be resolved or the OS RNG fails.
    pub fn encrypt_entry(&self, owner_id: &str, fields: EntryFields) -> Result<EntryFields, VaultError> {
        let passphrase = self.passphrase(owner_id)?;

        Ok(EntryFields {
            title: fields.title,
            username: seal(fields.username, &passphrase)?,
            password: seal(fields.password, &passphrase)?,
            url: fields.url,
            notes: seal(fields.notes, &passphrase)?,
        })
    }

    /// Encrypts the replaced fields of an update with the same rules as [`Self::encrypt_entry`].
    ///
    /// # Errors
    /// [`VaultError::Cipher`] if the passphrase cannot be resolved or the OS RNG fails.
    pub fn encrypt_changes(&self, owner_id: &str, patch: EntryPatch) -> Result<EntryPatch, VaultError> {
        let passphrase = self.passphrase(owner_id)?;

        Ok(EntryPatch {
            title: patch.title,
            username: seal(patch.username, &passphrase)?,
            password: seal(patch.password, &passphrase)?,
            url: patch.url,
            notes: seal(patch.notes, &passphrase)?,
        })
    }

    /// Decrypts a stored entry for display.
    ///
    /// A field that fails to decrypt is shown as `""`; the failure is logged with the entry
    /// id and field name.
    ///
    /// # Errors
    /// [`VaultError::Cipher`] only if the owner's passphrase cannot be resolved.
    pub fn decrypt_entry(&self, mut entry: VaultEntry) -> Result<VaultEntry, VaultError> {
        let passphrase = self.passphrase(&entry.owner_id)?;

        entry.username = open_for_display(&entry.id, "username", &entry.username, &passphrase);
        entry.password = open_for_display(&entry.id, "password", &entry.password, &passphrase);
        entry.notes = open_for_display(&entry.id, "notes", &entry.notes, &passphrase);
        Ok(entry)
    }

    fn passphrase(&self, owner_id: &str) -> Result<Passphrase, VaultError> {
        self.keys.passphrase_for(owner_id).context("Resolving owner passphrase")
    }
}

/// Case-insensitive substring match over `title` and the (decrypted) `username`.
#[must_use]
pub fn matches_search(entry: &VaultEntry, term: &str) -> bool {
    SearchFilter::new(term, true).is_none_or(|filter| filter.matches(entry))
}

// Empty values stay empty.
fn seal(value: Option<String>, passphrase: &Passphrase) -> Result<Option<String>, VaultError> {
    value
        .map(|plain| {
            if plain.is_empty() {
                Ok(plain)
            } else {
                encrypt(&plain, passphrase.expose()).context("Encrypting field")
            }
        })
        .transpose()
}

fn open_for_display(id: &str, field: &'static str, blob: &str, passphrase: &Passphrase) -> String {
    if blob.is_empty() {
        return String::new();
    }
    decrypt(blob, passphrase.expose()).unwrap_or_else(|e| {
        warn!(entry_id = %id, field, error = %e, "Field could not be decrypted, showing it empty");
        String::new()
    })
}
