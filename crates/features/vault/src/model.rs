use chrono::{DateTime, Utc};
use svault_derive::api_model;

use crate::error::VaultError;

const REQUIRED_FIELDS: &str = "Title and password are required";

/// One stored credential.
///
/// `username`, `password` and `notes` hold cipher blobs (or an empty string for the optional
/// ones); `title` and `url` are plaintext.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct VaultEntry {
    /// Store-assigned identifier
    pub id: String,
    /// Principal owning the entry
    pub owner_id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry fields as sent by a client, for both create and update.
///
/// Absent and `null` are the same thing. Any owner or id in the body is ignored.
#[api_model(deny_unknown_fields = false)]
#[derive(Default, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// A validated entry waiting for the store to assign its id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub owner_id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub notes: String,
}

impl NewEntry {
    /// Requires `title` and `password`; the optional fields default to `""`.
    ///
    /// # Errors
    /// [`VaultError::Validation`] if `title` or `password` is missing or empty.
    pub fn from_fields(owner_id: impl Into<String>, fields: EntryFields) -> Result<Self, VaultError> {
        let entry = Self {
            owner_id: owner_id.into(),
            title: fields.title.unwrap_or_default(),
            username: fields.username.unwrap_or_default(),
            password: fields.password.unwrap_or_default(),
            url: fields.url.unwrap_or_default(),
            notes: fields.notes.unwrap_or_default(),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// # Errors
    /// [`VaultError::Validation`] if `title` or `password` is empty.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.title.is_empty() || self.password.is_empty() {
            return Err(VaultError::validation(REQUIRED_FIELDS));
        }
        Ok(())
    }

    pub(crate) fn into_entry(self, id: String, now: DateTime<Utc>) -> VaultEntry {
        VaultEntry {
            id,
            owner_id: self.owner_id,
            title: self.title,
            username: self.username,
            password: self.password,
            url: self.url,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The fields an update actually replaces.
///
/// `title` and `password` only count when non-empty; `username`, `url` and `notes` count
/// whenever present, so `""` clears them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl EntryPatch {
    #[must_use]
    pub fn from_fields(fields: EntryFields) -> Self {
        Self {
            title: fields.title.filter(|t| !t.is_empty()),
            username: fields.username,
            password: fields.password.filter(|p| !p.is_empty()),
            url: fields.url,
            notes: fields.notes,
        }
    }

    /// Writes the present fields into `entry` and stamps `updated_at`.
    pub fn apply(self, entry: &mut VaultEntry, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(username) = self.username {
            entry.username = username;
        }
        if let Some(password) = self.password {
            entry.password = password;
        }
        if let Some(url) = self.url {
            entry.url = url;
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
        entry.updated_at = now;
    }
}

/// Current time at millisecond precision, the resolution every store keeps.
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
