use async_trait::async_trait;
use chrono::DateTime;
use std::future::Future;
use std::time::Duration;
use surrealdb::types::{SurrealValue, Value};
use svault_database::{Database, Migration};
use svault_domain::constants::VAULT_SLICE;
use svault_kernel::safe_nanoid;
use tracing::{debug, instrument, warn};

use super::{SearchFilter, VaultStore};
use crate::error::{VaultError, VaultErrorExt};
use crate::model::{EntryPatch, NewEntry, VaultEntry, timestamp_now};

/// Schema owned by this store, applied through [`svault_database::DatabaseBuilder::migrations`].
pub const MIGRATIONS: &[Migration] =
    &[Migration::new(VAULT_SLICE, "0001_vault", include_str!("../../migrations/0001_vault.surql"))];

const INSERT: &str = "CREATE vault CONTENT $record RETURN NONE";

const SELECT_ONE: &str = "SELECT entry_id, owner_id, title, username, password, url, notes, \
    created_at, updated_at FROM vault WHERE entry_id = $id AND owner_id = $owner LIMIT 1";

const SELECT_OWNED: &str = "SELECT entry_id, owner_id, title, username, password, url, notes, \
    created_at, updated_at FROM vault WHERE owner_id = $owner \
    ORDER BY created_at DESC, entry_id DESC";

const SEARCH_TITLE: &str = "SELECT entry_id, owner_id, title, username, password, url, notes, \
    created_at, updated_at FROM vault WHERE owner_id = $owner \
    AND string::contains(string::lowercase(title), $term) \
    ORDER BY created_at DESC, entry_id DESC";

const SEARCH_TITLE_OR_USERNAME: &str = "SELECT entry_id, owner_id, title, username, password, \
    url, notes, created_at, updated_at FROM vault WHERE owner_id = $owner \
    AND (string::contains(string::lowercase(title), $term) \
    OR string::contains(string::lowercase(username), $term)) \
    ORDER BY created_at DESC, entry_id DESC";

const RECORD_FIELDS: &str =
    "entry_id, owner_id, title, username, password, url, notes, created_at, updated_at";

const DELETE: &str = "DELETE vault WHERE entry_id = $id AND owner_id = $owner RETURN BEFORE";

const WRITE_ATTEMPTS: u32 = 8;
const RETRY_DELAY: Duration = Duration::from_millis(5);

/// One `vault` document. Timestamps are Unix milliseconds.
#[derive(Debug, Clone, SurrealValue)]
struct VaultRecord {
    entry_id: String,
    owner_id: String,
    title: String,
    username: String,
    password: String,
    url: String,
    notes: String,
    created_at: i64,
    updated_at: i64,
}

impl From<&VaultEntry> for VaultRecord {
    fn from(entry: &VaultEntry) -> Self {
        Self {
            entry_id: entry.id.clone(),
            owner_id: entry.owner_id.clone(),
            title: entry.title.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            url: entry.url.clone(),
            notes: entry.notes.clone(),
            created_at: entry.created_at.timestamp_millis(),
            updated_at: entry.updated_at.timestamp_millis(),
        }
    }
}

impl TryFrom<VaultRecord> for VaultEntry {
    type Error = VaultError;

    fn try_from(record: VaultRecord) -> Result<Self, Self::Error> {
        let timestamp = |ms: i64| {
            DateTime::from_timestamp_millis(ms).ok_or_else(|| VaultError::Internal {
                message: format!("Timestamp {ms} is out of range").into(),
                context: Some(record.entry_id.clone().into()),
            })
        };

        Ok(Self {
            created_at: timestamp(record.created_at)?,
            updated_at: timestamp(record.updated_at)?,
            id: record.entry_id,
            owner_id: record.owner_id,
            title: record.title,
            username: record.username,
            password: record.password,
            url: record.url,
            notes: record.notes,
        })
    }
}

/// Keeps one document per entry in the `vault` table.
#[derive(Debug, Clone)]
pub struct SurrealStore {
    db: Database,
}

impl SurrealStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VaultStore for SurrealStore {
    #[instrument(skip_all, fields(owner_id = %entry.owner_id))]
    async fn create(&self, entry: NewEntry) -> Result<VaultEntry, VaultError> {
        entry.validate()?;
        let stored = entry.into_entry(safe_nanoid!(), timestamp_now());

        self.db
            .query(INSERT)
            .bind(("record", VaultRecord::from(&stored)))
            .await
            .context("Creating vault entry")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Creating vault entry")?;

        debug!(entry_id = %stored.id, "Vault entry stored");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str, owner_id: &str) -> Result<VaultEntry, VaultError> {
        let records = self
            .db
            .query(SELECT_ONE)
            .bind(("id", id.to_owned()))
            .bind(("owner", owner_id.to_owned()))
            .await
            .context("Loading vault entry")?
            .take::<Vec<VaultRecord>>(0)
            .context("Parsing vault entry")?;

        records.into_iter().next().ok_or_else(VaultError::not_found)?.try_into()
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: &str,
        owner_id: &str,
        patch: EntryPatch,
    ) -> Result<VaultEntry, VaultError> {
        let sql = update_statement(&patch);
        let sql = sql.as_str();
        let updated_at = timestamp_now().timestamp_millis();
        let db = &self.db;
        let patch = &patch;

        let records = retry_on_conflict("Updating vault entry", || async move {
            let mut query = db
                .query(sql)
                .bind(("id", id.to_owned()))
                .bind(("owner", owner_id.to_owned()))
                .bind(("updated_at", updated_at));
            for (field, value) in patch_fields(patch) {
                query = query.bind((field, value.to_owned()));
            }
            query.await?.take::<Vec<VaultRecord>>(0)
        })
        .await?;

        records.into_iter().next().ok_or_else(VaultError::not_found)?.try_into()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), VaultError> {
        let db = &self.db;

        let removed = retry_on_conflict("Deleting vault entry", || async move {
            db.query(DELETE)
                .bind(("id", id.to_owned()))
                .bind(("owner", owner_id.to_owned()))
                .await?
                .take::<Vec<Value>>(0)
        })
        .await?;

        if removed.is_empty() {
            return Err(VaultError::not_found());
        }
        Ok(())
    }

    #[instrument(skip(self, search), fields(search = search.is_some()))]
    async fn list(
        &self,
        owner_id: &str,
        search: Option<&SearchFilter>,
    ) -> Result<Vec<VaultEntry>, VaultError> {
        let query = match search {
            None => self.db.query(SELECT_OWNED),
            Some(filter) => {
                let sql =
                    if filter.include_username() { SEARCH_TITLE_OR_USERNAME } else { SEARCH_TITLE };
                self.db.query(sql).bind(("term", filter.term().to_owned()))
            },
        };

        let records = query
            .bind(("owner", owner_id.to_owned()))
            .await
            .context("Listing vault entries")?
            .take::<Vec<VaultRecord>>(0)
            .context("Parsing vault entries")?;

        records.into_iter().map(VaultEntry::try_from).collect()
    }
}

/// Field name and new value for every field `patch` replaces.
fn patch_fields(patch: &EntryPatch) -> impl Iterator<Item = (&'static str, &str)> {
    [
        ("title", patch.title.as_deref()),
        ("username", patch.username.as_deref()),
        ("password", patch.password.as_deref()),
        ("url", patch.url.as_deref()),
        ("notes", patch.notes.as_deref()),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.map(|value| (field, value)))
}

/// A single owner-scoped `UPDATE` that only touches the replaced fields.
fn update_statement(patch: &EntryPatch) -> String {
    let mut assignments = String::new();
    for (field, _) in patch_fields(patch) {
        assignments.push_str(field);
        assignments.push_str(" = $");
        assignments.push_str(field);
        assignments.push_str(", ");
    }
    format!(
        "UPDATE vault SET {assignments}updated_at = $updated_at \
        WHERE entry_id = $id AND owner_id = $owner RETURN {RECORD_FIELDS}"
    )
}

fn is_write_conflict(error: &surrealdb::Error) -> bool {
    let message = error.to_string();
    message.contains("Transaction conflict") || message.contains("retry the transaction")
}

/// Runs a write, re-running it while the engine reports a retryable write conflict.
async fn retry_on_conflict<T, F, Fut>(context: &'static str, mut run: F) -> Result<T, VaultError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, surrealdb::Error>>,
{
    let mut delay = RETRY_DELAY;
    let mut attempt = 1;
    loop {
        match run().await {
            Err(e) if attempt < WRITE_ATTEMPTS && is_write_conflict(&e) => {
                debug!(attempt, ?delay, "Write conflict, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            },
            Err(e) if is_write_conflict(&e) => {
                warn!(attempts = attempt, "Write conflict persisted after retries");
                return Err(e).context(context);
            },
            result => return result.context(context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn records_keep_millisecond_timestamps() {
        let now = timestamp_now();
        let entry = VaultEntry {
            id: "abc".to_owned(),
            owner_id: "o".to_owned(),
            title: "t".to_owned(),
            username: String::new(),
            password: "p".to_owned(),
            url: String::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        };

        let back = VaultEntry::try_from(VaultRecord::from(&entry)).unwrap();
        assert_eq!(back, entry);
        assert!(back.created_at <= Utc::now());
    }

    #[test]
    fn out_of_range_timestamps_are_internal_errors() {
        let record = VaultRecord {
            entry_id: "abc".to_owned(),
            owner_id: "o".to_owned(),
            title: "t".to_owned(),
            username: String::new(),
            password: "p".to_owned(),
            url: String::new(),
            notes: String::new(),
            created_at: i64::MAX,
            updated_at: 0,
        };

        assert!(matches!(VaultEntry::try_from(record), Err(VaultError::Internal { .. })));
    }

    #[test]
    fn update_statement_sets_only_replaced_fields() {
        let patch = EntryPatch { notes: Some(String::new()), ..EntryPatch::default() };
        let sql = update_statement(&patch);

        assert!(sql.starts_with("UPDATE vault SET notes = $notes, updated_at = $updated_at "));
        assert!(!sql.contains("title ="));
        assert!(sql.contains("WHERE entry_id = $id AND owner_id = $owner"));

        let fields: Vec<_> = patch_fields(&EntryPatch {
            title: Some("t".to_owned()),
            url: Some("u".to_owned()),
            ..EntryPatch::default()
        })
        .collect();
        assert_eq!(fields, [("title", "t"), ("url", "u")]);
    }

    #[test]
    fn migration_defines_the_owner_index() {
        let script = include_str!("../../migrations/0001_vault.surql");
        assert!(script.contains("FIELDS owner_id"));
        assert_eq!(MIGRATIONS.len(), 1);
        assert_eq!(MIGRATIONS[0].key(), "vault:0001_vault");
    }
}
