use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

use crate::error::{DatabaseError, DatabaseErrorExt};

const LEDGER_SCHEMA: &str = "DEFINE TABLE IF NOT EXISTS migration SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS migration_key ON migration FIELDS slice, version UNIQUE;";

/// A versioned SurrealQL script owned by one feature slice.
///
/// Once applied, a migration must never change: the runner stores a SHA-256 checksum of
/// the script and refuses to start if it differs on a later run.
#[derive(Debug, Clone)]
pub struct Migration {
    slice: &'static str,
    version: &'static str,
    script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }

    #[must_use]
    pub fn checksum(&self) -> String {
        let digest = Sha256::digest(self.script.as_bytes());
        hex::encode(&digest[..])
    }
}

/// Outcome of a migration run, as `slice:version` keys.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, SurrealValue)]
struct AppliedMigration {
    slice: String,
    version: String,
    checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(LEDGER_SCHEMA)
            .await
            .context("Defining migration ledger")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Defining migration ledger")?;

        let applied = self.applied().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            let key = migration.key();
            if let Some(existing) = applied.get(&key) {
                ensure_checksum_match(migration, &existing.checksum)?;
                report.skipped.push(key);
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(key);
        }

        Ok(report)
    }

    async fn applied(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry))
            .collect())
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{
                slice: $slice, version: $version, checksum: $checksum, applied_at: time::now()
            }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("slice", migration.slice.to_owned()))
            .bind(("version", migration.version.to_owned()))
            .bind(("checksum", migration.checksum()))
            .await
            .context(format!("Applying migration {}", migration.key()))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Applying migration {}", migration.key()))?;

        Ok(())
    }
}

fn ensure_checksum_match(migration: &Migration, recorded: &str) -> Result<(), DatabaseError> {
    let current = migration.checksum();
    if recorded != current {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (recorded {recorded}, current {current})",
                migration.key()
            )
            .into(),
            context: Some("Migration was edited after being applied".into()),
        });
    }
    Ok(())
}
