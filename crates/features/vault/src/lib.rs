//! Vault feature slice: titled credentials whose sensitive fields travel and rest as
//! passphrase-encrypted blobs, readable and writable only by their owner.
//!
//! * [`codec`] encrypts `username`, `password` and `notes` with the cipher engine.
//! * [`store`] persists entries scoped by owner (in memory or in `SurrealDB`).
//! * [`VaultService`] validates input and composes the two.
//! * `api` (feature `server`) exposes `/vault` over Axum.
//!
//! ```rust
//! use std::sync::Arc;
//! use svault_vault::{EntryFields, MemoryStore, VaultService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), svault_vault::VaultError> {
//! let service = VaultService::new(Arc::new(MemoryStore::new()));
//! let fields = EntryFields {
//!     title: Some("Mail".to_owned()),
//!     password: Some("U2FsdGVkX1...".to_owned()),
//!     ..EntryFields::default()
//! };
//!
//! let entry = service.create_entry("alice", fields).await?;
//! assert_eq!(entry.username, "");
//! assert!(service.get_entry("bob", &entry.id).await.is_err());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "server")]
pub mod api;
pub mod codec;
mod error;
pub mod generator;
pub mod model;
mod service;
pub mod store;

pub use crate::codec::{FieldCodec, matches_search};
pub use crate::error::{VaultError, VaultErrorExt};
pub use crate::generator::PasswordOptions;
pub use crate::model::{EntryFields, EntryPatch, NewEntry, VaultEntry};
pub use crate::service::VaultService;
pub use crate::store::{MemoryStore, SearchFilter, VaultStore};
#[cfg(feature = "server")]
pub use crate::store::{MIGRATIONS, SurrealStore};

/// Vault feature state
#[svault_derive::svault_slice]
pub struct Vault {
    pub service: VaultService,
}

#[cfg(feature = "server")]
pub use server::init;

#[cfg(feature = "server")]
mod server {
    use std::sync::Arc;
    use svault_cipher::KeySource;
    use svault_database::Database;
    use svault_domain::config::{EncryptionMode, KeyMode, StoreKind, VaultConfig, VaultKeysConfig};
    use svault_domain::constants::DEFAULT_VAULT_PASSPHRASE;
    use svault_kernel::domain::registry::InitializedSlice;
    use tracing::{info, warn};

    use crate::error::{VaultError, VaultErrorExt};
    use crate::{FieldCodec, MemoryStore, SurrealStore, Vault, VaultInner, VaultService, VaultStore};

    /// Initialize the vault feature.
    ///
    /// `database` is required when `config.store` is [`StoreKind::Database`]; apply
    /// [`crate::MIGRATIONS`] to it first.
    ///
    /// # Errors
    /// [`VaultError::Config`] for inconsistent settings, [`VaultError::Cipher`] for unusable
    /// key material.
    pub fn init(
        config: &VaultConfig,
        database: Option<&Database>,
    ) -> Result<InitializedSlice, VaultError> {
        let store: Arc<dyn VaultStore> = match config.store {
            StoreKind::Memory => {
                warn!("Vault entries are kept in memory and lost on restart");
                Arc::new(MemoryStore::new())
            },
            StoreKind::Database => {
                let db = database.ok_or_else(|| VaultError::Config {
                    message: "vault.store = \"database\" needs a database connection".into(),
                    context: None,
                })?;
                Arc::new(SurrealStore::new(db.clone()))
            },
        };

        let mut service = VaultService::new(store).search_username(config.search_username);
        if config.encryption == EncryptionMode::Server {
            service = service.with_codec(FieldCodec::new(key_source(&config.keys)?));
        }

        info!(
            store = ?config.store,
            encryption = ?config.encryption,
            key_mode = ?config.keys.mode,
            search_username = config.search_username,
            "Vault server slice initialized"
        );

        Ok(InitializedSlice::new(Vault::new(VaultInner { service })))
    }

    fn key_source(keys: &VaultKeysConfig) -> Result<KeySource, VaultError> {
        match keys.mode {
            KeyMode::Static => {
                if keys.passphrase == DEFAULT_VAULT_PASSPHRASE {
                    warn!("Using the built-in vault passphrase; set vault.keys.passphrase");
                }
                KeySource::fixed(keys.passphrase.as_str()).context("vault.keys.passphrase")
            },
            KeyMode::PerOwner => {
                let secret = keys.master_secret.as_deref().ok_or_else(|| VaultError::Config {
                    message: "vault.keys.mode = \"per_owner\" needs vault.keys.master_secret".into(),
                    context: None,
                })?;
                KeySource::per_owner(secret).context("vault.keys.master_secret")
            },
        }
    }
}
