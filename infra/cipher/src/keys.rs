use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::CipherError;

const OWNER_KEY_SALT: &[u8] = b"svault.vault.keys.v1";
const OWNER_KEY_INFO: &[u8] = b"owner:";
const OWNER_KEY_LEN: usize = 32;

/// A passphrase handed to the cipher engine. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(String);

impl Passphrase {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}

#[derive(Clone)]
enum Mode {
    Static(Passphrase),
    PerOwner(Zeroizing<Vec<u8>>),
}

/// Resolves the passphrase used for a given owner's fields.
///
/// * [`KeySource::fixed`] returns one process-wide passphrase for everybody. This is the
///   legacy behaviour and keeps existing blobs readable.
/// * [`KeySource::per_owner`] derives a distinct passphrase per owner with HKDF-SHA256
///   over a server master secret.
#[derive(Clone)]
pub struct KeySource {
    mode: Mode,
}

impl KeySource {
    /// # Errors
    /// [`CipherError::InvalidKey`] if `passphrase` is empty.
    pub fn fixed(passphrase: impl Into<String>) -> Result<Self, CipherError> {
        let passphrase = Passphrase::new(passphrase);
        if passphrase.expose().is_empty() {
            return Err(CipherError::InvalidKey {
                message: "static passphrase must not be empty".into(),
                context: None,
            });
        }
        Ok(Self { mode: Mode::Static(passphrase) })
    }

    /// # Errors
    /// [`CipherError::InvalidKey`] if `master_secret` is empty.
    pub fn per_owner(master_secret: impl AsRef<[u8]>) -> Result<Self, CipherError> {
        let secret = master_secret.as_ref();
        if secret.is_empty() {
            return Err(CipherError::InvalidKey {
                message: "per-owner key mode requires a master secret".into(),
                context: None,
            });
        }
        Ok(Self { mode: Mode::PerOwner(Zeroizing::new(secret.to_vec())) })
    }

    #[must_use]
    pub const fn is_per_owner(&self) -> bool {
        matches!(self.mode, Mode::PerOwner(_))
    }

    /// Passphrase protecting `owner_id`'s entries.
    ///
    /// # Errors
    /// [`CipherError::Internal`] if HKDF expansion fails.
    pub fn passphrase_for(&self, owner_id: &str) -> Result<Passphrase, CipherError> {
        match &self.mode {
            Mode::Static(passphrase) => Ok(passphrase.clone()),
            Mode::PerOwner(master) => {
                let (_, hk) = Hkdf::<Sha256>::extract(Some(OWNER_KEY_SALT), master.as_slice());

                let mut info = Zeroizing::new(Vec::with_capacity(OWNER_KEY_INFO.len() + owner_id.len()));
                info.extend_from_slice(OWNER_KEY_INFO);
                info.extend_from_slice(owner_id.as_bytes());

                let mut okm = Zeroizing::new([0u8; OWNER_KEY_LEN]);
                hk.expand(&info, okm.as_mut_slice()).map_err(|_| CipherError::Internal {
                    message: "HKDF expansion failed for owner passphrase".into(),
                    context: None,
                })?;

                Ok(Passphrase::new(hex::encode(okm.as_slice())))
            },
        }
    }
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = if self.is_per_owner() { "per_owner" } else { "static" };
        f.debug_struct("KeySource").field("mode", &mode).finish_non_exhaustive()
    }
}
