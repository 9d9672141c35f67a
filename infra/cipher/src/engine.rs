use aes::Aes256;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{CipherError, CipherErrorExt};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// ASCII marker that opens every decoded blob.
pub const SALTED_MARKER: &[u8; 8] = b"Salted__";
/// Random salt length in bytes.
pub const SALT_LEN: usize = 8;
/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;
/// CBC initialization vector length in bytes.
pub const IV_LEN: usize = 16;
/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

const HEADER_LEN: usize = SALTED_MARKER.len() + SALT_LEN;

/// Key and IV produced by [`derive_key_iv`]. Wiped from memory on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl DerivedKey {
    #[must_use]
    pub const fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    #[must_use]
    pub const fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey").field("key", &"<redacted>").field("iv", &"<redacted>").finish()
    }
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
///
/// `D_0 = MD5(passphrase || salt)`, `D_n = MD5(D_{n-1} || passphrase || salt)`; the
/// concatenation is cut into a 32-byte key followed by a 16-byte IV.
#[must_use]
pub fn derive_key_iv(passphrase: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
    let mut material = Zeroizing::new([0u8; KEY_LEN + IV_LEN]);
    let mut previous: Option<Zeroizing<[u8; 16]>> = None;
    let mut filled = 0;

    while filled < material.len() {
        let mut hasher = Md5::new();
        if let Some(prev) = previous.as_deref() {
            hasher.update(prev);
        }
        hasher.update(passphrase.as_bytes());
        hasher.update(salt);

        let mut block = Zeroizing::new([0u8; 16]);
        block.copy_from_slice(&hasher.finalize());
        let take = block.len().min(material.len() - filled);
        material[filled..filled + take].copy_from_slice(&block[..take]);
        filled += take;
        previous = Some(block);
    }

    let mut derived = DerivedKey { key: [0u8; KEY_LEN], iv: [0u8; IV_LEN] };
    derived.key.copy_from_slice(&material[..KEY_LEN]);
    derived.iv.copy_from_slice(&material[KEY_LEN..]);
    derived
}

/// Encrypts `plaintext` under `passphrase` with a fresh random salt.
///
/// Two calls with identical inputs produce different blobs.
///
/// # Errors
/// [`CipherError::Entropy`] if the OS RNG cannot produce a salt.
pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String, CipherError> {
    let mut salt = [0u8; SALT_LEN];
    getrandom::fill(&mut salt).context("Generating blob salt")?;
    Ok(encrypt_with_salt(plaintext, passphrase, &salt))
}

/// Deterministic core of [`encrypt`] for a caller-chosen salt.
///
/// Only fixtures and interop checks should pick the salt; reusing one weakens every blob
/// sharing it.
#[must_use]
pub fn encrypt_with_salt(plaintext: &str, passphrase: &str, salt: &[u8; SALT_LEN]) -> String {
    let derived = derive_key_iv(passphrase, salt);
    let ciphertext = Aes256CbcEnc::new(
        GenericArray::from_slice(derived.key()),
        GenericArray::from_slice(derived.iv()),
    )
    .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut blob = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    blob.extend_from_slice(SALTED_MARKER);
    blob.extend_from_slice(salt);
    blob.extend_from_slice(&ciphertext);

    STANDARD.encode(blob)
}

/// Decrypts a blob produced by [`encrypt`] (or any OpenSSL/CryptoJS passphrase blob).
///
/// # Errors
/// * [`CipherError::Encoding`] if `blob` is not base64.
/// * [`CipherError::InvalidPayload`] if the marker is missing, the blob is shorter than
///   marker plus salt, or the body is empty or not block aligned.
/// * [`CipherError::Decryption`] if the padding is invalid or the plaintext is not UTF-8.
pub fn decrypt(blob: &str, passphrase: &str) -> Result<String, CipherError> {
    let raw = STANDARD.decode(blob.trim()).context("Decoding blob")?;

    if raw.len() < HEADER_LEN {
        return Err(CipherError::InvalidPayload {
            message: format!("blob is {} bytes, expected at least {HEADER_LEN}", raw.len()).into(),
            context: None,
        });
    }

    let (marker, rest) = raw.split_at(SALTED_MARKER.len());
    if marker != SALTED_MARKER {
        return Err(CipherError::InvalidPayload {
            message: "missing Salted__ marker".into(),
            context: None,
        });
    }

    let (salt, body) = rest.split_at(SALT_LEN);
    if body.is_empty() || body.len() % BLOCK_LEN != 0 {
        return Err(CipherError::InvalidPayload {
            message: format!("ciphertext length {} is not a positive multiple of {BLOCK_LEN}", body.len())
                .into(),
            context: None,
        });
    }

    let mut salt_bytes = [0u8; SALT_LEN];
    salt_bytes.copy_from_slice(salt);
    let derived = derive_key_iv(passphrase, &salt_bytes);

    let plaintext = Aes256CbcDec::new(
        GenericArray::from_slice(derived.key()),
        GenericArray::from_slice(derived.iv()),
    )
    .decrypt_padded_vec_mut::<Pkcs7>(body)
    .map_err(|_| CipherError::Decryption { message: "invalid PKCS#7 padding".into(), context: None })?;

    String::from_utf8(plaintext).map_err(|err| {
        let mut bytes = err.into_bytes();
        bytes.zeroize();
        CipherError::Decryption { message: "plaintext is not valid UTF-8".into(), context: None }
    })
}

/// Legacy contract: any failure collapses into an empty string.
///
/// The failure is still logged so tampered or mis-keyed data stays observable.
#[must_use]
pub fn decrypt_or_empty(blob: &str, passphrase: &str) -> String {
    match decrypt(blob, passphrase) {
        Ok(plaintext) => plaintext,
        Err(err) => {
            warn!(error = %err, "Blob could not be decrypted; using empty value");
            String::new()
        },
    }
}
