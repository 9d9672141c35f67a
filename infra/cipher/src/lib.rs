//! Passphrase-based field encryption compatible with OpenSSL `enc -aes-256-cbc -md md5`
//! and CryptoJS `AES.encrypt(text, passphrase)`.
//!
//! ## Blob Format
//!
//! ```text
//! base64( "Salted__"(8) || SALT(8) || AES-256-CBC(PKCS#7(plaintext)) )
//! ```
//!
//! Key and IV come from `EVP_BytesToKey` with MD5 and one iteration over
//! `passphrase || salt`. The salt is fresh for every call.
//!
//! ## Integrity
//!
//! The format carries **no authentication tag**. Tampering is only noticed when it breaks
//! the padding or the UTF-8 decoding, and a wrong passphrase looks exactly like that.
//! [`decrypt`] reports these cases as [`CipherError`]; [`decrypt_or_empty`] keeps the
//! older "empty string on failure" contract for display paths.
//!
//! ## Example
//! ```rust
//! use svault_cipher::{decrypt, encrypt};
//!
//! # fn main() -> Result<(), svault_cipher::CipherError> {
//! let blob = encrypt("hunter2", "passphrase")?;
//! assert!(blob.starts_with("U2FsdGVkX1"));
//! assert_eq!(decrypt(&blob, "passphrase")?, "hunter2");
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod keys;

pub use engine::{
    BLOCK_LEN, DerivedKey, IV_LEN, KEY_LEN, SALT_LEN, SALTED_MARKER, decrypt, decrypt_or_empty,
    derive_key_iv, encrypt, encrypt_with_salt,
};
pub use error::{CipherError, CipherErrorExt};
pub use keys::{KeySource, Passphrase};
