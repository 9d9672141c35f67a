//! Random password generation.
//!
//! Characters are drawn from the OS RNG with rejection sampling, so every character of the
//! selected alphabet is equally likely.

use getrandom::fill;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::error::VaultError;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
/// Dropped when `exclude_similar` is set.
pub const SIMILAR: &str = "il1Lo0O";

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 128;
pub const DEFAULT_LENGTH: usize = 16;

/// What the generated password may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::IntoParams), into_params(parameter_in = Query))]
#[serde(default)]
pub struct PasswordOptions {
    /// Number of characters (4..=128)
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    /// Leave out look-alike characters (`il1Lo0O`)
    #[serde(alias = "excludeSimilar")]
    pub exclude_similar: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude_similar: false,
        }
    }
}

impl PasswordOptions {
    /// The characters a password may be built from, in a fixed order.
    #[must_use]
    pub fn alphabet(&self) -> Vec<u8> {
        let classes = [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.numbers, DIGITS),
            (self.symbols, SYMBOLS),
        ];

        classes
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, chars)| chars.bytes())
            .filter(|b| !(self.exclude_similar && SIMILAR.as_bytes().contains(b)))
            .collect()
    }

    /// # Errors
    /// * [`VaultError::Validation`] if the length is out of range or no class is selected.
    /// * [`VaultError::Internal`] if the OS RNG fails.
    pub fn generate(&self) -> Result<String, VaultError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(VaultError::validation(format!(
                "Password length must be between {MIN_LENGTH} and {MAX_LENGTH}"
            )));
        }

        let alphabet = self.alphabet();
        if alphabet.is_empty() {
            return Err(VaultError::validation("Please select at least one character type"));
        }

        let mut password = String::with_capacity(self.length);
        let mut pool = Zeroizing::new([0u8; 64]);
        while password.len() < self.length {
            fill(pool.as_mut_slice()).map_err(|e| VaultError::Internal {
                message: e.to_string().into(),
                context: Some("Failed to gather randomness for password".into()),
            })?;
            let picked = pool
                .iter()
                .filter_map(|&b| pick(&alphabet, b))
                .take(self.length - password.len());
            password.extend(picked);
        }

        Ok(password)
    }
}

/// Maps a random byte onto `alphabet`, rejecting the bytes that would bias the result.
fn pick(alphabet: &[u8], byte: u8) -> Option<char> {
    let len = alphabet.len();
    let zone = 256 - (256 % len);
    let value = usize::from(byte);
    (value < zone).then(|| char::from(alphabet[value % len]))
}
