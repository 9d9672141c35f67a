//! # Cipher Errors
//!
//! [`CipherError`] covers every way a blob can fail to encrypt or decrypt, plus
//! misconfigured key sources.

use std::borrow::Cow;

#[svault_derive::svault_error]
pub enum CipherError {
    /// The blob is not valid base64 text.
    #[error("Blob is not valid base64{}: {source}", format_context(.context))]
    Encoding { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// The decoded blob is too short, lacks the salted marker, or has a misaligned body.
    #[error("Invalid payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Padding or UTF-8 validation failed after decryption.
    ///
    /// There is no integrity tag, so a wrong passphrase usually lands here.
    #[error("Decryption failed{}: {message}", format_context(.context))]
    Decryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The OS random number generator could not produce a salt.
    #[error("Entropy source unavailable{}: {source}", format_context(.context))]
    Entropy { source: getrandom::Error, context: Option<Cow<'static, str>> },

    /// A key source was configured with unusable material.
    #[error("Invalid key configuration{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal cipher error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CipherError {
    /// `true` for failures caused by the blob itself rather than by the environment.
    #[must_use]
    pub const fn is_decryption_failure(&self) -> bool {
        matches!(self, Self::Encoding { .. } | Self::InvalidPayload { .. } | Self::Decryption { .. })
    }
}
