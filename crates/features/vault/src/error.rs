use std::borrow::Cow;
use svault_cipher::CipherError;

pub(crate) const NOT_FOUND_MESSAGE: &str = "Vault entry not found";

/// A specialized [`VaultError`] enum of this crate.
#[svault_derive::svault_error]
pub enum VaultError {
    /// A required field is missing or an option is out of range.
    #[error("Vault validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The entry does not exist or belongs to someone else.
    #[error("Vault entry not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Slice settings are inconsistent.
    #[error("Vault config error{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Server-side field encryption failed.
    #[error("Vault cipher error{}: {source}", format_context(.context))]
    Cipher { source: CipherError, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Vault database error{}: {source}", format_context(.context))]
    Database { source: svault_database::DatabaseError, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Vault query error{}: {source}", format_context(.context))]
    Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal vault error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl VaultError {
    /// The one answer for "absent" and "not yours".
    #[must_use]
    pub const fn not_found() -> Self {
        Self::NotFound { message: Cow::Borrowed(NOT_FOUND_MESSAGE), context: None }
    }

    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "server")]
impl From<VaultError> for svault_kernel::server::ApiError {
    fn from(err: VaultError) -> Self {
        use svault_kernel::server::ApiError;

        match err {
            VaultError::Validation { message, .. } => ApiError::bad_request(message),
            VaultError::NotFound { message, .. } => ApiError::not_found(message),
            other => {
                tracing::error!(error = %other, "Vault request failed");
                ApiError::internal()
            },
        }
    }
}
