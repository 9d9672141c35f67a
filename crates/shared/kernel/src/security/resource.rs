use std::borrow::Cow;

const MAX_KEY_LEN: usize = 64;

#[svault_derive::svault_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Utilities for safe resource handling and ID validation.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Reduces a client-supplied record ID to its bare key.
    ///
    /// Accepts `"vault:ABC"` or `"ABC"`. Rejects IDs naming another table and keys with
    /// characters outside `[A-Za-z0-9_-]`, so a key can be bound into a record ID safely.
    ///
    /// # Errors
    /// [`ResourceGuardError::Validation`] if the table differs or the key is malformed.
    pub fn verify<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id_ref = id.as_ref().trim();
        let table_ref = expected_table.as_ref();

        let key = match id_ref.split_once(':') {
            Some((table, key)) if table == table_ref => key,
            Some((table, _)) => {
                return Err(ResourceGuardError::Validation {
                    message: format!("Expected '{table_ref}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            },
            None => id_ref,
        };

        if key.is_empty() || key.len() > MAX_KEY_LEN {
            return Err(ResourceGuardError::Validation {
                message: format!("Key length must be 1..={MAX_KEY_LEN}").into(),
                context: None,
            });
        }
        if !key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
            return Err(ResourceGuardError::Validation {
                message: "Key contains unsupported characters".into(),
                context: None,
            });
        }

        Ok(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_verification() {
        assert_eq!(ResourceGuard::verify("vault:abc123", "vault").unwrap(), "abc123");
        assert_eq!(ResourceGuard::verify("abc123", "vault").unwrap(), "abc123");

        // Legacy hex object ids stay addressable.
        assert_eq!(
            ResourceGuard::verify("65f1c0ffee0123456789abcd", "vault").unwrap(),
            "65f1c0ffee0123456789abcd"
        );

        assert!(ResourceGuard::verify("migration:abc", "vault").is_err());
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(ResourceGuard::verify("", "vault").is_err());
        assert!(ResourceGuard::verify("vault:", "vault").is_err());
        assert!(ResourceGuard::verify("a b", "vault").is_err());
        assert!(ResourceGuard::verify("x'; DELETE vault; --", "vault").is_err());
        assert!(ResourceGuard::verify("a".repeat(65), "vault").is_err());
    }
}
