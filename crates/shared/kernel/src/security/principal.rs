use std::fmt;

/// The authenticated identity a request acts for.
///
/// Only ever built from a verified token; payloads never supply it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    owner_id: String,
}

impl Principal {
    #[must_use]
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self { owner_id: owner_id.into() }
    }

    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.owner_id)
    }
}
