use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use svault_domain::config::JwtConfig;

use super::Principal;

#[svault_derive::svault_error]
pub enum TokenError {
    /// The verifier cannot be built from the configured settings.
    #[error("Token configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Signature, expiry, issuer or audience checks failed.
    #[error("Token rejected{}: {source}", format_context(.context))]
    Rejected { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },

    /// The token verified but names nobody.
    #[error("Token has no subject{}: {message}", format_context(.context))]
    MissingSubject { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    /// Claim name used by tokens from the legacy account service.
    #[serde(default, rename = "userId")]
    user_id: Option<String>,
}

/// Verifies HS256 bearer tokens and turns them into a [`Principal`].
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// # Errors
    /// [`TokenError::Configuration`] if the secret is empty.
    pub fn from_config(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::Configuration {
                message: "security.jwt.secret must not be empty".into(),
                context: None,
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key: DecodingKey::from_secret(config.secret.as_bytes()), validation })
    }

    /// Checks the token and returns the principal it names (`sub`, else `userId`).
    ///
    /// # Errors
    /// * [`TokenError::Rejected`] for bad signatures, expired tokens or claim mismatches.
    /// * [`TokenError::MissingSubject`] when neither claim holds a non-empty value.
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)?.claims;

        claims
            .sub
            .into_iter()
            .chain(claims.user_id)
            .find(|id| !id.trim().is_empty())
            .map(Principal::new)
            .ok_or_else(|| TokenError::MissingSubject {
                message: "expected a 'sub' or 'userId' claim".into(),
                context: None,
            })
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const SECRET: &str = "unit-test-secret";

    fn config() -> JwtConfig {
        JwtConfig { secret: SECRET.to_owned(), ..JwtConfig::default() }
    }

    fn sign(claims: &serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn exp() -> u64 {
        jsonwebtoken::get_current_timestamp() + 600
    }

    #[test]
    fn accepts_sub_and_legacy_user_id() {
        let verifier = TokenVerifier::from_config(&config()).unwrap();

        let token = sign(&json!({ "sub": "alice", "exp": exp() }), SECRET);
        assert_eq!(verifier.verify(&token).unwrap().owner_id(), "alice");

        let token = sign(&json!({ "userId": "65f1c0ffee", "exp": exp() }), SECRET);
        assert_eq!(verifier.verify(&token).unwrap().owner_id(), "65f1c0ffee");
    }

    #[test]
    fn rejects_foreign_signature_and_expired_tokens() {
        let verifier = TokenVerifier::from_config(&config()).unwrap();

        let forged = sign(&json!({ "sub": "alice", "exp": exp() }), "other-secret");
        assert!(matches!(verifier.verify(&forged), Err(TokenError::Rejected { .. })));

        let expired = sign(&json!({ "sub": "alice", "exp": 1_000 }), SECRET);
        assert!(matches!(verifier.verify(&expired), Err(TokenError::Rejected { .. })));
    }

    #[test]
    fn rejects_tokens_without_subject() {
        let verifier = TokenVerifier::from_config(&config()).unwrap();
        let token = sign(&json!({ "sub": "  ", "exp": exp() }), SECRET);

        assert!(matches!(verifier.verify(&token), Err(TokenError::MissingSubject { .. })));
    }

    #[test]
    fn enforces_configured_issuer() {
        let cfg = JwtConfig { issuer: Some("accounts".to_owned()), ..config() };
        let verifier = TokenVerifier::from_config(&cfg).unwrap();

        let good = sign(&json!({ "sub": "a", "iss": "accounts", "exp": exp() }), SECRET);
        let bad = sign(&json!({ "sub": "a", "iss": "elsewhere", "exp": exp() }), SECRET);

        assert!(verifier.verify(&good).is_ok());
        assert!(verifier.verify(&bad).is_err());
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let cfg = JwtConfig { secret: String::new(), ..JwtConfig::default() };
        assert!(matches!(
            TokenVerifier::from_config(&cfg),
            Err(TokenError::Configuration { .. })
        ));
    }
}
