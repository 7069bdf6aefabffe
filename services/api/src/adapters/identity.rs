//! services/api/src/adapters/identity.rs
//!
//! Verifies identity-provider session tokens (JWTs) and implements the
//! `IdentityVerifier` port from the `core` crate.

use article_quiz_core::domain::ExternalIdentity;
use article_quiz_core::ports::{IdentityVerifier, PortError, PortResult};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

/// The claims read from a session token. `email` and `name` are only present
/// when the provider's session template adds them.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Builds a verifier for RS256 tokens from a PEM public key. Escaped `\n`
    /// sequences (as found in single-line environment variables) are accepted.
    pub fn from_rsa_pem(pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let pem = pem.replace("\\n", "\n");
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())?;
        Ok(Self::new(key, Algorithm::RS256))
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify_session_token(&self, token: &str) -> PortResult<ExternalIdentity> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            warn!("Rejected session token: {}", e);
            PortError::Unauthorized
        })?;

        Ok(ExternalIdentity {
            external_id: data.claims.sub,
            email: data.claims.email,
            name: data.claims.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-signing-secret";

    fn verifier() -> JwtIdentityVerifier {
        JwtIdentityVerifier::new(DecodingKey::from_secret(SECRET), Algorithm::HS256)
    }

    fn sign(claims: serde_json::Value, secret: &[u8]) -> String {
        encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
            .expect("token")
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let exp = Utc::now().timestamp() + 600;
        let token = sign(
            json!({ "sub": "user_2abc", "email": "ada@example.com", "exp": exp }),
            SECRET,
        );
        let identity = verifier().verify_session_token(&token).await.unwrap();
        assert_eq!(identity.external_id, "user_2abc");
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert_eq!(identity.name, None);
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let exp = Utc::now().timestamp() - 3600;
        let token = sign(json!({ "sub": "user_2abc", "exp": exp }), SECRET);
        let err = verifier().verify_session_token(&token).await.unwrap_err();
        assert!(matches!(err, PortError::Unauthorized));
    }

    #[tokio::test]
    async fn foreign_signature_is_unauthorized() {
        let exp = Utc::now().timestamp() + 600;
        let token = sign(json!({ "sub": "user_2abc", "exp": exp }), b"someone-else");
        assert!(verifier().verify_session_token(&token).await.is_err());
    }

    #[test]
    fn garbage_pem_is_rejected() {
        assert!(JwtIdentityVerifier::from_rsa_pem("not a key").is_err());
    }
}
