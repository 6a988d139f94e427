//! Identity token verification.
//!
//! Sign-in happens at the external identity provider, which issues HS256
//! tokens. This service only verifies them and extracts the caller.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::domain::AuthenticatedCaller;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Identity token claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Stable external subject id
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

/// Identity verification trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a bearer token and return the caller it identifies
    fn verify(&self, token: &str) -> AppResult<AuthenticatedCaller>;
}

/// Shared-secret HS256 verifier
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &Config) -> Self {
        Self {
            key: DecodingKey::from_secret(config.identity_secret_bytes()),
            validation: Validation::default(),
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> AppResult<AuthenticatedCaller> {
        let claims = decode::<IdentityClaims>(token, &self.key, &self.validation)?.claims;

        if claims.sub.trim().is_empty() {
            return Err(AppError::Unauthenticated);
        }

        Ok(AuthenticatedCaller {
            subject: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "identity-secret-for-unit-tests-0123456789";

    fn token(secret: &str, sub: &str, ttl: Duration) -> String {
        let claims = IdentityClaims {
            sub: sub.into(),
            email: Some("a@example.com".into()),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(&Config::builder(SECRET).build().unwrap())
    }

    #[test]
    fn valid_token_yields_the_subject() {
        let caller = verifier()
            .verify(&token(SECRET, "user_2abc", Duration::minutes(5)))
            .unwrap();
        assert_eq!(caller.subject, "user_2abc");
        assert_eq!(caller.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let forged = token("some-other-secret-that-is-long-enough!!", "user_2abc", Duration::minutes(5));
        assert!(matches!(verifier().verify(&forged), Err(AppError::Jwt(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let stale = token(SECRET, "user_2abc", Duration::hours(-2));
        assert!(verifier().verify(&stale).is_err());
    }

    #[test]
    fn blank_subject_is_rejected() {
        let blank = token(SECRET, " ", Duration::minutes(5));
        assert!(matches!(verifier().verify(&blank), Err(AppError::Unauthenticated)));
    }
}
