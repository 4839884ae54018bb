//! Signed, expiring, single-purpose tokens for email verification and
//! password reset.
//!
//! Tokens are HS256 JWTs binding an email address to a purpose and an expiry.
//! The service is stateless: whether a token is still *authoritative* is
//! decided by the caller comparing it against the copy stored on the account.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    VerifyEmail,
    ResetPassword,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed structure or wrong purpose.
    #[error("token is invalid")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Claims carried by every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject email
    pub sub: String,
    pub purpose: TokenPurpose,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Unique id, so two tokens for the same subject never collide
    pub jti: String,
}

/// Issues and validates purpose-bound tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token for `email` valid for `ttl` from now.
    pub fn issue(
        &self,
        email: &str,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(email, purpose, Utc::now(), ttl)
    }

    /// Issues a token as if it had been created at `issued_at`.
    pub fn issue_at(
        &self,
        email: &str,
        purpose: TokenPurpose,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| TokenError::Encoding(format!("ttl out of range: {e}")))?;

        let claims = Claims {
            sub: email.to_string(),
            purpose,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::now_v7().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Reads the subject of a correctly signed token without checking expiry
    /// or purpose. Used only to find the account the token claims to belong to.
    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Self::validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|_| TokenError::Invalid)
    }

    /// Fully validates a token: signature, structure, expiry and purpose.
    pub fn validate(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Self::validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        if claims.purpose != purpose {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }
}
