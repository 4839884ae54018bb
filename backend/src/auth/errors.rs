//! Error taxonomy of the identity flows.
//!
//! Every token failure (bad signature, expiry, wrong purpose, superseded or
//! already consumed) collapses into `Forbidden` so callers cannot tell which
//! check rejected the token.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username not available")]
    UsernameTaken,

    #[error("User already exists and is verified")]
    AlreadyRegistered,

    #[error("No user found for these credentials, please register")]
    NotFound,

    #[error("Please check the password")]
    Unauthorized,

    #[error("Invalid or expired token")]
    Forbidden,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;
