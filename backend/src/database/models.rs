//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. `UserProfile` is the outward-facing projection of a
//! `User` and never carries the password hash or the outstanding token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted account row.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Outstanding verify-email or reset-password token, if any.
    pub verification_token: Option<String>,
    pub is_verified: bool,
    pub is_seller: bool,
    pub is_admin: bool,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The stored token, treating an empty string the same as no token.
    pub fn outstanding_token(&self) -> Option<&str> {
        self.verification_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// Data required to insert a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
    pub location: Option<String>,
}

/// Account details returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub is_seller: bool,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_verified: user.is_verified,
            is_seller: user.is_seller,
            is_admin: user.is_admin,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

/// Normalizes an email address for storage and lookup.
///
/// Addresses are compared case-insensitively everywhere, so they are stored
/// trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
