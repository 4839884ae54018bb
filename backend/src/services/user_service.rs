//! User profile business logic service.
//!
//! Handles public profile lookups and the seller role grant.

use crate::auth::models::LoginRequest;
use crate::database::models::{UserProfile, normalize_email};
use crate::errors::{ServiceError, ServiceResult, validation_message};
use crate::repositories::user_repository::AccountStore;
use crate::utils::password::PasswordHasher;
use anyhow::anyhow;
use std::sync::Arc;
use validator::Validate;

pub struct UserService {
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Creates a new UserService instance.
    pub fn new(accounts: Arc<dyn AccountStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { accounts, hasher }
    }

    /// Retrieves a user's public profile by username.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if no such user exists
    pub async fn get_profile(&self, username: &str) -> ServiceResult<UserProfile> {
        let user = self
            .accounts
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| ServiceError::not_found("User", username))?;

        Ok(user.into())
    }

    /// Grants the seller role to the owner of the given credentials.
    ///
    /// This is the only code path that writes `is_seller`; the flag never
    /// reverts.
    ///
    /// # Errors
    /// - `Validation` for empty credentials
    /// - `NotFound` if no account has this email
    /// - `Unauthorized` if the password does not match
    pub async fn become_seller(&self, credentials: LoginRequest) -> ServiceResult<UserProfile> {
        credentials
            .validate()
            .map_err(|e| ServiceError::validation(validation_message(&e)))?;

        let email = normalize_email(&credentials.email);
        let user = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &email))?;

        let hasher = Arc::clone(&self.hasher);
        let digest = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || {
            hasher.verify(&credentials.password, &digest)
        })
        .await
        .map_err(|e| anyhow!("password verification task failed: {e}"))??;
        if !matches {
            return Err(ServiceError::unauthorized("Please check the password"));
        }

        if !user.is_seller {
            self.accounts.set_seller(user.id).await?;
            tracing::info!("User {} became a seller", user.id);
        }

        let user = self
            .accounts
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", &email))?;

        Ok(user.into())
    }
}
