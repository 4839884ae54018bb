//! Core business logic for registration, email verification, login and
//! password reset.
//!
//! Tokens are stateless and replayable by signature alone. A token is only
//! honoured while it is also the value stored in `verification_token` on the
//! account, and it is consumed with a conditional update keyed on that value.

use crate::auth::errors::{AuthError, AuthResult};
use crate::auth::models::*;
use crate::database::models::{CreateUser, User, UserProfile, normalize_email};
use crate::errors::validation_message;
use crate::repositories::user_repository::{AccountStore, CreateUserError};
use crate::services::notifier::Notifier;
use crate::utils::jwt::{TokenError, TokenPurpose, TokenService};
use crate::utils::password::PasswordHasher;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use validator::Validate;

/// Lifetimes of the two token purposes.
#[derive(Debug, Clone, Copy)]
pub struct TokenSettings {
    pub verify_ttl: Duration,
    pub reset_ttl: Duration,
}

/// Identity service; built once at startup and shared between requests.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: TokenService,
    notifier: Arc<dyn Notifier>,
    settings: TokenSettings,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: TokenService,
        notifier: Arc<dyn Notifier>,
        settings: TokenSettings,
    ) -> Self {
        Self {
            accounts,
            hasher,
            tokens,
            notifier,
            settings,
        }
    }

    /// Registers a new account, or re-sends the verification link when the
    /// email belongs to an account that has not been verified yet.
    ///
    /// # Errors
    /// - `UsernameTaken` if the username is in use
    /// - `AlreadyRegistered` if the email belongs to a verified account
    /// - `Validation` for malformed input
    pub async fn register(&self, mut request: SignupRequest) -> AuthResult<RegistrationOutcome> {
        request.username = request.username.trim().to_string();
        request
            .validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let email = normalize_email(&request.email);

        if self.accounts.find_by_username(&request.username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        if let Some(existing) = self.accounts.find_by_email(&email).await? {
            return self.resend_verification(&existing, &email).await;
        }

        let password_hash = self.hash_password(&request.password).await?;
        let token = self.issue(&email, TokenPurpose::VerifyEmail)?;

        let created = self
            .accounts
            .create(CreateUser {
                username: request.username,
                email: email.clone(),
                password_hash,
                verification_token: token.clone(),
                location: request.location,
            })
            .await;

        let user = match created {
            Ok(user) => user,
            Err(CreateUserError::UsernameTaken) => return Err(AuthError::UsernameTaken),
            Err(CreateUserError::EmailTaken) => {
                // Lost an insert race on the email; treat it like any other
                // re-registration of that address.
                let existing = self
                    .accounts
                    .find_by_email(&email)
                    .await?
                    .ok_or(AuthError::AlreadyRegistered)?;
                return self.resend_verification(&existing, &email).await;
            }
            Err(CreateUserError::Database(source)) => return Err(AuthError::Internal(source)),
        };
        info!("Registered user {} pending verification", user.id);

        self.notify_verification(&email, &token).await;
        Ok(RegistrationOutcome::PendingVerification(user.into()))
    }

    /// Replaces the outstanding token of an unverified account and mails it.
    /// The stored password is left untouched.
    async fn resend_verification(
        &self,
        existing: &User,
        email: &str,
    ) -> AuthResult<RegistrationOutcome> {
        if existing.is_verified {
            return Err(AuthError::AlreadyRegistered);
        }

        let token = self.issue(email, TokenPurpose::VerifyEmail)?;
        if !self
            .accounts
            .reissue_verification_token(existing.id, &token)
            .await?
        {
            info!("User {} was verified before the token could be reissued", existing.id);
            return Err(AuthError::AlreadyRegistered);
        }
        info!("Verification token reissued for user {}", existing.id);

        self.notify_verification(email, &token).await;
        Ok(RegistrationOutcome::VerificationResent)
    }

    /// Consumes a verify-email token and marks the account verified.
    pub async fn verify_email(&self, token: &str) -> AuthResult<()> {
        let user = self
            .authoritative_account(token, TokenPurpose::VerifyEmail)
            .await?;

        if !self.accounts.mark_verified(user.id, token).await? {
            return Err(reject(user.id, "token consumed concurrently"));
        }

        info!("User {} verified their email", user.id);
        Ok(())
    }

    /// Checks credentials and returns the account.
    ///
    /// An unknown email yields `NotFound` while a wrong password yields
    /// `Unauthorized`, so the two cases are distinguishable by callers.
    /// Unverified accounts may log in.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<UserProfile> {
        request
            .validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let user = self.authenticate(&request.email, &request.password).await?;
        Ok(user.into())
    }

    /// Verifies an email/password pair and returns the stored account.
    async fn authenticate(&self, email: &str, password: &str) -> AuthResult<User> {
        let user = self
            .accounts
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self.verify_password(password, &user.password_hash).await? {
            warn!("Password mismatch for user {}", user.id);
            return Err(AuthError::Unauthorized);
        }

        Ok(user)
    }

    /// Issues a reset-password token, replacing any outstanding token, and
    /// mails it to the account owner.
    pub async fn forgot_password(&self, email: &str) -> AuthResult<()> {
        let email = normalize_email(email);
        let user = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::NotFound)?;

        let token = self.issue(&email, TokenPurpose::ResetPassword)?;
        self.accounts.set_verification_token(user.id, &token).await?;
        info!("Password reset requested for user {}", user.id);

        self.notify_forgot_password(&email, &token).await;
        Ok(())
    }

    /// Consumes a reset-password token and replaces the password.
    pub async fn reset_password(&self, request: ResetPasswordQuery) -> AuthResult<()> {
        request
            .validate()
            .map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let user = self
            .authoritative_account(&request.token, TokenPurpose::ResetPassword)
            .await?;

        let password_hash = self.hash_password(&request.new_password).await?;
        if !self
            .accounts
            .reset_password(user.id, &request.token, &password_hash)
            .await?
        {
            return Err(reject(user.id, "token consumed concurrently"));
        }

        info!("User {} reset their password", user.id);
        Ok(())
    }

    /// Resolves the account a token belongs to, provided the token is
    /// correctly signed, unexpired, of the expected purpose and still the
    /// value stored on that account.
    async fn authoritative_account(&self, token: &str, purpose: TokenPurpose) -> AuthResult<User> {
        let email = self.tokens.extract_subject(token).map_err(|_| {
            warn!("Rejected {:?} token: unreadable", purpose);
            AuthError::Forbidden
        })?;

        let Some(user) = self.accounts.find_by_email(&email).await? else {
            warn!("Rejected {:?} token: no matching account", purpose);
            return Err(AuthError::Forbidden);
        };

        let Some(stored) = user.outstanding_token() else {
            return Err(reject(user.id, "nothing outstanding"));
        };

        match self.tokens.validate(token, purpose) {
            Ok(_) => {}
            Err(TokenError::Expired) => return Err(reject(user.id, "expired")),
            Err(_) => return Err(reject(user.id, "invalid")),
        }

        if stored != token {
            return Err(reject(user.id, "superseded"));
        }

        Ok(user)
    }

    fn issue(&self, email: &str, purpose: TokenPurpose) -> AuthResult<String> {
        let ttl = match purpose {
            TokenPurpose::VerifyEmail => self.settings.verify_ttl,
            TokenPurpose::ResetPassword => self.settings.reset_ttl,
        };

        self.tokens
            .issue(email, purpose, ttl)
            .map_err(|e| AuthError::Internal(anyhow!(e)))
    }

    async fn hash_password(&self, password: &str) -> AuthResult<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();

        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| anyhow!("password hashing task failed: {e}"))??;

        Ok(digest)
    }

    async fn verify_password(&self, password: &str, digest: &str) -> AuthResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let digest = digest.to_string();

        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| anyhow!("password verification task failed: {e}"))??;

        Ok(matches)
    }

    async fn notify_verification(&self, email: &str, token: &str) {
        match self.notifier.send_verification_email(email, token).await {
            Ok(()) => info!("Verification email sent to {}", email),
            Err(e) => error!("Failed to send verification email to {}: {}", email, e),
        }
    }

    async fn notify_forgot_password(&self, email: &str, token: &str) {
        match self.notifier.send_forgot_password_email(email, token).await {
            Ok(()) => info!("Password reset email sent to {}", email),
            Err(e) => error!("Failed to send password reset email to {}: {}", email, e),
        }
    }
}

/// Logs why a token was refused and returns the single outward error.
fn reject(user_id: i64, reason: &str) -> AuthError {
    warn!("Rejected token for user {}: {}", user_id, reason);
    AuthError::Forbidden
}
