//! Out-of-band delivery of verification and password-reset tokens.

use crate::errors::ServiceResult;
use async_trait::async_trait;

/// Delivers a token to the owner of an email address.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_verification_email(&self, email: &str, token: &str) -> ServiceResult<()>;

    async fn send_forgot_password_email(&self, email: &str, token: &str) -> ServiceResult<()>;
}

/// Used when SMTP is not configured. Records that a message would have gone
/// out without exposing the token.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_verification_email(&self, email: &str, _token: &str) -> ServiceResult<()> {
        tracing::warn!(
            "Email service not configured. Verification email not sent to {}",
            email
        );
        Ok(())
    }

    async fn send_forgot_password_email(&self, email: &str, _token: &str) -> ServiceResult<()> {
        tracing::warn!(
            "Email service not configured. Password reset email not sent to {}",
            email
        );
        Ok(())
    }
}
