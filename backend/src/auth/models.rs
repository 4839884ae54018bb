//! Request and response types of the identity endpoints.

use crate::database::models::UserProfile;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Username must be between 1-255 characters"
    ))]
    pub username: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    pub location: Option<String>,
}

/// Login request payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `?token=` of the verification link
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: String,
}

/// `?email=` of a password reset request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordQuery {
    pub email: String,
}

/// `?token=&newPassword=` of a password reset
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordQuery {
    pub token: String,

    #[serde(rename = "newPassword")]
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Result of a successful signup call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    /// A new, unverified account was created.
    PendingVerification(UserProfile),
    /// The email belonged to an unverified account; a fresh link was sent.
    VerificationResent,
}
