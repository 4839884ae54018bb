//! Handler functions for the identity endpoints.
//!
//! These functions extract request data, delegate to `AuthService` and map
//! outcomes onto status codes.

use crate::api::common::{ApiResponse, auth_error_to_http};
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::database::models::UserProfile;
use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::Json as ResponseJson,
};
use std::sync::Arc;

type HandlerResult<T> = Result<(StatusCode, ResponseJson<ApiResponse<T>>), (StatusCode, String)>;

/// Handle signup: creates an account or re-sends the verification link
#[axum::debug_handler]
pub async fn signup(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Json(payload): Json<SignupRequest>,
) -> HandlerResult<RegistrationOutcome> {
    match auth_service.register(payload).await {
        Ok(outcome @ RegistrationOutcome::PendingVerification(_)) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(
                outcome,
                "Registration successful! Please verify your email",
            )),
        )),
        Ok(outcome @ RegistrationOutcome::VerificationResent) => Ok((
            StatusCode::OK,
            ResponseJson(ApiResponse::success(
                outcome,
                "Verification email resent. Check your inbox",
            )),
        )),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Handle the verification link
#[axum::debug_handler]
pub async fn verify_email(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Query(query): Query<VerifyEmailQuery>,
) -> HandlerResult<()> {
    match auth_service.verify_email(&query.token).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            ResponseJson(ApiResponse::message("Email successfully verified!")),
        )),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Json(payload): Json<LoginRequest>,
) -> HandlerResult<UserProfile> {
    match auth_service.login(payload).await {
        Ok(profile) => Ok((
            StatusCode::OK,
            ResponseJson(ApiResponse::success(profile, "Login successful")),
        )),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Handle a password reset request
#[axum::debug_handler]
pub async fn forgot_password(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Query(query): Query<ForgotPasswordQuery>,
) -> HandlerResult<()> {
    match auth_service.forgot_password(&query.email).await {
        Ok(()) => Ok((
            StatusCode::OK,
            ResponseJson(ApiResponse::message(format!(
                "Password reset email sent to {}",
                query.email.trim()
            ))),
        )),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Handle a password reset
#[axum::debug_handler]
pub async fn reset_password(
    Extension(auth_service): Extension<Arc<AuthService>>,
    Query(query): Query<ResetPasswordQuery>,
) -> HandlerResult<()> {
    match auth_service.reset_password(query).await {
        Ok(()) => Ok((
            StatusCode::OK,
            ResponseJson(ApiResponse::message("Password changed successfully!")),
        )),
        Err(error) => Err(auth_error_to_http(error)),
    }
}
