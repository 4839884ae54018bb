//! Handler functions for user profile endpoints.
//!
//! These functions process requests for public profile data and the seller
//! role grant, delegating to `UserService`.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::auth::models::LoginRequest;
use crate::database::models::UserProfile;
use crate::services::user_service::UserService;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;

/// Retrieves a user's public profile by username.
#[axum::debug_handler]
pub async fn get_user(
    Extension(user_service): Extension<Arc<UserService>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, (StatusCode, String)> {
    tracing::debug!("Getting profile for username: {}", username);

    let profile = user_service
        .get_profile(&username)
        .await
        .map_err(service_error_to_http)?;

    Ok(Json(ApiResponse::success(
        profile,
        "User retrieved successfully",
    )))
}

/// Grants the seller role to the account owning the supplied credentials.
#[axum::debug_handler]
pub async fn become_seller(
    Extension(user_service): Extension<Arc<UserService>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, (StatusCode, String)> {
    let profile = user_service.become_seller(payload).await.map_err(|e| {
        tracing::warn!("Seller upgrade rejected: {}", e);
        service_error_to_http(e)
    })?;

    Ok(Json(ApiResponse::success(profile, "You are now a seller")))
}
