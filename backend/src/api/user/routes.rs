//! Defines the HTTP routes for user profiles.
//!
//! The router expects an `Extension<Arc<UserService>>` layer from the caller.

use super::handlers::{become_seller, get_user};
use axum::{
    Router,
    routing::{get, post},
};

pub fn user_router() -> Router {
    Router::new()
        .route("/users/become-seller", post(become_seller))
        .route("/users/{username}", get(get_user))
}
