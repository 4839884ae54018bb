//! Defines the HTTP routes for signup, verification, login and password reset.
//!
//! The router expects an `Extension<Arc<AuthService>>` layer from the caller.

use crate::auth::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signup/verify", get(verify_email))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::tests::harness;
    use crate::repositories::user_repository::AccountStore;
    use axum::{
        Extension,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn signup_verify_login_flow() {
        let h = harness().await;
        let notifier = h.notifier.clone();
        let store = h.store.clone();
        let router = Router::new()
            .nest("/req", auth_router())
            .layer(Extension(Arc::new(h.service)));

        let signup_body = json!({
            "username": "alice",
            "email": "alice@x.com",
            "password": "pw1"
        });
        let (status, body) = send(&router, post_json("/req/signup", signup_body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending_verification");
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert!(body["data"]["user"].get("passwordHash").is_none());

        // The username check runs before the email lookup.
        let (status, body) = send(&router, post_json("/req/signup", signup_body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["error_type"], "username_taken");

        let resend_body = json!({
            "username": "alice2",
            "email": "alice@x.com",
            "password": "pw1"
        });
        let (status, body) = send(&router, post_json("/req/signup", resend_body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "verification_resent");

        let token = notifier.last_token_for("alice@x.com").unwrap();
        let (status, _) = send(&router, get(&format!("/req/signup/verify?token={token}"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(store.find_by_email("alice@x.com").await.unwrap().unwrap().is_verified);

        let (status, body) = send(&router, get(&format!("/req/signup/verify?token={token}"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or expired token");

        let (status, body) = send(
            &router,
            post_json("/req/login", json!({"email": "alice@x.com", "password": "pw1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["isVerified"], true);

        let (status, _) = send(
            &router,
            post_json("/req/login", json!({"email": "alice@x.com", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &router,
            post_json("/req/login", json!({"email": "bob@x.com", "password": "pw1"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn signup_conflicts_are_bad_requests() {
        let h = harness().await;
        let router = Router::new()
            .nest("/req", auth_router())
            .layer(Extension(Arc::new(h.service)));

        let (status, _) = send(
            &router,
            post_json(
                "/req/signup",
                json!({"username": "alice", "email": "alice@x.com", "password": "pw1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &router,
            post_json(
                "/req/signup",
                json!({"username": "alice", "email": "other@x.com", "password": "pw1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["error_type"], "username_taken");

        let (status, body) = send(
            &router,
            post_json(
                "/req/signup",
                json!({"username": "carol", "email": "bad-email", "password": "pw1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["error_type"], "validation_error");
    }

    #[tokio::test]
    async fn forgot_and_reset_password_over_http() {
        let h = harness().await;
        let notifier = h.notifier.clone();
        let router = Router::new()
            .nest("/req", auth_router())
            .layer(Extension(Arc::new(h.service)));

        send(
            &router,
            post_json(
                "/req/signup",
                json!({"username": "alice", "email": "alice@x.com", "password": "pw1"}),
            ),
        )
        .await;

        let (status, _) = send(&router, post("/req/forgot-password?email=nobody@x.com")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&router, post("/req/forgot-password?email=alice@x.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Password reset email sent to alice@x.com");

        let token = notifier.last_token_for("alice@x.com").unwrap();
        let uri = format!("/req/reset-password?token={token}&newPassword=pw2");
        let (status, _) = send(&router, post(&uri)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, post(&uri)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &router,
            post_json("/req/login", json!({"email": "alice@x.com", "password": "pw2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn verify_with_garbage_token_is_forbidden() {
        let h = harness().await;
        let router = Router::new()
            .nest("/req", auth_router())
            .layer(Extension(Arc::new(h.service)));

        let (status, body) = send(&router, get("/req/signup/verify?token=garbage")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["error_type"], "invalid_token");
    }
}
