//! Main entry point for the Storefront backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, builds the identity and profile services once and registers
//! all API routes.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use crate::auth::service::{AuthService, TokenSettings};
use crate::repositories::user_repository::UserRepository;
use crate::services::email_service::EmailService;
use crate::services::notifier::{LogNotifier, Notifier};
use crate::services::user_service::UserService;
use crate::utils::jwt::TokenService;
use crate::utils::password::BcryptHasher;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let db = Database::new(&config).await?;

    let accounts = Arc::new(UserRepository::new(db.pool().clone()));
    let hasher = Arc::new(BcryptHasher::new(config.bcrypt_cost));
    let tokens = TokenService::new(&config.jwt_secret);

    let notifier: Arc<dyn Notifier> = match config.email_config() {
        Some(email_config) => Arc::new(EmailService::new(email_config)?),
        None => {
            warn!("SMTP is not configured; verification and reset links will not be delivered");
            Arc::new(LogNotifier)
        }
    };

    let auth_service = Arc::new(AuthService::new(
        accounts.clone(),
        hasher.clone(),
        tokens,
        notifier,
        TokenSettings {
            verify_ttl: config.verify_token_ttl(),
            reset_ttl: config.reset_token_ttl(),
        },
    ));
    let user_service = Arc::new(UserService::new(accounts, hasher));

    let app = Router::new()
        .route("/", get(root_handler))
        .nest(
            "/req",
            auth::routes::auth_router().merge(api::user::routes::user_router()),
        )
        .layer(Extension(auth_service))
        .layer(Extension(user_service));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Starting Storefront server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "Storefront Backend",
            "version": env!("CARGO_PKG_VERSION")
        }),
        "Welcome to Storefront API",
    ))
}
