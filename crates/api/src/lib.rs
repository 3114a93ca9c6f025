//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Response envelopes and error mapping

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use atrium_core::storage::ObjectStore;
use atrium_shared::JwtService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Object store for profile photos.
    pub storage: Arc<ObjectStore>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    // Multipart photo uploads can exceed axum's 2MB default body limit;
    // the storage layer enforces the real per-file maximum.
    let body_limit = usize::try_from(state.storage.config().max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(64 * 1024);

    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
