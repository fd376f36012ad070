//! Accounts API — user-account service for the Phonebook contacts app
//!
//! Provides REST endpoints for:
//! - Registration with email verification
//! - Password login and single-session tokens
//! - Subscription tier management
//! - Avatar upload and processing

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod avatar;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;
pub mod store;

use state::AppState;

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let avatars_dir = state.avatars.dir().to_path_buf();

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Public account endpoints
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/verify/:token", get(handlers::verify))
        .route("/users/verify", post(handlers::resend_verification))
        // Authenticated account endpoints
        .route("/users/current", get(handlers::current))
        .route("/users/logout", post(handlers::logout))
        .route("/users", patch(handlers::update_subscription))
        .route("/users/avatars", patch(handlers::update_avatar))
        // Stored avatar assets
        .nest_service("/avatars", ServeDir::new(avatars_dir))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
