//! Goalkeeper Manager
//!
//! REST backend over a relational database for scheduling goalkeepers to
//! matches, plus the dashboard client state that consumes it.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Every route answers unsupported methods with a JSON 405
    let api_routes = Router::new()
        // Goleiros
        .route(
            "/goleiros",
            get(api::list_goleiros).fallback(api::method_not_allowed),
        )
        .route(
            "/goleiros/{id}/toggle",
            post(api::toggle_goleiro).fallback(api::method_not_allowed),
        )
        // Partidas
        .route(
            "/partidas",
            get(api::list_partidas).fallback(api::method_not_allowed),
        )
        .route(
            "/partidas/{id}/assign",
            post(api::assign_goleiro).fallback(api::method_not_allowed),
        )
        // Diagnostics
        .route(
            "/test-db",
            get(api::test_db).fallback(api::method_not_allowed),
        );

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests;
