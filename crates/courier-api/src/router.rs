//! Route definitions for the Courier HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(message_routes())
        .merge(sender_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Message CRUD endpoints
fn message_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            post(handlers::message::create_message).get(handlers::message::list_messages),
        )
        .route(
            "/messages/{id}",
            get(handlers::message::get_message)
                .put(handlers::message::update_message)
                .delete(handlers::message::delete_message),
        )
}

/// Sender control endpoints: start, stop, status
fn sender_routes() -> Router<AppState> {
    Router::new()
        .route("/sender/start", post(handlers::sender::start_sender))
        .route("/sender/stop", post(handlers::sender::stop_sender))
        .route("/sender/status", get(handlers::sender::sender_status))
}

/// Health endpoints
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
