//! # courier-api
//!
//! HTTP API layer for Courier built on Axum.
//!
//! Provides the message CRUD endpoints, the sender control surface,
//! health checks, middleware, extractors, DTOs, and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
