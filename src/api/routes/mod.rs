//! API routes module

pub mod appointments;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router(cors_enabled: bool) -> Router<SharedState> {
    Router::new()
        // The calendar document
        .nest("/appointments", appointments::router(cors_enabled))
}
