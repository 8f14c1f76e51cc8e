pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::refinement::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document Improvement API
        .route(
            "/api/v1/documents",
            post(handlers::handle_create_document),
        )
        .route(
            "/api/v1/documents/:id",
            get(handlers::handle_get_document),
        )
        .route(
            "/api/v1/documents/:id/improve",
            post(handlers::handle_improve_document),
        )
        .route(
            "/api/v1/documents/:id/plans",
            get(handlers::handle_plan_history),
        )
        .with_state(state)
}
