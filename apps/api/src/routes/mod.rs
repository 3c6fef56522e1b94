pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::applications::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis
        .route("/analyze", post(handle_analyze).layer(upload_limit.clone()))
        .route("/api/v1/analyze", post(handle_analyze).layer(upload_limit))
        // Saved applications
        .route(
            "/api/v1/applications",
            get(handlers::handle_list_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(handlers::handle_get_application),
        )
        .with_state(state)
}
