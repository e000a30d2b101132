pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::merge::handlers;
use crate::state::AppState;

/// Headroom over the CV size limit for multipart framing and headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let cv_body_limit = state.config.max_cv_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/candidates/:candidate_id/profile/merge",
            post(handlers::handle_merge_profile),
        )
        .route(
            "/api/v1/candidates/:candidate_id/cv",
            post(handlers::handle_cv_upload).layer(DefaultBodyLimit::max(cv_body_limit)),
        )
        .with_state(state)
}
