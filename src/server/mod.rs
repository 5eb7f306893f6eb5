//! REST surface
//!
//! Routes:
//! - `GET /health`
//! - `POST /upload-medicine-photo/` (multipart, field `file`)
//! - `POST /get_item_info` (JSON lookup request)

pub mod error;
pub mod handlers;

use crate::core::pipeline::RelayPipeline;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use handlers::{get_item_info, health, upload_medicine_photo};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RelayPipeline>,
}

/// Create REST API router
pub fn create_router(pipeline: Arc<RelayPipeline>, max_upload_bytes: usize) -> Router {
    let state = AppState { pipeline };

    Router::new()
        .route("/health", get(health))
        .route("/upload-medicine-photo/", post(upload_medicine_photo))
        .route("/get_item_info", post(get_item_info))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
