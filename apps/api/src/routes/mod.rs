pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::experience::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/experience/parse", post(handlers::handle_parse))
        .route("/api/v1/experience/convert", post(handlers::handle_convert))
        .route("/api/v1/experience/summary", post(handlers::handle_summary))
        .route("/api/v1/experience/format", post(handlers::handle_format))
        .with_state(state)
}
