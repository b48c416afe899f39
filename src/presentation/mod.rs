// Presentation layer - HTTP API over the dashboard state and settings editors
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    cancel_phone, cancel_thresholds, get_dashboard, get_phone, get_table, get_thresholds,
    health_check, open_phone, open_thresholds, save_phone, save_thresholds, stream_dashboard,
    update_table,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/table", get(get_table).post(update_table))
        .route("/settings/thresholds", get(get_thresholds).post(save_thresholds))
        .route("/settings/thresholds/open", post(open_thresholds))
        .route("/settings/thresholds/cancel", post(cancel_thresholds))
        .route("/settings/phone", get(get_phone).post(save_phone))
        .route("/settings/phone/open", post(open_phone))
        .route("/settings/phone/cancel", post(cancel_phone))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
