// HTTP request handlers
use crate::application::aggregator::{IgnoreReason, Outcome};
use crate::application::settings_service::{EditorState, SettingsEditor};
use crate::domain::dashboard::TableView;
use crate::domain::settings::{NotificationConfig, ThresholdConfig};
use crate::infrastructure::chunked_stream::stream_from_watch;
use crate::infrastructure::http_response::{
    accepts_brotli, json_response, json_response_with_status,
};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableQuery {
    pub page: Option<usize>,
    pub rows_per_page: Option<usize>,
}

fn finish(result: Result<Response<Body>, StatusCode>) -> Response<Body> {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Live snapshot and the three charts
pub async fn get_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let view = state.dashboard.current().dashboard();
    finish(json_response(&view, accepts_brotli(&headers)).await)
}

/// Stream a dashboard view now and after every state change
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut shutdown = state.shutdown.clone();
    let stop = async move {
        let stopped = shutdown.wait_for(|stop| *stop).await.is_ok();
        if !stopped {
            std::future::pending::<()>().await;
        }
    };

    stream_from_watch(
        state.dashboard.subscribe(),
        |dashboard| dashboard.dashboard(),
        accepts_brotli(&headers),
        stop,
    )
}

fn invalid_rows_per_page() -> Response<Body> {
    (StatusCode::BAD_REQUEST, "rowsPerPage must be greater than zero").into_response()
}

/// Table page. Query values shape this response only; the shared position,
/// moved through `POST /table`, fills in whatever is not given.
pub async fn get_table(
    Query(query): Query<TableQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let current = state.dashboard.current();
    let mut table = current.table;
    if let Some(rows) = query.rows_per_page {
        if rows != table.rows_per_page() && !table.set_rows_per_page(rows) {
            return invalid_rows_per_page();
        }
    }
    if let Some(page) = query.page {
        table.set_page(page);
    }

    let view = TableView::new(&current.table_rows, &table, &state.status_colors);
    finish(json_response(&view, accepts_brotli(&headers)).await)
}

/// Move the shared table position, then return the resulting page
pub async fn update_table(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(change): Json<TableQuery>,
) -> impl IntoResponse {
    if let Some(rows) = change.rows_per_page {
        if rows != state.dashboard.current().table.rows_per_page() {
            let outcome = state.dashboard.change_rows_per_page(rows).await;
            if outcome == Some(Outcome::Ignored(IgnoreReason::InvalidRowsPerPage)) {
                return invalid_rows_per_page();
            }
        }
    }
    if let Some(page) = change.page {
        state.dashboard.change_page(page).await;
    }

    let view = state.dashboard.current().table_view(&state.status_colors);
    finish(json_response(&view, accepts_brotli(&headers)).await)
}

async fn editor_response<T: Serialize>(
    status: StatusCode,
    view: &EditorState<T>,
    headers: &HeaderMap,
) -> Response<Body> {
    finish(json_response_with_status(status, view, accepts_brotli(headers)).await)
}

async fn save_draft<T>(editor: &SettingsEditor<T>, draft: T, headers: &HeaderMap) -> Response<Body>
where
    T: Clone + Default + Serialize + Send + Sync + 'static,
{
    editor.edit(draft).await;
    match editor.save().await {
        Ok(view) => editor_response(StatusCode::OK, &view, headers).await,
        Err((_, view)) => editor_response(StatusCode::BAD_GATEWAY, &view, headers).await,
    }
}

pub async fn get_thresholds(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    editor_response(StatusCode::OK, &state.thresholds.view().await, &headers).await
}

pub async fn open_thresholds(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    editor_response(StatusCode::OK, &state.thresholds.open().await, &headers).await
}

pub async fn cancel_thresholds(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    editor_response(StatusCode::OK, &state.thresholds.cancel().await, &headers).await
}

pub async fn save_thresholds(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ThresholdConfig>,
) -> impl IntoResponse {
    save_draft(&state.thresholds, draft, &headers).await
}

pub async fn get_phone(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    editor_response(StatusCode::OK, &state.phone.view().await, &headers).await
}

pub async fn open_phone(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    editor_response(StatusCode::OK, &state.phone.open().await, &headers).await
}

pub async fn cancel_phone(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    editor_response(StatusCode::OK, &state.phone.cancel().await, &headers).await
}

pub async fn save_phone(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<NotificationConfig>,
) -> impl IntoResponse {
    save_draft(&state.phone, draft, &headers).await
}
