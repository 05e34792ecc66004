use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::state::AppState;

pub async fn health_check(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let health_data = state.db_provider.check_health().await;

    let status_code = if health_data.get("status").and_then(|s| s.as_str()) == Some("ok") {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_data))
}
