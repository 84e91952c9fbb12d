use axum::{Json, extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::state::AppState;

pub async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "started_at": state.started_at.to_rfc3339(),
        "paths": state.stats().snapshot(),
    }))
}
