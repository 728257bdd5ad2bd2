use crate::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

#[axum::debug_handler]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map(|_| "up")
        .unwrap_or("down");

    Json(json!({
        "status": "ok",
        "database": database,
        "active_sessions": state.session_service.active_sessions(),
    }))
}
