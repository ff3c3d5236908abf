use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{database, AppState};

/// Health endpoint with a database connectivity check
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_ok = database::ping(&state.db_pool).await;

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": if db_ok { "up" } else { "down" },
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
