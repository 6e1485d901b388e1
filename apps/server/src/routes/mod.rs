//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod brand;
pub mod report;
pub mod sale;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::AppState;

/// Liveness plus a database round-trip.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let database = state.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
        })),
    )
}
