use axum::extract::State;
use axum::Json;
use chrono::SecondsFormat;
use serde::Serialize;
use std::sync::Arc;

use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
    pub timestamp: String,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let now = chrono::Utc::now();

    Json(HealthStatus {
        status: "success",
        message: "Server is running",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: now.signed_duration_since(state.startup_time).num_seconds(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
