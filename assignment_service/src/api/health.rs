use std::time::Instant;

use axum::{Router, extract::State, response::Json, routing::get};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};


#[derive(Clone, Copy)]
struct HealthState {
    started_at: Instant,
}

/// Unauthenticated liveness routes
pub fn router(started_at: Instant) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/api/test", get(test))
        .route("/api/health", get(health))
        .with_state(HealthState { started_at })
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn banner() -> Json<Value> {
    Json(json!({
        "message": "DP Numbers API Server is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": timestamp(),
    }))
}

async fn test() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "API endpoint working!",
        "timestamp": timestamp(),
    }))
}

#[tracing::instrument(skip(state))]
async fn health(State(state): State<HealthState>) -> Json<Value> {
    tracing::debug!("health check requested");

    Json(json!({
        "status": "OK",
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "timestamp": timestamp(),
    }))
}
