//! Health check / echo endpoint.
//!
//! Unauthenticated, used for deployment verification. Echoes back an
//! optional `message` query parameter.

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[derive(Debug, Deserialize)]
struct HealthQuery {
    message: Option<String>,
}

async fn health_check(Query(query): Query<HealthQuery>) -> Json<serde_json::Value> {
    let message = match query.message {
        Some(m) => format!("Echo: {}", m),
        None => "pushbridge-api is up".to_string(),
    };

    Json(json!({
        "success": true,
        "message": message,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
