//! Notification creation routes.
//!
//! Both routes require an authenticated caller (presence of a valid bearer
//! token; no further authorization). Each successful call performs exactly
//! one logical store write — a single row insert, or one atomic batch for
//! the broadcast — which in turn fires the insert trigger consumed by the
//! listener process.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use pushbridge_common::error::AppError;
use pushbridge_engine::notifications::{
    BroadcastParams, CreateNotificationParams, NotificationService,
};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", post(create_notification))
        .route("/api/notifications/broadcast", post(broadcast_notification))
}

/// Response for a single-user create.
#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub notification_id: Uuid,
    pub message: String,
}

/// Response for a broadcast.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub success: bool,
    pub count: u64,
    pub message: String,
}

/// POST /api/notifications — Create a notification for a single user.
async fn create_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<CreateNotificationParams>,
) -> Result<Json<CreateResponse>, AppError> {
    let notification_id = NotificationService::create(&state.pool, &params).await?;

    tracing::info!(
        caller_id = %auth.caller_id,
        notification_id = %notification_id,
        "Notification created via API"
    );

    Ok(Json(CreateResponse {
        success: true,
        notification_id,
        message: "Notification sent successfully".to_string(),
    }))
}

/// POST /api/notifications/broadcast — Create one notification per user in
/// the target category, as a single atomic batch.
async fn broadcast_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(params): Json<BroadcastParams>,
) -> Result<Json<BroadcastResponse>, AppError> {
    let count = NotificationService::broadcast(&state.pool, &params).await?;

    tracing::info!(
        caller_id = %auth.caller_id,
        count,
        "Broadcast created via API"
    );

    Ok(Json(BroadcastResponse {
        success: true,
        count,
        message: format!("Notified {} users", count),
    }))
}
