use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A notification document.
///
/// Created by the API endpoints (or any external writer), read once by the
/// listener when the insert trigger fires, never updated or deleted here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    /// Target user. NULL means "no target" and the listener skips the row.
    pub user_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    /// Free-form extra payload, flattened to string values before dispatch.
    pub data: serde_json::Value,
    pub read: bool,
    /// Optional target-user-category tag carried on the document itself.
    pub user_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user record, owned by the external user-management system.
///
/// This service reads `push_tokens` and `user_type`, and mutates
/// `push_tokens` only by removing entries the gateway rejected.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub user_type: String,
    pub push_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
