//! Notification creation service — backs the API endpoints.
//!
//! Field validation happens here, before any write, so an invalid request
//! performs zero store writes. Timestamps and ids are assigned by the store
//! (column defaults), never by the caller.

use sqlx::PgPool;
use uuid::Uuid;

use pushbridge_common::error::AppError;

/// Parameters for creating a single-user notification.
///
/// Required fields are `Option` so that missing values surface as a
/// validation error rather than a deserialization rejection.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateNotificationParams {
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub notification_type: Option<String>,
    pub data: Option<serde_json::Value>,
}

/// Parameters for broadcasting to a filtered user set.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BroadcastParams {
    pub title: Option<String>,
    pub message: Option<String>,
    pub notification_type: Option<String>,
    /// User category to target; `"all"` or absent targets every user.
    pub target_category: Option<String>,
    pub data: Option<serde_json::Value>,
}

pub struct NotificationService;

impl NotificationService {
    /// Create one notification document. Returns the store-generated id.
    pub async fn create(
        pool: &PgPool,
        params: &CreateNotificationParams,
    ) -> Result<Uuid, AppError> {
        let user_id = params
            .user_id
            .ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
        let title = require_text("title", params.title.as_deref())?;
        let message = require_text("message", params.message.as_deref())?;

        let notification_type = params.notification_type.as_deref().unwrap_or("general");
        let data = params.data.clone().unwrap_or(serde_json::json!({}));
        let user_type = data
            .get("user_type")
            .and_then(|v| v.as_str())
            .unwrap_or("customer")
            .to_string();

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type, data, read, user_type)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(message)
        .bind(notification_type)
        .bind(&data)
        .bind(&user_type)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            notification_id = %id,
            user_id = %user_id,
            notification_type,
            "Notification created"
        );

        Ok(id)
    }

    /// Create one notification per user in the target category, as a single
    /// atomic batch. `"all"` (or no category) targets every user. Returns
    /// the number of users notified.
    pub async fn broadcast(pool: &PgPool, params: &BroadcastParams) -> Result<u64, AppError> {
        let title = require_text("title", params.title.as_deref())?;
        let message = require_text("message", params.message.as_deref())?;

        let notification_type = params.notification_type.as_deref().unwrap_or("general");
        let data = params.data.clone().unwrap_or(serde_json::json!({}));
        let category = params.target_category.as_deref().filter(|c| *c != "all");

        let recipients: Vec<(Uuid, String)> = match category {
            Some(user_type) => {
                sqlx::query_as("SELECT id, user_type FROM users WHERE user_type = $1")
                    .bind(user_type)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT id, user_type FROM users")
                    .fetch_all(pool)
                    .await?
            }
        };

        let mut tx = pool.begin().await?;
        for (user_id, user_type) in &recipients {
            sqlx::query(
                r#"
                INSERT INTO notifications (user_id, title, message, notification_type, data, read, user_type)
                VALUES ($1, $2, $3, $4, $5, FALSE, $6)
                "#,
            )
            .bind(user_id)
            .bind(title)
            .bind(message)
            .bind(notification_type)
            .bind(&data)
            .bind(user_type)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        let count = recipients.len() as u64;
        tracing::info!(
            count,
            target_category = params.target_category.as_deref().unwrap_or("all"),
            "Broadcast notifications created"
        );

        Ok(count)
    }
}

/// Validate that a required text field is present and non-blank.
fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_rejects_missing() {
        assert!(require_text("title", None).is_err());
    }

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(require_text("title", Some("   ")).is_err());
    }

    #[test]
    fn test_require_text_accepts_value() {
        assert_eq!(require_text("title", Some("hello")).unwrap(), "hello");
    }
}
