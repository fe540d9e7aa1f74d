//! Token store accessor.
//!
//! Reads a user's device push tokens and removes the subset the gateway
//! rejected. Removal is best-effort cleanup: every failure is logged and
//! swallowed, and a missing user or non-matching token is a no-op.

use sqlx::PgPool;
use uuid::Uuid;

use pushbridge_common::types::UserRecord;

pub struct TokenStore;

impl TokenStore {
    /// Fetch a user record by id. `None` when the row does not exist (the
    /// user may have been deleted after the notification was queued).
    pub async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove every occurrence of each given token from the user's stored
    /// token list. Set-difference semantics: membership, not position, and
    /// the order of surviving tokens is preserved.
    ///
    /// Never fails from the caller's perspective.
    pub async fn remove_tokens(pool: &PgPool, user_id: Uuid, tokens: &[String]) {
        if tokens.is_empty() {
            return;
        }

        match Self::try_remove(pool, user_id, tokens).await {
            Ok(updated) => {
                if updated {
                    tracing::info!(
                        user_id = %user_id,
                        removed = tokens.len(),
                        "Removed invalid push tokens"
                    );
                }
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Token cleanup failed");
            }
        }
    }

    async fn try_remove(pool: &PgPool, user_id: Uuid, tokens: &[String]) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET push_tokens = (
                SELECT COALESCE(ARRAY_AGG(t ORDER BY ord), '{}')
                FROM UNNEST(push_tokens) WITH ORDINALITY AS u(t, ord)
                WHERE t <> ALL($2)
            ),
            updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(tokens)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
