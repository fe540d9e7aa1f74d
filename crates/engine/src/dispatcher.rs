//! The fan-out pipeline run once for each created notification row.
//!
//! Single pass, no retries:
//! 1. Load the notification document; a missing row is a silent skip
//!    (notify redelivery races are expected, not errors)
//! 2. Skip already-read or untargeted documents before touching anything else
//! 3. Resolve the target user and their push tokens
//! 4. Build the outbound payload and multicast to every token
//! 5. Prune exactly the tokens the gateway rejected
//!
//! Errors bubble up to the listener loop, which logs and swallows them —
//! an invocation always completes from the trigger's point of view.

use sqlx::PgPool;
use uuid::Uuid;

use pushbridge_common::types::Notification;
use pushbridge_gateway::{MulticastReport, PushGateway, PushNotification};

use crate::payload::build_data_payload;
use crate::tokens::TokenStore;

/// Why a notification was skipped without any gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingDocument,
    AlreadyRead,
    NoTargetUser,
    UserNotFound,
    NoTokens,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDocument => write!(f, "missing_document"),
            SkipReason::AlreadyRead => write!(f, "already_read"),
            SkipReason::NoTargetUser => write!(f, "no_target_user"),
            SkipReason::UserNotFound => write!(f, "user_not_found"),
            SkipReason::NoTokens => write!(f, "no_tokens"),
        }
    }
}

/// Result of one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Skipped(SkipReason),
    Delivered { success: usize, failure: usize },
}

/// Skip conditions that depend only on the document itself.
/// Checked before any user fetch or gateway call.
pub fn skip_reason(doc: &Notification) -> Option<SkipReason> {
    if doc.read {
        return Some(SkipReason::AlreadyRead);
    }
    if doc.user_id.is_none() {
        return Some(SkipReason::NoTargetUser);
    }
    None
}

/// Select the tokens at failing indices of a multicast report.
/// `report.outcomes` is ordered like `tokens`, so this is a positional zip.
pub fn failed_tokens(tokens: &[String], report: &MulticastReport) -> Vec<String> {
    tokens
        .iter()
        .zip(report.outcomes.iter())
        .filter(|(_, outcome)| !outcome.success)
        .map(|(token, _)| token.clone())
        .collect()
}

/// The trigger handler. Holds the gateway handle; the pool is passed per
/// invocation, matching the stateless-unit execution model.
pub struct Dispatcher<G> {
    gateway: G,
}

impl<G: PushGateway> Dispatcher<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Run the pipeline for one created notification row.
    pub async fn handle_created(
        &self,
        pool: &PgPool,
        notification_id: Uuid,
    ) -> anyhow::Result<DispatchOutcome> {
        let doc: Option<Notification> = sqlx::query_as("SELECT * FROM notifications WHERE id = $1")
            .bind(notification_id)
            .fetch_optional(pool)
            .await?;

        let Some(doc) = doc else {
            tracing::info!(notification_id = %notification_id, "Notification row not found, skipping");
            return Ok(DispatchOutcome::Skipped(SkipReason::MissingDocument));
        };

        if let Some(reason) = skip_reason(&doc) {
            tracing::debug!(notification_id = %doc.id, reason = %reason, "Skipping notification");
            return Ok(DispatchOutcome::Skipped(reason));
        }

        let Some(user_id) = doc.user_id else {
            return Ok(DispatchOutcome::Skipped(SkipReason::NoTargetUser));
        };

        let Some(user) = TokenStore::fetch_user(pool, user_id).await? else {
            tracing::info!(
                notification_id = %doc.id,
                user_id = %user_id,
                "Target user not found, skipping"
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::UserNotFound));
        };

        if user.push_tokens.is_empty() {
            tracing::info!(
                notification_id = %doc.id,
                user_id = %user_id,
                "User has no push tokens, skipping"
            );
            return Ok(DispatchOutcome::Skipped(SkipReason::NoTokens));
        }

        let notification = PushNotification {
            title: doc.title.clone(),
            body: doc.message.clone(),
        };
        let data = build_data_payload(&doc, &user.user_type);

        tracing::info!(
            notification_id = %doc.id,
            user_id = %user_id,
            tokens = user.push_tokens.len(),
            notification_type = %doc.notification_type,
            "Dispatching push notification"
        );

        let report = self
            .gateway
            .send_multicast(&user.push_tokens, &notification, &data)
            .await?;

        if report.has_failures() {
            let failed = failed_tokens(&user.push_tokens, &report);
            TokenStore::remove_tokens(pool, user_id, &failed).await;
        }

        Ok(DispatchOutcome::Delivered {
            success: report.success_count,
            failure: report.failure_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pushbridge_gateway::SendOutcome;

    fn make_doc(read: bool, user_id: Option<Uuid>) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            title: "t".to_string(),
            message: "m".to_string(),
            notification_type: "general".to_string(),
            data: serde_json::json!({}),
            read,
            user_type: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_skip_already_read() {
        let doc = make_doc(true, Some(Uuid::new_v4()));
        assert_eq!(skip_reason(&doc), Some(SkipReason::AlreadyRead));
    }

    #[test]
    fn test_skip_missing_target() {
        let doc = make_doc(false, None);
        assert_eq!(skip_reason(&doc), Some(SkipReason::NoTargetUser));
    }

    #[test]
    fn test_unread_targeted_not_skipped() {
        let doc = make_doc(false, Some(Uuid::new_v4()));
        assert_eq!(skip_reason(&doc), None);
    }

    #[test]
    fn test_failed_tokens_are_positional() {
        let tokens = vec![
            "tok-a".to_string(),
            "tok-b".to_string(),
            "tok-c".to_string(),
        ];
        let report = MulticastReport::from_outcomes(vec![
            SendOutcome::ok(None),
            SendOutcome::failed("UNREGISTERED"),
            SendOutcome::failed("INVALID_ARGUMENT"),
        ]);
        assert_eq!(failed_tokens(&tokens, &report), vec!["tok-b", "tok-c"]);
    }

    #[test]
    fn test_no_failed_tokens_on_full_success() {
        let tokens = vec!["tok-a".to_string()];
        let report = MulticastReport::from_outcomes(vec![SendOutcome::ok(None)]);
        assert!(failed_tokens(&tokens, &report).is_empty());
    }
}
