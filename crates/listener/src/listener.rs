//! NOTIFY consumer loop.
//!
//! An AFTER INSERT trigger on `notifications` raises a NOTIFY on
//! `notification_created` with the new row's id as payload; this listener
//! consumes the channel and runs the dispatcher once per event. Events are
//! processed sequentially in arrival order within this process, but there is
//! no cross-process ordering or redelivery guarantee — delivery is
//! best-effort, and events raised while the listener is down are not
//! replayed.

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use uuid::Uuid;

use pushbridge_engine::dispatcher::{DispatchOutcome, Dispatcher};
use pushbridge_gateway::PushGateway;

/// Channel raised by the insert trigger (see migrations).
pub const NOTIFY_CHANNEL: &str = "notification_created";

pub struct NotificationListener<G> {
    pool: PgPool,
    dispatcher: Dispatcher<G>,
}

impl<G: PushGateway> NotificationListener<G> {
    pub fn new(pool: PgPool, gateway: G) -> Self {
        Self {
            pool,
            dispatcher: Dispatcher::new(gateway),
        }
    }

    /// Subscribe and process events until the task is cancelled or the
    /// database connection is lost for good.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        tracing::info!(channel = NOTIFY_CHANNEL, "Notification listener started");

        loop {
            let event = listener.recv().await?;
            self.handle_payload(event.payload()).await;
        }
    }

    /// Process one NOTIFY payload. Never fails: malformed payloads and
    /// pipeline errors are logged and swallowed so the loop keeps running —
    /// every event counts as handled.
    pub async fn handle_payload(&self, payload: &str) {
        let Some(id) = parse_notification_id(payload) else {
            tracing::warn!(payload, "Ignoring malformed notification event");
            return;
        };

        match self.dispatcher.handle_created(&self.pool, id).await {
            Ok(DispatchOutcome::Delivered { success, failure }) => {
                tracing::info!(
                    notification_id = %id,
                    success,
                    failure,
                    "Notification dispatched"
                );
            }
            Ok(DispatchOutcome::Skipped(reason)) => {
                tracing::debug!(notification_id = %id, reason = %reason, "Notification skipped");
            }
            Err(e) => {
                tracing::error!(notification_id = %id, error = %e, "Notification dispatch failed");
            }
        }
    }
}

/// Parse the NOTIFY payload (the notification row id).
pub fn parse_notification_id(payload: &str) -> Option<Uuid> {
    Uuid::parse_str(payload.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_payload() {
        let id = Uuid::new_v4();
        assert_eq!(parse_notification_id(&id.to_string()), Some(id));
        assert_eq!(parse_notification_id(&format!("  {}\n", id)), Some(id));
    }

    #[test]
    fn test_parse_garbage_payload() {
        assert_eq!(parse_notification_id("not-a-uuid"), None);
        assert_eq!(parse_notification_id(""), None);
    }
}
