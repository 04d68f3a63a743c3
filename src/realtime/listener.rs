//! Bridge from PostgreSQL `NOTIFY` to the [`ChangeBus`].
//!
//! Table triggers send one JSON payload per row change on the
//! [`CHANNEL`] channel. This task decodes them, publishes them on the bus
//! and keeps the bus status in step with the connection.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::task::JoinHandle;

use crate::domain::{ChangeBus, ChangeEvent, SubscriptionStatus};

/// Notification channel the table triggers write to.
pub const CHANNEL: &str = "table_changes";

/// Wait between reconnect attempts after the listener fails.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Spawns the listener task.
///
/// The task runs until aborted, reconnecting after failures. Each failure
/// sets [`SubscriptionStatus::ChannelError`]; each successful `LISTEN`
/// sets [`SubscriptionStatus::Subscribed`].
#[must_use]
pub fn spawn_listener(pool: PgPool, bus: ChangeBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listen(&pool, &bus).await {
                Ok(()) => tracing::warn!("change listener connection lost"),
                Err(e) => tracing::error!(error = %e, "change listener failed"),
            }
            bus.set_status(SubscriptionStatus::ChannelError);
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}

/// Listens until the connection drops (`Ok`) or a database error occurs.
async fn listen(pool: &PgPool, bus: &ChangeBus) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANNEL).await?;
    bus.set_status(SubscriptionStatus::Subscribed);
    tracing::info!(channel = CHANNEL, "change listener subscribed");

    while let Some(notification) = listener.try_recv().await? {
        if let Some(change) = decode_notification(notification.payload()) {
            let receivers = bus.publish(change);
            tracing::trace!(receivers, "change forwarded");
        }
    }
    Ok(())
}

/// Decodes a trigger payload; malformed payloads are logged and skipped.
#[must_use]
pub fn decode_notification(payload: &str) -> Option<ChangeEvent> {
    match serde_json::from_str::<ChangeEvent>(payload) {
        Ok(change) => Some(change),
        Err(e) => {
            tracing::warn!(error = %e, "undecodable change notification");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ChangeKind, WatchedTable};

    #[test]
    fn decodes_trigger_payload() {
        let payload = r#"{
            "table": "participants",
            "event_type": "DELETE",
            "new": null,
            "old": {"id": "6f1c3b1e-8a0e-4c43-9a55-2f3b1d9f4a10",
                    "event_id": "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed"},
            "committed_at": "2025-01-05T15:04:00Z"
        }"#;
        let Some(change) = decode_notification(payload) else {
            panic!("payload should decode");
        };
        assert_eq!(change.table, WatchedTable::Participants);
        assert_eq!(change.kind, ChangeKind::Delete);
        assert!(change.new.is_none());
        assert_eq!(
            change.event_id().map(|id| id.to_string()),
            Some("1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed".to_string())
        );
    }

    #[test]
    fn rejects_unknown_tables() {
        let payload = r#"{"table": "orders", "event_type": "INSERT", "new": {}}"#;
        assert!(decode_notification(payload).is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_notification("not json").is_none());
    }

    #[test]
    fn decodes_key_only_entry_payload() {
        let payload = r#"{
            "table": "user_entries",
            "event_type": "INSERT",
            "new": {"id": "6f1c3b1e-8a0e-4c43-9a55-2f3b1d9f4a10",
                    "selected_event_id": "1b9d6bcd-bbfd-4b2d-9b5d-ab8dfbbd4bed"},
            "old": null,
            "committed_at": "2025-01-05T15:04:00Z"
        }"#;
        let Some(change) = decode_notification(payload) else {
            panic!("payload should decode");
        };
        assert_eq!(change.table, WatchedTable::UserEntries);
        assert_eq!(
            change.row_id().map(|id| id.to_string()),
            Some("6f1c3b1e-8a0e-4c43-9a55-2f3b1d9f4a10".to_string())
        );
    }

    #[test]
    fn trigger_sends_row_keys_only() {
        let migration = include_str!("../../migrations/20250101000002_notify_row_keys.sql");
        assert!(migration.contains("notify_row_keys(to_jsonb(NEW))"));
        assert!(migration.contains("notify_row_keys(to_jsonb(OLD))"));
        assert!(!migration.contains("ELSE to_jsonb(NEW) END"));
        assert!(!migration.contains("ELSE to_jsonb(OLD) END"));
    }
}
