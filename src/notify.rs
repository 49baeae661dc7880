// Notification collaborator: fire-and-forget event delivery.
//
// The engine reports what happened; delivery, storage, and read-state
// bookkeeping belong to whatever sits behind the trait.

use async_trait::async_trait;
use tracing::info;

/// Events the transaction engine reports about itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    DraftStarted {
        league_id: String,
    },
    DraftCompleted {
        league_id: String,
    },
    TradeProposed {
        trade_id: u64,
        proposer: String,
    },
    TradeAccepted {
        trade_id: u64,
        by: String,
    },
    TradeDeclined {
        trade_id: u64,
        by: String,
    },
    TradeCompleted {
        trade_id: u64,
    },
    FreeAgentPickup {
        member_id: String,
        player_id: String,
    },
}

/// Delivery seam. Implementations must not block the engine on delivery
/// failures; errors are theirs to swallow or log.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an event to one member's notification feed.
    async fn notify(&self, member_id: &str, event: Notification);
}

/// Logs every notification. The default wiring for the binary.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, member_id: &str, event: Notification) {
        info!(member = %member_id, ?event, "notification");
    }
}

/// Drops everything. Useful in tests that don't assert on notifications.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _member_id: &str, _event: Notification) {}
}
