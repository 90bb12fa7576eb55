//! Structured audit trail for material order actions.
//!
//! Events: order created/rejected/imported, status changed, order cancelled, cart cleared.
//! Format: one JSON object per event with timestamp, action, order id and outcome.
//! Sink: stdout in the binary, in-memory for tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::OrderId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    OrderCreated,
    OrderImported,
    OrderStatusChanged,
    OrderCancelled,
    CartCleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Rejected,
}

/// Single audit record.
#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// Action-specific details (status change, totals, rejection reason).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    pub outcome: AuditOutcome,
}

impl AuditEvent {
    pub fn now(
        action: AuditAction,
        order_id: Option<OrderId>,
        detail: Option<serde_json::Value>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action,
            order_id,
            detail,
            outcome,
        }
    }
}

/// Sink for audit events.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: &AuditEvent);
}

/// Writes one JSON line per event to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutAuditSink;

impl AuditSink for StdoutAuditSink {
    fn emit(&self, event: &AuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{}", line);
        }
    }
}

/// Keeps events in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn actions(&self) -> Vec<AuditAction> {
        self.events().iter().map(|e| e.action).collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: &AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_snake_case_and_skips_empty_fields() {
        let event = AuditEvent::now(AuditAction::CartCleared, None, None, AuditOutcome::Success);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "cart_cleared");
        assert_eq!(json["outcome"], "success");
        assert!(json.get("order_id").is_none());
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn in_memory_sink_clones_share_buffer() {
        let sink = InMemoryAuditSink::new();
        let other = sink.clone();
        other.emit(&AuditEvent::now(
            AuditAction::OrderCreated,
            Some(OrderId(1001)),
            Some(serde_json::json!({ "total": "23.75" })),
            AuditOutcome::Success,
        ));
        assert_eq!(sink.actions(), vec![AuditAction::OrderCreated]);
        sink.clear();
        assert!(other.events().is_empty());
    }
}
