//! Structured audit trail for destructive administrative actions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: &'static str,
    pub actor_id: Uuid,
    pub actor_username: String,
    pub occurred_at: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(action: &'static str, actor: &AuthenticatedUser, details: serde_json::Value) -> Self {
        Self {
            action,
            actor_id: actor.id,
            actor_username: actor.username.clone(),
            occurred_at: Utc::now(),
            details,
        }
    }
}

/// Destination for audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent);
}

/// Writes each event as one JSON line under the `audit` tracing target
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        match serde_json::to_string(event) {
            Ok(json) => tracing::info!(target: "audit", action = event.action, "{}", json),
            Err(e) => tracing::error!(
                target: "audit",
                action = event.action,
                "Failed to serialize audit event: {:?}",
                e
            ),
        }
    }
}
