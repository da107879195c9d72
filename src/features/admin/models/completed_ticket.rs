use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A DONE ticket as seen by the purge preview
#[derive(Debug, Clone, FromRow)]
pub struct CompletedTicket {
    pub id: Uuid,
    pub title: String,
    pub filial: Option<String>,
    /// `None` when the owner account was deleted
    pub owner_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
    pub attachment_count: i64,
}

/// Rows referencing a set of tickets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct DependentCounts {
    pub comments: i64,
    pub attachments: i64,
}

/// Rows actually removed by a purge transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub tickets_deleted: u64,
    pub comments_deleted: u64,
    pub attachments_deleted: u64,
}
