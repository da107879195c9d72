use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a file uploaded against a ticket.
/// `url` points into object storage; the object itself is managed elsewhere.
#[derive(Debug, Clone, FromRow)]
pub struct FileAttachment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Option<Uuid>,
    pub filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
