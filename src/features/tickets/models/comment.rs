use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Comment joined with its author's username
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub content: String,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
}
