use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// Owners and admins may read and change a ticket
pub fn can_access(owner_id: Option<Uuid>, user: &AuthenticatedUser) -> bool {
    user.is_admin() || owner_id == Some(user.id)
}

/// Hide tickets the caller may not see behind a 404
pub fn ensure_access(ticket_id: Uuid, owner_id: Option<Uuid>, user: &AuthenticatedUser) -> Result<()> {
    if can_access(owner_id, user) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Ticket '{}' not found", ticket_id)))
    }
}

/// Text of the system comment left when a ticket is marked DONE
pub fn done_comment(username: &str, at: DateTime<Utc>) -> String {
    format!(
        "Ticket marked as DONE by {} at {}",
        username,
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
