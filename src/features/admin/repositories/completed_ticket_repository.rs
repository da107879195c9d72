use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::core::config::{IsolationLevel, PurgeConfig};
use crate::core::error::{AppError, Result};
use crate::features::admin::models::{CompletedTicket, DependentCounts, PurgeOutcome};
use crate::features::tickets::models::TicketStatus;

/// Isolation and time budgets of the purge transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSettings {
    pub isolation: IsolationLevel,
    /// Upper bound for acquiring a connection and for waiting on row locks
    pub max_wait: Duration,
    /// Upper bound for the deletes as a whole
    pub timeout: Duration,
}

impl From<&PurgeConfig> for TransactionSettings {
    fn from(config: &PurgeConfig) -> Self {
        Self {
            isolation: config.isolation,
            max_wait: config.max_wait,
            timeout: config.timeout,
        }
    }
}

#[async_trait]
pub trait CompletedTicketRepository: Send + Sync {
    /// Every DONE ticket, most recent first
    async fn list_completed(&self) -> Result<Vec<CompletedTicket>>;

    async fn count_dependents(&self, ticket_ids: &[Uuid]) -> Result<DependentCounts>;

    /// Delete comments, then attachments, then the DONE tickets among
    /// `ticket_ids`, all in one transaction. Fails with `Conflict` and rolls
    /// back when any target is no longer DONE.
    async fn delete_completed(
        &self,
        ticket_ids: &[Uuid],
        settings: &TransactionSettings,
    ) -> Result<PurgeOutcome>;
}

pub struct PgCompletedTicketRepository {
    pool: PgPool,
}

impl PgCompletedTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn session_statements(settings: &TransactionSettings) -> [String; 3] {
    [
        format!(
            "SET TRANSACTION ISOLATION LEVEL {}",
            settings.isolation.as_sql()
        ),
        format!("SET LOCAL lock_timeout = '{}ms'", settings.max_wait.as_millis()),
        format!(
            "SET LOCAL statement_timeout = '{}ms'",
            settings.timeout.as_millis()
        ),
    ]
}

async fn run_deletes(conn: &mut PgConnection, ticket_ids: &[Uuid]) -> Result<PurgeOutcome> {
    let comments_deleted = sqlx::query("DELETE FROM comments WHERE ticket_id = ANY($1)")
        .bind(ticket_ids)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let attachments_deleted = sqlx::query("DELETE FROM file_attachments WHERE ticket_id = ANY($1)")
        .bind(ticket_ids)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    let tickets_deleted = sqlx::query("DELETE FROM tickets WHERE status = $1 AND id = ANY($2)")
        .bind(TicketStatus::Done)
        .bind(ticket_ids)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    if tickets_deleted != ticket_ids.len() as u64 {
        return Err(AppError::Conflict(format!(
            "expected to delete {} tickets, deleted {}",
            ticket_ids.len(),
            tickets_deleted
        )));
    }

    Ok(PurgeOutcome {
        tickets_deleted,
        comments_deleted,
        attachments_deleted,
    })
}

#[async_trait]
impl CompletedTicketRepository for PgCompletedTicketRepository {
    async fn list_completed(&self) -> Result<Vec<CompletedTicket>> {
        sqlx::query_as::<_, CompletedTicket>(
            r#"
            SELECT
                t.id, t.title, t.filial, u.username AS owner_username, t.created_at,
                (SELECT COUNT(*) FROM comments cm WHERE cm.ticket_id = t.id) AS comment_count,
                (SELECT COUNT(*) FROM file_attachments fa WHERE fa.ticket_id = t.id) AS attachment_count
            FROM tickets t
            LEFT JOIN users u ON u.id = t.user_id
            WHERE t.status = $1
            ORDER BY t.created_at DESC, t.id DESC
            "#,
        )
        .bind(TicketStatus::Done)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list completed tickets: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn count_dependents(&self, ticket_ids: &[Uuid]) -> Result<DependentCounts> {
        sqlx::query_as::<_, DependentCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM comments WHERE ticket_id = ANY($1)) AS comments,
                (SELECT COUNT(*) FROM file_attachments WHERE ticket_id = ANY($1)) AS attachments
            "#,
        )
        .bind(ticket_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count ticket dependents: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete_completed(
        &self,
        ticket_ids: &[Uuid],
        settings: &TransactionSettings,
    ) -> Result<PurgeOutcome> {
        let mut tx = tokio::time::timeout(settings.max_wait, self.pool.begin())
            .await
            .map_err(|_| {
                AppError::Timeout("Timed out waiting to open purge transaction".to_string())
            })??;

        for statement in session_statements(settings) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }

        let result = match tokio::time::timeout(settings.timeout, run_deletes(&mut tx, ticket_ids))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(format!(
                "Purge transaction exceeded {}ms",
                settings.timeout.as_millis()
            ))),
        };

        match result {
            Ok(outcome) => {
                tx.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!("Failed to roll back purge transaction: {:?}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = PurgeConfig::default();
        let settings = TransactionSettings::from(&config);
        assert_eq!(settings.isolation, IsolationLevel::Serializable);
        assert_eq!(settings.max_wait, Duration::from_millis(5_000));
        assert_eq!(settings.timeout, Duration::from_millis(10_000));
    }

    #[test]
    fn test_session_statements_set_isolation_first() {
        let settings = TransactionSettings {
            isolation: IsolationLevel::Serializable,
            max_wait: Duration::from_millis(1_500),
            timeout: Duration::from_secs(3),
        };
        let statements = session_statements(&settings);
        assert_eq!(statements[0], "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE");
        assert_eq!(statements[1], "SET LOCAL lock_timeout = '1500ms'");
        assert_eq!(statements[2], "SET LOCAL statement_timeout = '3000ms'");
    }
}
