use chrono::Utc;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::{
    CommentDto, CreateTicketDto, FileAttachmentDto, TicketDetailDto, TicketListItemDto,
    TicketResponseDto, UpdateTicketDto,
};
use crate::features::tickets::models::{
    Comment, FileAttachment, Ticket, TicketStatus, TicketSummary,
};
use crate::features::tickets::policy;
use crate::features::tickets::repositories::SUMMARY_COLUMNS;
use crate::features::users::services::upsert_user;

const TICKET_COLUMNS: &str = "id, title, content, status, deadline, filial, priority, category_id, user_id, created_at, updated_at";

/// Owner of a ticket, or `NotFound` when the ticket does not exist
pub(crate) async fn ticket_owner<'e, E>(executor: E, ticket_id: Uuid) -> Result<Option<Uuid>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, Option<Uuid>>("SELECT user_id FROM tickets WHERE id = $1")
        .bind(ticket_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load ticket owner: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", ticket_id)))
}

async fn ensure_category_exists<'e, E>(executor: E, category_id: Option<Uuid>) -> Result<()>
where
    E: PgExecutor<'e>,
{
    let Some(category_id) = category_id else {
        return Ok(());
    };

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
            .bind(category_id)
            .fetch_one(executor)
            .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Category '{}' does not exist",
            category_id
        )))
    }
}

/// Create, read, edit, status and delete for single tickets
pub struct TicketService {
    pool: PgPool,
}

impl TicketService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        dto: CreateTicketDto,
    ) -> Result<TicketResponseDto> {
        let mut tx = self.pool.begin().await?;

        upsert_user(&mut *tx, user).await?;
        ensure_category_exists(&mut *tx, dto.category_id).await?;

        let sql = format!(
            r#"
            INSERT INTO tickets (title, content, status, deadline, filial, priority, category_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(dto.title.trim())
            .bind(dto.content.trim())
            .bind(TicketStatus::Open)
            .bind(&dto.deadline)
            .bind(dto.filial.as_deref().map(str::trim))
            .bind(dto.priority.unwrap_or_default())
            .bind(dto.category_id)
            .bind(user.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create ticket: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await?;

        tracing::info!(ticket_id = %ticket.id, user_id = %user.id, "Ticket created");

        Ok(ticket.into())
    }

    pub async fn get_detail(&self, id: Uuid, user: &AuthenticatedUser) -> Result<TicketDetailDto> {
        let sql = format!("{} WHERE t.id = $1", SUMMARY_COLUMNS);
        let summary = sqlx::query_as::<_, TicketSummary>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get ticket: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", id)))?;

        policy::ensure_access(id, summary.user_id, user)?;

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.ticket_id, c.user_id, u.username AS author_username,
                   c.content, c.is_system, c.created_at
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.ticket_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let attachments = sqlx::query_as::<_, FileAttachment>(
            r#"
            SELECT id, ticket_id, user_id, filename, file_size, content_type, url, created_at
            FROM file_attachments
            WHERE ticket_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TicketDetailDto {
            ticket: TicketListItemDto::from(summary),
            comments: comments.into_iter().map(CommentDto::from).collect(),
            attachments: attachments
                .into_iter()
                .map(FileAttachmentDto::from)
                .collect(),
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        dto: UpdateTicketDto,
    ) -> Result<TicketResponseDto> {
        if dto.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let owner = ticket_owner(&mut *tx, id).await?;
        policy::ensure_access(id, owner, user)?;
        ensure_category_exists(&mut *tx, dto.category_id.flatten()).await?;

        // $5 and $8 say whether filial and category_id were sent, null included
        let sql = format!(
            r#"
            UPDATE tickets
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                deadline = COALESCE($4, deadline),
                filial = CASE WHEN $5 THEN $6 ELSE filial END,
                priority = COALESCE($7, priority),
                category_id = CASE WHEN $8 THEN $9 ELSE category_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TICKET_COLUMNS
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .bind(dto.title.as_deref().map(str::trim))
            .bind(dto.content.as_deref().map(str::trim))
            .bind(dto.deadline.as_deref())
            .bind(dto.filial.is_some())
            .bind(dto.filial.as_ref().and_then(|f| f.as_deref()).map(str::trim))
            .bind(dto.priority)
            .bind(dto.category_id.is_some())
            .bind(dto.category_id.flatten())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update ticket: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await?;

        tracing::info!(ticket_id = %id, user_id = %user.id, "Ticket updated");

        Ok(ticket.into())
    }

    /// Admin-only. Marking a ticket DONE also leaves a system comment.
    pub async fn set_status(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        status: TicketStatus,
    ) -> Result<TicketResponseDto> {
        if !user.is_admin() {
            tracing::warn!(
                target: "security",
                ticket_id = %id,
                user_id = %user.id,
                "Non-admin attempted to change ticket status"
            );
            return Err(AppError::Forbidden(
                "Only administrators can change ticket status".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE tickets SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            TICKET_COLUMNS
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", id)))?;

        if status == TicketStatus::Done {
            upsert_user(&mut *tx, user).await?;
            sqlx::query(
                "INSERT INTO comments (ticket_id, user_id, content, is_system) VALUES ($1, $2, $3, TRUE)",
            )
            .bind(id)
            .bind(user.id)
            .bind(policy::done_comment(&user.username, Utc::now()))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(ticket_id = %id, status = %status, user_id = %user.id, "Ticket status changed");

        Ok(ticket.into())
    }

    /// Remove a ticket with its comments and attachments
    pub async fn delete(&self, id: Uuid, user: &AuthenticatedUser) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let owner = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT user_id FROM tickets WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket '{}' not found", id)))?;
        policy::ensure_access(id, owner, user)?;

        let comments = sqlx::query("DELETE FROM comments WHERE ticket_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let attachments = sqlx::query("DELETE FROM file_attachments WHERE ticket_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            ticket_id = %id,
            user_id = %user.id,
            comments,
            attachments,
            "Ticket deleted"
        );

        Ok(())
    }
}
