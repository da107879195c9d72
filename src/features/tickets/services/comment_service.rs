use sqlx::PgPool;
use uuid::Uuid;

use super::ticket_service::ticket_owner;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::{CommentDto, CreateCommentDto};
use crate::features::tickets::models::Comment;
use crate::features::tickets::policy;
use crate::features::users::services::upsert_user;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comments of a ticket, oldest first
    pub async fn list(&self, ticket_id: Uuid, user: &AuthenticatedUser) -> Result<Vec<CommentDto>> {
        let owner = ticket_owner(&self.pool, ticket_id).await?;
        policy::ensure_access(ticket_id, owner, user)?;

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
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(comments.into_iter().map(CommentDto::from).collect())
    }

    pub async fn add(
        &self,
        ticket_id: Uuid,
        user: &AuthenticatedUser,
        dto: CreateCommentDto,
    ) -> Result<CommentDto> {
        let mut tx = self.pool.begin().await?;

        let owner = ticket_owner(&mut *tx, ticket_id).await?;
        policy::ensure_access(ticket_id, owner, user)?;
        upsert_user(&mut *tx, user).await?;

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (ticket_id, user_id, content, is_system)
                VALUES ($1, $2, $3, FALSE)
                RETURNING id, ticket_id, user_id, content, is_system, created_at
            )
            SELECT i.id, i.ticket_id, i.user_id, u.username AS author_username,
                   i.content, i.is_system, i.created_at
            FROM inserted i
            LEFT JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(ticket_id)
        .bind(user.id)
        .bind(dto.content.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to add comment: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await?;

        tracing::info!(ticket_id = %ticket_id, comment_id = %comment.id, "Comment added");

        Ok(comment.into())
    }
}
