use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::tickets::models::{
    Comment, FileAttachment, Ticket, TicketPriority, TicketStatus, TicketSummary,
};
use crate::shared::types::deserialize_nullable;
use crate::shared::validation::{validate_not_blank, DATE_REGEX};

/// Owner of a ticket (absent when the account was deleted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketOwnerDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

/// Ticket as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketListItemDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: TicketStatus,
    pub deadline: String,
    pub filial: Option<String>,
    pub priority: TicketPriority,
    pub owner: Option<TicketOwnerDto>,
    pub category: Option<TicketCategoryDto>,
    pub attachment_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TicketSummary> for TicketListItemDto {
    fn from(t: TicketSummary) -> Self {
        let owner = match (t.user_id, t.owner_username, t.owner_email) {
            (Some(id), Some(username), Some(email)) => Some(TicketOwnerDto {
                id,
                username,
                email,
            }),
            _ => None,
        };
        let category = match (t.category_id, t.category_name, t.category_color) {
            (Some(id), Some(name), Some(color)) => Some(TicketCategoryDto { id, name, color }),
            _ => None,
        };

        Self {
            id: t.id,
            title: t.title,
            content: t.content,
            status: t.status,
            deadline: t.deadline,
            filial: t.filial,
            priority: t.priority,
            owner,
            category,
            attachment_count: t.attachment_count,
            comment_count: t.comment_count,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Response DTO for a single ticket row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponseDto {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: TicketStatus,
    pub deadline: String,
    pub filial: Option<String>,
    pub priority: TicketPriority,
    pub category_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponseDto {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            content: t.content,
            status: t.status,
            deadline: t.deadline,
            filial: t.filial,
            priority: t.priority,
            category_id: t.category_id,
            user_id: t.user_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub content: String,
    /// Written by the system (e.g. status change trail) rather than typed by a user
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            ticket_id: c.ticket_id,
            author_id: c.user_id,
            author_username: c.author_username,
            content: c.content,
            is_system: c.is_system,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachmentDto {
    pub id: Uuid,
    pub filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub url: String,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<FileAttachment> for FileAttachmentDto {
    fn from(f: FileAttachment) -> Self {
        Self {
            id: f.id,
            filename: f.filename,
            file_size: f.file_size,
            content_type: f.content_type,
            url: f.url,
            uploaded_by: f.user_id,
            created_at: f.created_at,
        }
    }
}

/// Full ticket view with its discussion and files
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetailDto {
    #[serde(flatten)]
    pub ticket: TicketListItemDto,
    pub comments: Vec<CommentDto>,
    pub attachments: Vec<FileAttachmentDto>,
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketDto {
    #[validate(
        length(min = 1, max = 191, message = "must be 1-191 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(
        length(min = 1, max = 1024, message = "must be 1-1024 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,
    #[validate(regex(path = *DATE_REGEX, message = "must be a YYYY-MM-DD date"))]
    pub deadline: String,
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub filial: Option<String>,
    pub priority: Option<TicketPriority>,
    pub category_id: Option<Uuid>,
}

/// Partial edit; absent fields are left unchanged, `null` clears
/// `filial` and `categoryId`
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketDto {
    #[validate(
        length(min = 1, max = 191, message = "must be 1-191 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: Option<String>,
    #[validate(
        length(min = 1, max = 1024, message = "must be 1-1024 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: Option<String>,
    #[validate(regex(path = *DATE_REGEX, message = "must be a YYYY-MM-DD date"))]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<String>)]
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub filial: Option<Option<String>>,
    pub priority: Option<TicketPriority>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
}

impl UpdateTicketDto {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.deadline.is_none()
            && self.filial.is_none()
            && self.priority.is_none()
            && self.category_id.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateTicketStatusDto {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    #[validate(
        length(min = 1, max = 1024, message = "must be 1-1024 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,
}
