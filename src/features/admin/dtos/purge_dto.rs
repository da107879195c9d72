use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::admin::models::CompletedTicket;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTicketPreviewDto {
    pub id: Uuid,
    pub title: String,
    pub filial: Option<String>,
    pub owner_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
    pub attachment_count: i64,
}

impl From<CompletedTicket> for CompletedTicketPreviewDto {
    fn from(t: CompletedTicket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            filial: t.filial,
            owner_username: t.owner_username,
            created_at: t.created_at,
            comment_count: t.comment_count,
            attachment_count: t.attachment_count,
        }
    }
}

/// Scope of a purge, shown before confirming it.
///
/// Totals and breakdowns cover every DONE ticket; `tickets` is capped to the
/// most recent ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStatsDto {
    pub total_tickets: i64,
    pub total_comments: i64,
    pub total_attachments: i64,
    pub by_filial: BTreeMap<String, i64>,
    pub by_owner: BTreeMap<String, i64>,
    pub tickets: Vec<CompletedTicketPreviewDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeDetailsDto {
    pub tickets_deleted: u64,
    pub comments_deleted: u64,
    pub attachments_deleted: u64,
    pub ticket_ids: Vec<Uuid>,
    pub deleted_by_filial: BTreeMap<String, i64>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeReportDto {
    pub success: bool,
    pub deleted_count: u64,
    pub details: PurgeDetailsDto,
}
