use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use crate::core::config::PurgeConfig;
use crate::core::error::AppError;
use crate::features::admin::dtos::{
    CompletedStatsDto, CompletedTicketPreviewDto, PurgeDetailsDto, PurgeReportDto,
};
use crate::features::admin::models::CompletedTicket;
use crate::features::admin::repositories::{CompletedTicketRepository, TransactionSettings};
use crate::features::admin::services::purge_error::{PurgeErrorCode, PurgeFailure};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::audit::{AuditEvent, AuditSink};
use crate::shared::constants::{
    DELETED_OWNER_LABEL, NO_FILIAL_LABEL, VIEW_DASHBOARD, VIEW_TICKETS, VIEW_TICKET_STATS,
};
use crate::shared::revalidation::ViewRevalidator;

pub const PURGE_AUDIT_ACTION: &str = "tickets.purge_completed";

/// Preview and irreversible bulk deletion of DONE tickets.
///
/// Both operations are admin-only and report failures as [`PurgeFailure`]
/// values instead of propagating errors.
pub struct PurgeService {
    repository: Arc<dyn CompletedTicketRepository>,
    audit: Arc<dyn AuditSink>,
    revalidator: Arc<dyn ViewRevalidator>,
    settings: TransactionSettings,
    preview_limit: usize,
}

impl PurgeService {
    pub fn new(
        repository: Arc<dyn CompletedTicketRepository>,
        audit: Arc<dyn AuditSink>,
        revalidator: Arc<dyn ViewRevalidator>,
        config: &PurgeConfig,
    ) -> Self {
        Self {
            repository,
            audit,
            revalidator,
            settings: TransactionSettings::from(config),
            preview_limit: config.preview_limit,
        }
    }

    fn authorize<'a>(
        &self,
        user: Option<&'a AuthenticatedUser>,
        operation: &'static str,
    ) -> Result<&'a AuthenticatedUser, PurgeFailure> {
        match user {
            None => {
                tracing::warn!(
                    target: "security",
                    operation,
                    "Unauthenticated call to admin-only operation"
                );
                Err(PurgeFailure::new(PurgeErrorCode::Unauthenticated))
            }
            Some(user) if !user.is_admin() => {
                tracing::warn!(
                    target: "security",
                    operation,
                    user_id = %user.id,
                    username = %user.username,
                    role = %user.role,
                    "Non-admin attempted admin-only operation"
                );
                Err(PurgeFailure::new(PurgeErrorCode::Forbidden))
            }
            Some(user) => Ok(user),
        }
    }

    fn failure(context: &str, err: AppError) -> PurgeFailure {
        let failure = PurgeFailure::from(&err);
        tracing::error!(code = failure.code.as_str(), "Failed to {}: {:?}", context, err);
        failure
    }

    pub async fn get_completed_stats(
        &self,
        user: Option<&AuthenticatedUser>,
    ) -> Result<CompletedStatsDto, PurgeFailure> {
        self.authorize(user, "get_completed_stats")?;

        let tickets = self
            .repository
            .list_completed()
            .await
            .map_err(|e| Self::failure("load completed tickets", e))?;

        Ok(summarize(tickets, self.preview_limit))
    }

    pub async fn purge_completed_tickets(
        &self,
        user: Option<&AuthenticatedUser>,
    ) -> Result<PurgeReportDto, PurgeFailure> {
        let started = Instant::now();
        let actor = self.authorize(user, "purge_completed_tickets")?;

        let tickets = self
            .repository
            .list_completed()
            .await
            .map_err(|e| Self::failure("load completed tickets", e))?;

        if tickets.is_empty() {
            tracing::info!(actor_id = %actor.id, "No completed tickets to purge");
            return Ok(PurgeReportDto {
                success: true,
                deleted_count: 0,
                details: PurgeDetailsDto {
                    execution_time_ms: elapsed_ms(started),
                    ..Default::default()
                },
            });
        }

        let ticket_ids: Vec<_> = tickets.iter().map(|t| t.id).collect();
        let deleted_by_filial = group_counts(
            tickets.iter().map(|t| t.filial.as_deref()),
            NO_FILIAL_LABEL,
        );

        let planned = self
            .repository
            .count_dependents(&ticket_ids)
            .await
            .map_err(|e| Self::failure("count ticket dependents", e))?;

        let outcome = self
            .repository
            .delete_completed(&ticket_ids, &self.settings)
            .await
            .map_err(|e| Self::failure("purge completed tickets", e))?;

        let execution_time_ms = elapsed_ms(started);

        self.audit.record(&AuditEvent::new(
            PURGE_AUDIT_ACTION,
            actor,
            json!({
                "ticketsDeleted": outcome.tickets_deleted,
                "commentsDeleted": outcome.comments_deleted,
                "attachmentsDeleted": outcome.attachments_deleted,
                "plannedComments": planned.comments,
                "plannedAttachments": planned.attachments,
                "deletedByFilial": deleted_by_filial,
                "executionTimeMs": execution_time_ms,
            }),
        ));

        self.revalidator
            .invalidate(&[VIEW_TICKETS, VIEW_DASHBOARD, VIEW_TICKET_STATS])
            .await;

        tracing::info!(
            actor_id = %actor.id,
            tickets = outcome.tickets_deleted,
            comments = outcome.comments_deleted,
            attachments = outcome.attachments_deleted,
            execution_time_ms,
            "Completed tickets purged"
        );

        Ok(PurgeReportDto {
            success: true,
            deleted_count: outcome.tickets_deleted,
            details: PurgeDetailsDto {
                tickets_deleted: outcome.tickets_deleted,
                comments_deleted: outcome.comments_deleted,
                attachments_deleted: outcome.attachments_deleted,
                ticket_ids,
                deleted_by_filial,
                execution_time_ms,
            },
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Count occurrences per key, with `None` grouped under `missing`
fn group_counts<'a>(
    keys: impl Iterator<Item = Option<&'a str>>,
    missing: &str,
) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts
            .entry(key.unwrap_or(missing).to_string())
            .or_insert(0) += 1;
    }
    counts
}

/// `tickets` must already be most recent first
fn summarize(tickets: Vec<CompletedTicket>, preview_limit: usize) -> CompletedStatsDto {
    let total_comments: i64 = tickets.iter().map(|t| t.comment_count).sum();
    let total_attachments: i64 = tickets.iter().map(|t| t.attachment_count).sum();
    let by_filial = group_counts(tickets.iter().map(|t| t.filial.as_deref()), NO_FILIAL_LABEL);
    let by_owner = group_counts(
        tickets.iter().map(|t| t.owner_username.as_deref()),
        DELETED_OWNER_LABEL,
    );

    CompletedStatsDto {
        total_tickets: tickets.len() as i64,
        total_comments,
        total_attachments,
        by_filial,
        by_owner,
        tickets: tickets
            .into_iter()
            .take(preview_limit)
            .map(CompletedTicketPreviewDto::from)
            .collect(),
    }
}
