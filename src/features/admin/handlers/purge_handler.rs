use std::sync::Arc;

use axum::{extract::State, Json};

use crate::features::admin::dtos::{CompletedStatsDto, PurgeReportDto};
use crate::features::admin::services::{PurgeFailure, PurgeFailureBody, PurgeService};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::ApiResponse;

/// Preview what a purge of completed tickets would delete
#[utoipa::path(
    get,
    path = "/api/admin/tickets/completed/stats",
    responses(
        (status = 200, description = "Totals and breakdowns of DONE tickets", body = ApiResponse<CompletedStatsDto>),
        (status = 401, description = "Not signed in", body = PurgeFailureBody),
        (status = 403, description = "Forbidden - Admin access required", body = PurgeFailureBody),
        (status = 500, description = "Failed to load completed tickets", body = PurgeFailureBody)
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn get_completed_stats(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<PurgeService>>,
) -> Result<Json<ApiResponse<CompletedStatsDto>>, PurgeFailure> {
    let stats = service.get_completed_stats(user.as_ref()).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Irreversibly delete every DONE ticket with its comments and attachments
#[utoipa::path(
    delete,
    path = "/api/admin/tickets/completed",
    responses(
        (status = 200, description = "Completed tickets purged", body = ApiResponse<PurgeReportDto>),
        (status = 401, description = "Not signed in", body = PurgeFailureBody),
        (status = 403, description = "Forbidden - Admin access required", body = PurgeFailureBody),
        (status = 409, description = "Conflict with concurrent changes, safe to retry", body = PurgeFailureBody),
        (status = 503, description = "Transaction timed out, safe to retry", body = PurgeFailureBody),
        (status = 500, description = "Unexpected failure", body = PurgeFailureBody)
    ),
    tag = "admin",
    security(("bearer_auth" = []))
)]
pub async fn purge_completed_tickets(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<PurgeService>>,
) -> Result<Json<ApiResponse<PurgeReportDto>>, PurgeFailure> {
    let report = service.purge_completed_tickets(user.as_ref()).await?;
    let message = format!("{} completed tickets deleted", report.deleted_count);
    Ok(Json(ApiResponse::success(Some(report), Some(message), None)))
}
