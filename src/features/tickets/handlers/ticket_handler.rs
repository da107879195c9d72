use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::{
    CommentDto, CreateCommentDto, CreateTicketDto, TicketDetailDto, TicketListQuery,
    TicketPageDto, TicketResponseDto, UpdateTicketDto, UpdateTicketStatusDto,
};
use crate::features::tickets::services::{CommentService, TicketQueryService, TicketService};
use crate::shared::types::{ApiResponse, Meta};

/// Shared state for the ticket routes
#[derive(Clone)]
pub struct TicketState {
    pub tickets: Arc<TicketService>,
    pub queries: Arc<TicketQueryService>,
    pub comments: Arc<CommentService>,
}

/// List tickets visible to the caller
///
/// Admins see every ticket, other users only their own. Anonymous callers
/// and storage failures get an empty page rather than an error.
#[utoipa::path(
    get,
    path = "/api/tickets",
    params(TicketListQuery),
    responses(
        (status = 200, description = "One page of tickets", body = ApiResponse<TicketPageDto>),
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn list_tickets(
    user: Option<AuthenticatedUser>,
    State(state): State<TicketState>,
    Query(params): Query<TicketListQuery>,
) -> Json<ApiResponse<TicketPageDto>> {
    let page = state.queries.list_tickets(&params, user.as_ref()).await;
    let meta = Meta {
        total: page.metadata.count,
    };
    Json(ApiResponse::success(Some(page), None, Some(meta)))
}

#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicketDto,
    responses(
        (status = 200, description = "Ticket created", body = ApiResponse<TicketResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn create_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    AppJson(dto): AppJson<CreateTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    dto.validate()?;

    let ticket = state.tickets.create(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(ticket),
        Some("Ticket created successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket with comments and attachments", body = ApiResponse<TicketDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn get_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TicketDetailDto>>> {
    let ticket = state.tickets.get_detail(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(ticket), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateTicketDto,
    responses(
        (status = 200, description = "Ticket updated", body = ApiResponse<TicketResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn update_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTicketDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    dto.validate()?;

    let ticket = state.tickets.update(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(ticket),
        Some("Ticket updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/tickets/{id}/status",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateTicketStatusDto,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<TicketResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn update_ticket_status(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateTicketStatusDto>,
) -> Result<Json<ApiResponse<TicketResponseDto>>> {
    let ticket = state.tickets.set_status(id, &user, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(ticket), None, None)))
}

#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn delete_ticket(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.tickets.delete(id, &user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Ticket deleted successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/tickets/{id}/comments",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Comments, oldest first", body = ApiResponse<Vec<CommentDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn list_comments(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentDto>>>> {
    let comments = state.comments.list(id, &user).await?;
    let meta = Meta {
        total: comments.len() as i64,
    };
    Ok(Json(ApiResponse::success(Some(comments), None, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/tickets/{id}/comments",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = CreateCommentDto,
    responses(
        (status = 200, description = "Comment added", body = ApiResponse<CommentDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    ),
    tag = "tickets",
    security(("bearer_auth" = []))
)]
pub async fn add_comment(
    user: AuthenticatedUser,
    State(state): State<TicketState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<Json<ApiResponse<CommentDto>>> {
    dto.validate()?;

    let comment = state.comments.add(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(Some(comment), None, None)))
}
