use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{
    dtos as admin_dtos, handlers as admin_handlers, services as admin_services,
};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::tickets::{
    dtos as tickets_dtos, handlers as tickets_handlers, models as tickets_models,
};
use crate::shared::types::{ApiResponse, Meta, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Tickets
        tickets_handlers::list_tickets,
        tickets_handlers::create_ticket,
        tickets_handlers::get_ticket,
        tickets_handlers::update_ticket,
        tickets_handlers::update_ticket_status,
        tickets_handlers::delete_ticket,
        tickets_handlers::list_comments,
        tickets_handlers::add_comment,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::delete_category,
        // Admin
        admin_handlers::get_completed_stats,
        admin_handlers::purge_completed_tickets,
    ),
    components(
        schemas(
            Meta,
            SortDirection,
            // Tickets
            tickets_models::TicketStatus,
            tickets_models::TicketPriority,
            tickets_dtos::TicketOwnerDto,
            tickets_dtos::TicketCategoryDto,
            tickets_dtos::TicketListItemDto,
            tickets_dtos::TicketPageMetadata,
            tickets_dtos::TicketPageDto,
            tickets_dtos::TicketResponseDto,
            tickets_dtos::TicketDetailDto,
            tickets_dtos::CommentDto,
            tickets_dtos::FileAttachmentDto,
            tickets_dtos::CreateTicketDto,
            tickets_dtos::UpdateTicketDto,
            tickets_dtos::UpdateTicketStatusDto,
            tickets_dtos::CreateCommentDto,
            ApiResponse<tickets_dtos::TicketPageDto>,
            ApiResponse<tickets_dtos::TicketResponseDto>,
            ApiResponse<tickets_dtos::TicketDetailDto>,
            ApiResponse<tickets_dtos::CommentDto>,
            ApiResponse<Vec<tickets_dtos::CommentDto>>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Admin
            admin_services::PurgeErrorCode,
            admin_services::PurgeFailureBody,
            admin_dtos::CompletedTicketPreviewDto,
            admin_dtos::CompletedStatsDto,
            admin_dtos::PurgeDetailsDto,
            admin_dtos::PurgeReportDto,
            ApiResponse<admin_dtos::CompletedStatsDto>,
            ApiResponse<admin_dtos::PurgeReportDto>,
        )
    ),
    tags(
        (name = "tickets", description = "Support tickets, their status and comments"),
        (name = "categories", description = "Ticket categories"),
        (name = "admin", description = "Bulk maintenance of completed tickets (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Helpdesk API",
        version = "0.1.0",
        description = "API documentation for the helpdesk service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
