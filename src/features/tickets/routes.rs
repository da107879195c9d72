use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::tickets::handlers::{self, TicketState};

/// Create routes for the tickets feature
///
/// Listing tolerates anonymous callers; every other route requires an
/// authenticated user through its extractor.
pub fn routes(state: TicketState) -> Router {
    Router::new()
        .route(
            "/api/tickets",
            get(handlers::list_tickets).post(handlers::create_ticket),
        )
        .route(
            "/api/tickets/{id}",
            get(handlers::get_ticket)
                .patch(handlers::update_ticket)
                .delete(handlers::delete_ticket),
        )
        .route(
            "/api/tickets/{id}/status",
            patch(handlers::update_ticket_status),
        )
        .route(
            "/api/tickets/{id}/comments",
            get(handlers::list_comments).post(handlers::add_comment),
        )
        .with_state(state)
}
