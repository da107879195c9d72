use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::PurgeService;

/// Create admin routes, nested under `/api/admin`
///
/// Authorization is checked by the service so that denied attempts are
/// logged as security events.
pub fn routes(purge_service: Arc<PurgeService>) -> Router {
    Router::new()
        .route(
            "/tickets/completed/stats",
            get(handlers::get_completed_stats),
        )
        .route(
            "/tickets/completed",
            delete(handlers::purge_completed_tickets),
        )
        .with_state(purge_service)
}
