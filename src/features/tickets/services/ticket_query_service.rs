use std::sync::Arc;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::{TicketListQuery, TicketPageDto};
use crate::features::tickets::query::TicketQuery;
use crate::features::tickets::repositories::TicketRepository;

/// Filtered, sorted and paginated ticket listings.
///
/// Listing never fails from the caller's point of view: an anonymous caller
/// gets an empty page, and storage errors are logged and also degrade to an
/// empty page.
pub struct TicketQueryService {
    repository: Arc<dyn TicketRepository>,
}

impl TicketQueryService {
    pub fn new(repository: Arc<dyn TicketRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_tickets(
        &self,
        params: &TicketListQuery,
        user: Option<&AuthenticatedUser>,
    ) -> TicketPageDto {
        let Some(user) = user else {
            return TicketPageDto::empty();
        };

        let query = TicketQuery::new(params, user);

        let count = match self.repository.count(&query).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(user_id = %user.id, "Failed to list tickets: {}", e);
                return TicketPageDto::empty();
            }
        };

        let rows = match self.repository.fetch_page(&query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(user_id = %user.id, "Failed to list tickets: {}", e);
                return TicketPageDto::empty();
            }
        };

        TicketPageDto {
            list: rows.into_iter().map(Into::into).collect(),
            metadata: query.page.metadata(count),
        }
    }
}
