use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::tickets::dtos::TicketListItemDto;

/// Query params for listing tickets.
///
/// Every field is optional and kept as the raw client value; invalid values
/// are dropped when the query is composed rather than rejected here.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TicketListQuery {
    /// Case-insensitive substring of title or content
    pub search: Option<String>,
    /// OPEN, IN_PROGRESS or DONE
    pub status: Option<String>,
    /// Category UUID
    pub category_id: Option<String>,
    /// Exact filial (branch) label
    pub filial: Option<String>,
    /// LOW, MEDIUM, HIGH or URGENT
    pub priority: Option<String>,
    /// Inclusive lower bound on the deadline (YYYY-MM-DD)
    pub date_from: Option<String>,
    /// Inclusive upper bound on the deadline (YYYY-MM-DD)
    pub date_to: Option<String>,
    /// Zero-based page index (default: 0)
    #[param(minimum = 0)]
    pub page: Option<i64>,
    /// Items per page (default: 5, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub size: Option<i64>,
    /// createdAt, updatedAt, deadline, title or priority
    pub sort_by: Option<String>,
    /// asc or desc
    pub sort_order: Option<String>,
}

/// Pagination metadata for a ticket page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketPageMetadata {
    /// Total tickets matching filters and visibility, across all pages
    pub count: i64,
    pub has_next_page: bool,
}

/// One page of tickets
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketPageDto {
    pub list: Vec<TicketListItemDto>,
    pub metadata: TicketPageMetadata,
}

impl TicketPageDto {
    pub fn empty() -> Self {
        Self {
            list: Vec::new(),
            metadata: TicketPageMetadata {
                count: 0,
                has_next_page: false,
            },
        }
    }
}
