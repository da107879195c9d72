//! Ticket listing query composition.
//!
//! Raw request parameters are turned once per request into a [`TicketQuery`]:
//! visibility from the caller's role, a validated filter, a sort and a page.
//! Composition is pure; the repository turns the result into SQL.

use uuid::Uuid;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::tickets::dtos::{TicketListQuery, TicketPageMetadata};
use crate::features::tickets::models::{TicketPriority, TicketStatus};
use crate::shared::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::SortDirection;

/// Which tickets the caller may see at all, applied before any filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    All,
    OwnedBy(Uuid),
}

impl Visibility {
    pub fn for_user(user: &AuthenticatedUser) -> Self {
        if user.is_admin() {
            Visibility::All
        } else {
            Visibility::OwnedBy(user.id)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketFilter {
    pub search: Option<String>,
    pub status: Option<TicketStatus>,
    pub category_id: Option<Uuid>,
    pub filial: Option<String>,
    pub priority: Option<TicketPriority>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl TicketFilter {
    /// Build the filter from raw params.
    ///
    /// Unknown status/priority values and malformed category ids are treated
    /// as "no filter" instead of "no results". This mirrors what existing
    /// clients rely on and is kept for compatibility, not as a recommendation.
    pub fn from_params(params: &TicketListQuery) -> Self {
        Self {
            search: non_empty(&params.search),
            status: params.status.as_deref().and_then(TicketStatus::parse),
            category_id: params
                .category_id
                .as_deref()
                .and_then(|id| Uuid::parse_str(id.trim()).ok()),
            filial: non_empty(&params.filial),
            priority: params.priority.as_deref().and_then(TicketPriority::parse),
            date_from: non_empty(&params.date_from),
            date_to: non_empty(&params.date_to),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Deadline,
    Title,
    Priority,
}

impl TicketSortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "createdAt" => Some(TicketSortField::CreatedAt),
            "updatedAt" => Some(TicketSortField::UpdatedAt),
            "deadline" => Some(TicketSortField::Deadline),
            "title" => Some(TicketSortField::Title),
            "priority" => Some(TicketSortField::Priority),
            _ => None,
        }
    }

    /// ORDER BY expression over the `t` (tickets) alias
    pub fn as_sql(&self) -> &'static str {
        match self {
            TicketSortField::CreatedAt => "t.created_at",
            TicketSortField::UpdatedAt => "t.updated_at",
            TicketSortField::Deadline => "t.deadline",
            TicketSortField::Title => "LOWER(t.title)",
            TicketSortField::Priority => "t.priority",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketSort {
    pub field: TicketSortField,
    pub direction: SortDirection,
}

impl TicketSort {
    /// Both parts must be present and valid, otherwise createdAt desc
    pub fn from_params(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        match (
            sort_by.and_then(TicketSortField::parse),
            sort_order.and_then(SortDirection::parse),
        ) {
            (Some(field), Some(direction)) => Self { field, direction },
            _ => Self::default(),
        }
    }
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn from_params(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(0).max(0),
            size: size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn metadata(&self, count: i64) -> TicketPageMetadata {
        TicketPageMetadata {
            count,
            has_next_page: (self.page.saturating_add(1)).saturating_mul(self.size) < count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub visibility: Visibility,
    pub filter: TicketFilter,
    pub sort: TicketSort,
    pub page: PageRequest,
}

impl TicketQuery {
    pub fn new(params: &TicketListQuery, user: &AuthenticatedUser) -> Self {
        Self {
            visibility: Visibility::for_user(user),
            filter: TicketFilter::from_params(params),
            sort: TicketSort::from_params(params.sort_by.as_deref(), params.sort_order.as_deref()),
            page: PageRequest::from_params(params.page, params.size),
        }
    }
}

/// Escape LIKE metacharacters so the term matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
