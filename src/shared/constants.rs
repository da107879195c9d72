/// Default page size for ticket listings
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// GROUPING LABELS
// =============================================================================

/// Group label for tickets without a filial
pub const NO_FILIAL_LABEL: &str = "(no filial)";

/// Group label for tickets whose owner account was deleted
pub const DELETED_OWNER_LABEL: &str = "(deleted user)";

// =============================================================================
// CACHED VIEWS
// =============================================================================

pub const VIEW_TICKETS: &str = "tickets";
pub const VIEW_DASHBOARD: &str = "dashboard";
pub const VIEW_TICKET_STATS: &str = "ticket-stats";
