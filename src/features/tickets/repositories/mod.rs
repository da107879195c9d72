mod ticket_repository;

pub(crate) use ticket_repository::SUMMARY_COLUMNS;
pub use ticket_repository::{PgTicketRepository, TicketRepository};
