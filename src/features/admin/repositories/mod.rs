mod completed_ticket_repository;

pub use completed_ticket_repository::{
    CompletedTicketRepository, PgCompletedTicketRepository, TransactionSettings,
};
