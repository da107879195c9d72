mod completed_ticket;

pub use completed_ticket::{CompletedTicket, DependentCounts, PurgeOutcome};
