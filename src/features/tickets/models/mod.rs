mod comment;
mod file_attachment;
mod ticket;

pub use comment::Comment;
pub use file_attachment::FileAttachment;
pub use ticket::{Ticket, TicketPriority, TicketStatus, TicketSummary};
