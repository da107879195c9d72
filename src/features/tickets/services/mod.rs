mod comment_service;
mod ticket_query_service;
mod ticket_service;

pub use comment_service::CommentService;
pub use ticket_query_service::TicketQueryService;
pub use ticket_service::TicketService;
