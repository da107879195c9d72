mod ticket_dto;
mod ticket_query_dto;

pub use ticket_dto::*;
pub use ticket_query_dto::*;
