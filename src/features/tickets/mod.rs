pub mod dtos;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod query;
pub mod repositories;
pub mod routes;
pub mod services;

pub use handlers::TicketState;
pub use repositories::PgTicketRepository;
pub use services::{CommentService, TicketQueryService, TicketService};
