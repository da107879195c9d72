pub mod admin;
pub mod auth;
pub mod categories;
pub mod tickets;
pub mod users;
