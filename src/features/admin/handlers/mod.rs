mod purge_handler;

pub use purge_handler::*;
