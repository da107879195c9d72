mod purge_dto;

pub use purge_dto::*;
