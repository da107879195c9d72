mod purge_error;
mod purge_service;

pub use purge_error::{PurgeErrorCode, PurgeFailure, PurgeFailureBody};
pub use purge_service::PurgeService;
