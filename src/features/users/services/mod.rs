mod user_sync;

pub use user_sync::upsert_user;
