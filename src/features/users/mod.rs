//! Local mirror of identity-provider users.
//!
//! Users are never managed here; each authenticated write refreshes the
//! caller's row so ownership joins resolve.

pub mod services;
