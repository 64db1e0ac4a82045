//! Database record models matching table schemas.
//!
//! These models are returned by the repositories in [`crate::db::handlers`] and by the
//! in-memory backend in [`crate::db::memory`], so both backends speak the same types.
//!
//! - [`users`]: User accounts and their password hashes
//! - [`sessions`]: Login sessions, ordered by a monotonic sequence per user

pub mod sessions;
pub mod users;
