//! Repository implementations for PostgreSQL access.
//!
//! Each repository wraps a borrowed `PgConnection` (pooled connection or transaction), binds
//! parameters, and returns models from [`crate::db::models`]:
//!
//! - [`Users`]: user lookup by credentials, plus creation for provisioning
//! - [`Sessions`]: session creation and latest-session queries
//! - [`Assets`]: per-owner asset upsert and read
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let owner = Users::new(&mut conn).lookup("alice", &hash).await?;
//! ```

pub mod assets;
pub mod sessions;
pub mod users;

pub use assets::Assets;
pub use sessions::Sessions;
pub use users::Users;
