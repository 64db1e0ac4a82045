//! Storage layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ Authenticator /      │
//! │ SessionValidator /   │  (hold Arc<dyn Trait> handles only)
//! │ API handlers         │
//! └──────────┬───────────┘
//!            │
//!            ↓
//! ┌──────────────────────┐
//! │ store traits         │  (UserDirectory, SessionStore, AssetStore)
//! └──────┬────────┬──────┘
//!        │        │
//!        ↓        ↓
//! ┌───────────┐ ┌─────────────┐
//! │ Postgres  │ │ MemoryStore │
//! │ (handlers)│ │ (DashMap)   │
//! └───────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: Storage capability traits and the PostgreSQL backend
//! - [`handlers`]: Repository implementations over a `PgConnection`
//! - [`models`]: Record structures shared by both backends
//! - [`memory`]: In-process backend
//! - [`errors`]: Storage error type
//!
//! # Lifecycle
//!
//! [`Database::open`] builds the backend selected by configuration (connecting the pool and
//! running migrations for PostgreSQL). [`Database::close`] releases the pool; it is called by
//! [`crate::Application::serve`] after the server has stopped.

pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod store;

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tracing::info;

use crate::config::{DatabaseConfig, PoolSettings};
use memory::MemoryStore;
use store::{PostgresStore, Stores};

/// Explicitly owned storage handle.
pub struct Database {
    pool: Option<PgPool>,
    stores: Stores,
}

impl Database {
    /// Open the configured backend.
    pub async fn open(config: &DatabaseConfig) -> anyhow::Result<Self> {
        match config {
            DatabaseConfig::External { url, pool } => {
                info!("Using external database");
                let pg = connect_pool(url, pool).await?;
                crate::migrator().run(&pg).await?;
                Ok(Self::from_pool(pg))
            }
            DatabaseConfig::Memory => {
                info!("Using in-memory storage: data will be lost on shutdown");
                Ok(Self::in_memory())
            }
        }
    }

    /// Wrap an existing, already migrated pool.
    pub fn from_pool(pool: PgPool) -> Self {
        let stores = Stores::from_backend(Arc::new(PostgresStore::new(pool.clone())));
        Self { pool: Some(pool), stores }
    }

    pub fn in_memory() -> Self {
        Self {
            pool: None,
            stores: Stores::from_backend(Arc::new(MemoryStore::new())),
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Close pooled connections. A no-op for the in-memory backend.
    pub async fn close(self) {
        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }
    }
}

/// Create a connection pool with the configured limits.
pub async fn connect_pool(url: &str, settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    // 0 means never
    let idle_timeout = (settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs));
    let max_lifetime = (settings.max_lifetime_secs > 0).then(|| Duration::from_secs(settings.max_lifetime_secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(idle_timeout)
        .max_lifetime(max_lifetime)
        .connect(url)
        .await
}
