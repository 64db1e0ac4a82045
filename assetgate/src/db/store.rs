//! Storage capabilities consumed by the auth core and the API handlers.
//!
//! The core never talks to a connection directly: it holds `Arc<dyn ...>` handles to these
//! traits, injected at startup. Two backends implement all of them:
//!
//! - [`PostgresStore`]: the production backend, built on the repositories in
//!   [`crate::db::handlers`]
//! - [`MemoryStore`](crate::db::memory::MemoryStore): an in-process backend for development
//!   and tests
//!
//! Every method is a single independently atomic storage operation. There are no
//! cross-store transactions, and nothing here retries.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    db::{
        errors::Result,
        handlers::{Assets, Sessions, Users},
        models::{sessions::Session, users::UserCreateDBRequest},
    },
    types::{SessionToken, UserId},
};

/// Read-only view of provisioned users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve `(login, password_hash)` by exact match on both fields.
    async fn lookup_user(&self, login: &str, password_hash: &str) -> Result<Option<UserId>>;
}

/// User provisioning. Only used to bootstrap the initial user, never by the request path.
#[async_trait]
pub trait UserProvisioner: Send + Sync {
    /// Create the user or replace its password hash.
    async fn upsert_user(&self, login: &str, password_hash: &str) -> Result<UserId>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session with a fresh token. It becomes the owner's latest session.
    async fn create_session(&self, owner: UserId) -> Result<Session>;

    /// The owner's most recently created session.
    async fn latest_session(&self, owner: UserId) -> Result<Option<Session>>;

    /// The user a token was issued to, whether or not it is still active.
    async fn resolve_owner(&self, token: &SessionToken) -> Result<Option<UserId>>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Insert or fully replace the payload under `(name, owner)`.
    async fn write_asset(&self, name: &str, owner: UserId, payload: &[u8]) -> Result<()>;

    /// Exact-key read. `None` when no asset with this name exists for this owner.
    async fn read_asset(&self, name: &str, owner: UserId) -> Result<Option<Vec<u8>>>;
}

/// Handles to every storage capability, all backed by the same storage.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserDirectory>,
    pub provisioner: Arc<dyn UserProvisioner>,
    pub sessions: Arc<dyn SessionStore>,
    pub assets: Arc<dyn AssetStore>,
}

impl Stores {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserDirectory + UserProvisioner + SessionStore + AssetStore + 'static,
    {
        Self {
            users: backend.clone(),
            provisioner: backend.clone(),
            sessions: backend.clone(),
            assets: backend,
        }
    }
}

/// PostgreSQL backend. Each call checks a connection out of the pool for the duration of one
/// statement.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    async fn lookup_user(&self, login: &str, password_hash: &str) -> Result<Option<UserId>> {
        let mut conn = self.pool.acquire().await?;
        Users::new(&mut conn).lookup(login, password_hash).await
    }
}

#[async_trait]
impl UserProvisioner for PostgresStore {
    async fn upsert_user(&self, login: &str, password_hash: &str) -> Result<UserId> {
        let mut conn = self.pool.acquire().await?;
        let user = Users::new(&mut conn)
            .upsert(&UserCreateDBRequest {
                login: login.to_string(),
                password_hash: password_hash.to_string(),
            })
            .await?;
        Ok(user.id)
    }
}

#[async_trait]
impl SessionStore for PostgresStore {
    async fn create_session(&self, owner: UserId) -> Result<Session> {
        let mut conn = self.pool.acquire().await?;
        Sessions::new(&mut conn).create(owner).await
    }

    async fn latest_session(&self, owner: UserId) -> Result<Option<Session>> {
        let mut conn = self.pool.acquire().await?;
        Sessions::new(&mut conn).latest_for_user(owner).await
    }

    async fn resolve_owner(&self, token: &SessionToken) -> Result<Option<UserId>> {
        let mut conn = self.pool.acquire().await?;
        Sessions::new(&mut conn).owner_of(token).await
    }
}

#[async_trait]
impl AssetStore for PostgresStore {
    async fn write_asset(&self, name: &str, owner: UserId, payload: &[u8]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        Assets::new(&mut conn).upsert(name, owner, payload).await
    }

    async fn read_asset(&self, name: &str, owner: UserId) -> Result<Option<Vec<u8>>> {
        let mut conn = self.pool.acquire().await?;
        Assets::new(&mut conn).get(name, owner).await
    }
}
