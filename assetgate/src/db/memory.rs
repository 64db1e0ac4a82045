//! In-process storage backend.
//!
//! Implements the same capabilities as [`PostgresStore`](crate::db::store::PostgresStore) with
//! `DashMap`s, so the service can run without a database (`database.type: memory`) and tests
//! can exercise the full request path. Nothing is persisted across restarts.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

use crate::{
    db::{
        errors::Result,
        models::sessions::Session,
        store::{AssetStore, SessionStore, UserDirectory, UserProvisioner},
    },
    types::{SessionToken, UserId},
};

#[derive(Debug, Clone)]
struct StoredUser {
    id: UserId,
    password_hash: String,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Keyed by login
    users: DashMap<String, StoredUser>,
    next_user_id: AtomicI64,
    /// Every session ever issued, keyed by token
    sessions: DashMap<SessionToken, Session>,
    /// Greatest-seq session per owner
    latest: DashMap<UserId, Session>,
    next_seq: AtomicI64,
    assets: DashMap<(String, UserId), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn lookup_user(&self, login: &str, password_hash: &str) -> Result<Option<UserId>> {
        Ok(self
            .users
            .get(login)
            .filter(|user| user.password_hash == password_hash)
            .map(|user| user.id))
    }
}

#[async_trait]
impl UserProvisioner for MemoryStore {
    async fn upsert_user(&self, login: &str, password_hash: &str) -> Result<UserId> {
        let mut entry = self.users.entry(login.to_string()).or_insert_with(|| StoredUser {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1,
            password_hash: password_hash.to_string(),
        });
        entry.password_hash = password_hash.to_string();
        Ok(entry.id)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, owner: UserId) -> Result<Session> {
        let session = Session {
            token: SessionToken::from(Uuid::new_v4()),
            owner,
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst) + 1,
            opened_at: Utc::now(),
        };

        self.sessions.insert(session.token.clone(), session.clone());
        // Two racing logins may finish out of order; the greater seq must still win
        self.latest
            .entry(owner)
            .and_modify(|current| {
                if session.seq > current.seq {
                    *current = session.clone();
                }
            })
            .or_insert_with(|| session.clone());

        Ok(session)
    }

    async fn latest_session(&self, owner: UserId) -> Result<Option<Session>> {
        Ok(self.latest.get(&owner).map(|session| session.clone()))
    }

    async fn resolve_owner(&self, token: &SessionToken) -> Result<Option<UserId>> {
        Ok(self.sessions.get(token).map(|session| session.owner))
    }
}

#[async_trait]
impl AssetStore for MemoryStore {
    async fn write_asset(&self, name: &str, owner: UserId, payload: &[u8]) -> Result<()> {
        self.assets.insert((name.to_string(), owner), payload.to_vec());
        Ok(())
    }

    async fn read_asset(&self, name: &str, owner: UserId) -> Result<Option<Vec<u8>>> {
        Ok(self.assets.get(&(name.to_string(), owner)).map(|data| data.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_upsert_user_keeps_id_and_replaces_hash() {
        let store = MemoryStore::new();

        let first = store.upsert_user("alice", "old").await.unwrap();
        let second = store.upsert_user("alice", "new").await.unwrap();
        let bob = store.upsert_user("bob", "old").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, bob);
        assert_eq!(store.lookup_user("alice", "old").await.unwrap(), None);
        assert_eq!(store.lookup_user("alice", "new").await.unwrap(), Some(first));
        assert_eq!(store.lookup_user("ghost", "new").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_session_tracks_greatest_seq() {
        let store = MemoryStore::new();

        assert_eq!(store.latest_session(1).await.unwrap(), None);

        let first = store.create_session(1).await.unwrap();
        let second = store.create_session(1).await.unwrap();
        let other = store.create_session(2).await.unwrap();

        assert!(second.seq > first.seq);
        assert_eq!(store.latest_session(1).await.unwrap(), Some(second));
        assert_eq!(store.latest_session(2).await.unwrap(), Some(other));
        assert_eq!(store.resolve_owner(&first.token).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let store = MemoryStore::new();
        assert_eq!(store.resolve_owner(&SessionToken::new("")).await.unwrap(), None);
        assert_eq!(store.resolve_owner(&SessionToken::new("nonexistent-token")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_assets_keyed_by_name_and_owner() {
        let store = MemoryStore::new();

        store.write_asset("report.pdf", 1, b"one").await.unwrap();
        store.write_asset("report.pdf", 2, b"two").await.unwrap();
        store.write_asset("report.pdf", 1, b"uno").await.unwrap();

        assert_eq!(store.read_asset("report.pdf", 1).await.unwrap(), Some(b"uno".to_vec()));
        assert_eq!(store.read_asset("report.pdf", 2).await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.read_asset("report.pdf", 3).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_logins_leave_one_latest() {
        let store = Arc::new(MemoryStore::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.create_session(7).await.unwrap() }));
        }
        let mut created = Vec::new();
        for handle in handles {
            created.push(handle.await.unwrap());
        }

        let max = created.iter().max_by_key(|s| s.seq).unwrap();
        assert_eq!(store.latest_session(7).await.unwrap().as_ref(), Some(max));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_leave_one_payload() {
        let store = Arc::new(MemoryStore::new());
        let a = Arc::new(vec![b'a'; 1024 * 1024]);
        let b = Arc::new(vec![b'b'; 1024 * 1024]);

        for round in 0..16 {
            let name = format!("blob-{round}");
            let write = |payload: Arc<Vec<u8>>| {
                let store = store.clone();
                let name = name.clone();
                tokio::spawn(async move { store.write_asset(&name, 7, &payload).await })
            };

            let (ra, rb) = tokio::join!(write(a.clone()), write(b.clone()));
            ra.unwrap().unwrap();
            rb.unwrap().unwrap();

            let stored = store.read_asset(&name, 7).await.unwrap().unwrap();
            assert!(stored == *a || stored == *b, "round {round} stored a mixed payload");
        }
    }
}
