//! Database repository for login sessions.

use crate::{
    db::{
        errors::Result,
        models::sessions::{Session, SessionRow},
    },
    types::{SessionToken, UserId, abbrev_token},
};
use sqlx::PgConnection;
use tracing::{instrument, trace};
use uuid::Uuid;

pub struct Sessions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Open a new session for `owner`. The token and sequence number are generated by the
    /// database.
    #[instrument(skip(self), err)]
    pub async fn create(&mut self, owner: UserId) -> Result<Session> {
        let row = sqlx::query_as::<_, SessionRow>("INSERT INTO sessions (uid) VALUES ($1) RETURNING id, seq, uid, created_at")
            .bind(owner)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(row.into())
    }

    /// The session with the greatest sequence number for `owner`, if any.
    #[instrument(skip(self), err)]
    pub async fn latest_for_user(&mut self, owner: UserId) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT id, seq, uid, created_at FROM sessions WHERE uid = $1 ORDER BY seq DESC LIMIT 1")
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.map(Session::from))
    }

    /// Which user a token was issued to, regardless of whether it is still active.
    #[instrument(skip(self, token), fields(token = %abbrev_token(token)), err)]
    pub async fn owner_of(&mut self, token: &SessionToken) -> Result<Option<UserId>> {
        // Tokens are UUID primary keys; anything else cannot exist in the table
        let Ok(id) = Uuid::parse_str(token.as_str()) else {
            trace!("Token is not a UUID, treating as unknown");
            return Ok(None);
        };

        let uid = sqlx::query_scalar::<_, UserId>("SELECT uid FROM sessions WHERE id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(uid)
    }
}

#[cfg(all(test, feature = "postgres-tests"))]
mod tests {
    use super::*;
    use crate::db::{handlers::Users, models::users::UserCreateDBRequest};
    use sqlx::PgPool;

    async fn create_user(conn: &mut PgConnection, login: &str) -> UserId {
        Users::new(conn)
            .upsert(&UserCreateDBRequest {
                login: login.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_latest_session_is_most_recent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let uid = create_user(&mut conn, "alice").await;
        let mut repo = Sessions::new(&mut conn);

        assert_eq!(repo.latest_for_user(uid).await.unwrap(), None);

        let first = repo.create(uid).await.unwrap();
        let second = repo.create(uid).await.unwrap();
        assert_ne!(first.token, second.token);
        assert!(second.seq > first.seq);

        let latest = repo.latest_for_user(uid).await.unwrap().unwrap();
        assert_eq!(latest.token, second.token);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_of_resolves_superseded_tokens(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let uid = create_user(&mut conn, "alice").await;
        let mut repo = Sessions::new(&mut conn);

        let first = repo.create(uid).await.unwrap();
        repo.create(uid).await.unwrap();

        assert_eq!(repo.owner_of(&first.token).await.unwrap(), Some(uid));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_of_unknown_tokens(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Sessions::new(&mut conn);

        assert_eq!(repo.owner_of(&SessionToken::new("")).await.unwrap(), None);
        assert_eq!(repo.owner_of(&SessionToken::new("nonexistent-token")).await.unwrap(), None);
        assert_eq!(repo.owner_of(&SessionToken::from(Uuid::new_v4())).await.unwrap(), None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_sessions_are_per_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = create_user(&mut conn, "alice").await;
        let bob = create_user(&mut conn, "bob").await;
        let mut repo = Sessions::new(&mut conn);

        let alice_session = repo.create(alice).await.unwrap();
        repo.create(bob).await.unwrap();

        let latest = repo.latest_for_user(alice).await.unwrap().unwrap();
        assert_eq!(latest.token, alice_session.token);
    }
}
