//! Database repository for users.

use crate::{
    db::{
        errors::Result,
        models::users::{UserCreateDBRequest, UserDBResponse},
    },
    types::UserId,
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Resolve a user by exact match on both login and password hash.
    #[instrument(skip(self, password_hash), err)]
    pub async fn lookup(&mut self, login: &str, password_hash: &str) -> Result<Option<UserId>> {
        let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE login = $1 AND password_hash = $2 LIMIT 1")
            .bind(login)
            .bind(password_hash)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(id)
    }

    /// Create the user, or replace the password hash of an existing user with the same login.
    #[instrument(skip(self, request), fields(login = %request.login), err)]
    pub async fn upsert(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (login, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (login) DO UPDATE SET password_hash = EXCLUDED.password_hash
            RETURNING id, login, password_hash, created_at
            "#,
        )
        .bind(&request.login)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }
}
