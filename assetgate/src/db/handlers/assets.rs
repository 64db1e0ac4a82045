//! Database repository for assets.

use crate::{db::errors::Result, types::UserId};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Assets<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Assets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert or fully replace the payload stored under `(name, owner)`.
    #[instrument(skip(self, data), fields(size = data.len()), err)]
    pub async fn upsert(&mut self, name: &str, owner: UserId, data: &[u8]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (name, uid, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (name, uid) DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(owner)
        .bind(data)
        .execute(&mut *self.db)
        .await?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn get(&mut self, name: &str, owner: UserId) -> Result<Option<Vec<u8>>> {
        let data = sqlx::query_scalar::<_, Vec<u8>>("SELECT data FROM assets WHERE name = $1 AND uid = $2 LIMIT 1")
            .bind(name)
            .bind(owner)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(data)
    }
}
