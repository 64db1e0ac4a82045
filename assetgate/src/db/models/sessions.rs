//! Database models for login sessions.

use crate::types::{SessionToken, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session.
///
/// Sessions are never updated after creation. A session stops authorizing requests once a
/// session with a greater `seq` exists for the same owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub owner: UserId,
    /// Strictly increasing across all sessions, assigned by storage at insert time
    pub seq: i64,
    pub opened_at: DateTime<Utc>,
}

// Row shape of the sessions table
#[derive(Debug, Clone, FromRow)]
pub(crate) struct SessionRow {
    pub id: Uuid,
    pub seq: i64,
    pub uid: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Self {
            token: SessionToken::from(row.id),
            owner: row.uid,
            seq: row.seq,
            opened_at: row.created_at,
        }
    }
}
