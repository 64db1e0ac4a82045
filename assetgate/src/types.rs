//! Common type definitions.
//!
//! - [`UserId`]: numeric user identity, assigned by the users table
//! - [`SessionToken`]: opaque session token handed out on login
//!
//! # Utility Functions
//!
//! - [`abbrev_token`]: Abbreviate a token to its first 8 chars for logging

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

pub type UserId = i64;

/// Opaque session token.
///
/// The token itself grants nothing: it authorizes requests only while it is the most recently
/// issued token of its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for SessionToken {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Abbreviate a token to its first 8 characters for more readable logs and traces, without
/// writing a usable credential to the log.
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_token(token: &SessionToken) -> String {
    token.as_str().chars().take(8).collect()
}
