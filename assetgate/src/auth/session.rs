//! Session validation: only a user's most recently issued token authorizes.

use std::sync::Arc;
use tracing::{instrument, trace};

use crate::{
    db::store::SessionStore,
    errors::{Error, Result},
    types::{SessionToken, UserId, abbrev_token},
};

#[derive(Clone)]
pub struct SessionValidator {
    sessions: Arc<dyn SessionStore>,
}

impl SessionValidator {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    /// Resolve a presented token to its owner, provided it is still the owner's latest.
    #[instrument(skip_all, fields(token = %abbrev_token(token)), err)]
    pub async fn authorize(&self, token: &SessionToken) -> Result<UserId> {
        let Some(owner) = self.sessions.resolve_owner(token).await? else {
            trace!("Unknown session token");
            return Err(Error::NoOpenSession);
        };

        let latest = self.sessions.latest_session(owner).await?.ok_or(Error::NoOpenSession)?;

        if latest.token != *token {
            trace!(user_id = owner, "Session superseded by a newer login");
            return Err(Error::NoOpenSession);
        }

        Ok(owner)
    }
}
