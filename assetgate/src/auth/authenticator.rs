//! Login: exchange credentials for a session token.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    auth::password::{CredentialHasher, hash_off_runtime},
    db::store::{SessionStore, UserDirectory},
    errors::{Error, Result},
    types::{SessionToken, abbrev_token},
};

#[derive(Clone)]
pub struct Authenticator {
    hasher: Arc<dyn CredentialHasher>,
    users: Arc<dyn UserDirectory>,
    sessions: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(hasher: Arc<dyn CredentialHasher>, users: Arc<dyn UserDirectory>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { hasher, users, sessions }
    }

    /// Open a new session for the user and return its token.
    ///
    /// Every earlier session of the same user stops authorizing once this returns.
    #[instrument(skip(self, password), err)]
    pub async fn login(&self, login: &str, password: &str) -> Result<SessionToken> {
        let password_hash = hash_off_runtime(self.hasher.clone(), password.to_owned()).await?;

        let owner = self
            .users
            .lookup_user(login, &password_hash)
            .await?
            .ok_or(Error::InvalidCredentials)?;

        let created = self.sessions.create_session(owner).await?;

        // A concurrent login may already have superseded the one we just created; hand out
        // whatever is active now.
        let latest = self.sessions.latest_session(owner).await?.ok_or_else(|| Error::Internal {
            operation: format!("read back session for user {owner}"),
        })?;

        if latest.seq != created.seq {
            debug!(user_id = owner, "Session superseded by a concurrent login");
        }
        debug!(user_id = owner, token = %abbrev_token(&latest.token), "Opened session");

        Ok(latest.token)
    }
}
