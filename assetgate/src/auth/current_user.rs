//! Extractor for the owner behind a bearer token.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tracing::instrument;

use crate::{
    AppState,
    errors::{Error, Result},
    types::{SessionToken, UserId},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the session token out of `Authorization: Bearer <token>`.
///
/// Surrounding spaces are stripped from the header value; everything after the prefix is the
/// token, verbatim. A missing header and a non-bearer scheme are both rejected the same way.
pub fn bearer_token(headers: &HeaderMap) -> Result<SessionToken> {
    let invalid = || Error::BadRequest {
        message: "invalid credentials".to_string(),
    };

    let value = headers.get(AUTHORIZATION).ok_or_else(invalid)?;
    let value = value.to_str().map_err(|_| invalid())?;

    value
        .trim_matches(' ')
        .strip_prefix(BEARER_PREFIX)
        .map(SessionToken::new)
        .ok_or_else(invalid)
}

/// The user that owns the presented, still-active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedOwner(pub UserId);

impl FromRequestParts<AppState> for AuthenticatedOwner {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(&parts.headers)?;
        let owner = state.validator.authorize(&token).await?;
        Ok(AuthenticatedOwner(owner))
    }
}
