use axum::{
    Json,
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::debug;

use crate::{
    AppState,
    api::models::{ErrorResponse, assets::StatusResponse},
    auth::current_user::AuthenticatedOwner,
    errors::Error,
};

/// Asset name: the one path segment after `/api/asset/` or `/api/upload-asset/`.
///
/// Routes capture the whole remainder of the path, so any other shape (an encoded `/` in the
/// name included) is rejected here, before the bearer token is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AssetName {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Error> {
        let captured = Path::<String>::from_request_parts(parts, state).await.ok();

        match captured.as_ref().map(|Path(rest)| rest.trim_matches('/')) {
            Some(name) if !name.is_empty() && !name.contains('/') => Ok(AssetName(name.to_string())),
            _ => {
                let request_uri = parts.uri.path_and_query().map_or(parts.uri.path(), |pq| pq.as_str());
                Err(Error::BadRequest {
                    message: format!("invalid path: {request_uri}"),
                })
            }
        }
    }
}

/// Upload an asset, replacing any earlier payload stored under the same name
#[utoipa::path(
    post,
    path = "/api/upload-asset/{name}",
    tag = "assets",
    params(("name" = String, Path, description = "Asset name, unique per user")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Asset stored", body = StatusResponse),
        (status = 400, description = "Invalid path, missing bearer token or empty body", body = ErrorResponse),
        (status = 401, description = "Session not open or has expired", body = ErrorResponse),
        (status = 413, description = "Body exceeds max_asset_size"),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(asset = %name, user_id = owner))]
pub async fn upload_asset(
    State(state): State<AppState>,
    AssetName(name): AssetName,
    AuthenticatedOwner(owner): AuthenticatedOwner,
    body: Bytes,
) -> Result<Json<StatusResponse>, Error> {
    if body.is_empty() {
        return Err(Error::BadRequest {
            message: "request body is empty".to_string(),
        });
    }

    state.assets.write_asset(&name, owner, &body).await?;
    debug!(bytes = body.len(), "Asset stored");

    Ok(Json(StatusResponse::ok()))
}

/// Download one of the caller's assets
///
/// An asset that does not exist and an asset owned by someone else are indistinguishable.
#[utoipa::path(
    get,
    path = "/api/asset/{name}",
    tag = "assets",
    params(("name" = String, Path, description = "Asset name")),
    responses(
        (status = 200, description = "Raw asset bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Invalid path, missing or non-bearer Authorization header", body = ErrorResponse),
        (status = 401, description = "Session not open or has expired", body = ErrorResponse),
        (status = 403, description = "Asset absent or not owned by the caller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(asset = %name, user_id = owner))]
pub async fn get_asset(
    State(state): State<AppState>,
    AssetName(name): AssetName,
    AuthenticatedOwner(owner): AuthenticatedOwner,
) -> Result<impl IntoResponse, Error> {
    let data = state.assets.read_asset(&name, owner).await?.ok_or(Error::NotFoundOrForbidden)?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}
