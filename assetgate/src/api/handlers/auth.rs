use axum::{Json, extract::State};
use bytes::Bytes;

use crate::{
    AppState,
    api::models::{
        ErrorResponse,
        auth::{LoginRequest, LoginResponse},
    },
    errors::Error,
};

/// Log in and open a new session
///
/// Supersedes every session the user had before: their earlier tokens stop working. The body
/// is decoded as JSON whatever `Content-Type` the client sent.
#[utoipa::path(
    post,
    path = "/api/auth",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Malformed body or unknown fields", body = ErrorResponse),
        (status = 401, description = "Invalid login/password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Json<LoginResponse>, Error> {
    let request: LoginRequest = serde_json::from_slice(&body).map_err(|e| Error::BadRequest {
        message: format!("invalid request: {e}"),
    })?;

    let token = state.authenticator.login(&request.login, &request.password).await?;

    Ok(Json(LoginResponse { token }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_app, create_test_user};
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn test_login_returns_token() {
        let (server, stores) = create_test_app().await;
        create_test_user(&stores, "alice", "secret").await;

        let response = server.post("/api/auth").json(&json!({"login": "alice", "password": "secret"})).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[test_log::test(tokio::test)]
    async fn test_login_wrong_password() {
        let (server, stores) = create_test_app().await;
        create_test_user(&stores, "alice", "secret").await;

        let response = server.post("/api/auth").json(&json!({"login": "alice", "password": "nope"})).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"error": "invalid login/password"}));
    }

    #[test_log::test(tokio::test)]
    async fn test_login_unknown_user_matches_wrong_password() {
        let (server, _stores) = create_test_app().await;

        let response = server.post("/api/auth").json(&json!({"login": "ghost", "password": "secret"})).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({"error": "invalid login/password"}));
    }

    #[test_log::test(tokio::test)]
    async fn test_login_rejects_unknown_fields() {
        let (server, stores) = create_test_app().await;
        create_test_user(&stores, "alice", "secret").await;

        let response = server
            .post("/api/auth")
            .json(&json!({"login": "alice", "password": "secret", "remember_me": true}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().is_some_and(|e| e.starts_with("invalid request")));
    }

    #[test_log::test(tokio::test)]
    async fn test_login_rejects_malformed_json() {
        let (server, _stores) = create_test_app().await;

        let response = server
            .post("/api/auth")
            .text("{\"login\": ")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn test_login_ignores_content_type() {
        let (server, stores) = create_test_app().await;
        create_test_user(&stores, "alice", "secret").await;
        let body = json!({"login": "alice", "password": "secret"}).to_string();

        for content_type in ["application/x-www-form-urlencoded", "text/plain"] {
            let response = server.post("/api/auth").text(&body).content_type(content_type).await;

            response.assert_status_ok();
            let issued: Value = response.json();
            assert!(issued["token"].as_str().is_some_and(|t| !t.is_empty()), "{content_type}");
        }

        // No Content-Type header at all
        let response = server.post("/api/auth").bytes(body.into_bytes().into()).await;
        response.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_login_rejects_empty_body() {
        let (server, _stores) = create_test_app().await;

        let response = server.post("/api/auth").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().is_some_and(|e| e.starts_with("invalid request")));
    }

    #[test_log::test(tokio::test)]
    async fn test_login_wrong_method() {
        let (server, _stores) = create_test_app().await;

        let response = server.get("/api/auth").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"error": "invalid request method"}));
    }
}
