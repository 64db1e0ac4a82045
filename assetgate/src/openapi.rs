//! OpenAPI document, served at `/api-docs/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

struct BearerSecurityAddon;

impl Modify for BearerSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("Session token")
                        .description(Some(
                            "Token returned by `POST /api/auth`:\n\n\
                            ```\nAuthorization: Bearer <token>\n```\n\n\
                            Only the most recently issued token of a user is accepted.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "assetgate", description = "Session-gated storage for per-user binary assets"),
    modifiers(&BearerSecurityAddon),
    paths(
        api::handlers::auth::login,
        api::handlers::assets::upload_asset,
        api::handlers::assets::get_asset,
    ),
    components(schemas(
        api::models::ErrorResponse,
        api::models::auth::LoginRequest,
        api::models::auth::LoginResponse,
        api::models::assets::StatusResponse,
    )),
    tags(
        (name = "authentication", description = "Session login"),
        (name = "assets", description = "Per-user asset upload and download"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/auth"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/upload-asset/{name}"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/asset/{name}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
