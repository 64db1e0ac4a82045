use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::SessionToken;

/// Credentials exchanged for a session token. Unknown fields are rejected.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub login: String,
    #[schema(example = "secret")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the asset endpoints. Valid until the same user logs in again.
    #[schema(value_type = String, example = "550e8400-e29b-41d4-a716-446655440000")]
    pub token: SessionToken,
}
