//! Request and response bodies of the HTTP API.

pub mod assets;
pub mod auth;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "session not open or has expired")]
    pub error: String,
}
