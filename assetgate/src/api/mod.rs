//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//!
//! # Routes
//!
//! - `POST /api/auth`: exchange `{"login", "password"}` for `{"token"}`
//! - `POST /api/upload-asset/{name}`: store the raw body under `name` for the caller
//! - `GET /api/asset/{name}`: fetch one of the caller's assets as raw bytes
//!
//! The asset routes require `Authorization: Bearer <token>`. A request with a method the route
//! does not support gets `400 {"error": "invalid request method"}`.

pub mod handlers;
pub mod models;
