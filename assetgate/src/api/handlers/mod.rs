//! Axum route handlers.
//!
//! - [`auth`]: `POST /api/auth`
//! - [`assets`]: `POST /api/upload-asset/{name}` and `GET /api/asset/{name}`
//!
//! Handlers return [`crate::errors::Error`] on failure, which renders the `{"error": ...}`
//! envelope with the matching status code.

pub mod assets;
pub mod auth;
