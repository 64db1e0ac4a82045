//! Per-request deadline.
//!
//! `tower_http`'s timeout answers with a bare 408. The middleware here sits outside it and
//! swaps that for the usual `{"error": ..}` body, so clients see one error shape everywhere.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::errors::Error;

/// Fail any request that has not produced a response within `timeout`.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(middleware::from_fn(timeout_envelope))
}

async fn timeout_envelope(request: Request<Body>, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return Error::RequestTimeout.into_response();
    }

    response
}
