//! Relayed response.
//!
//! The origin body is fully buffered, so Content-Length is always exact and
//! the caller never sees a transfer or content coding.

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::security::headers::filter_response_headers;

/// Everything the relay sends back for a successful forward.
#[derive(Debug, Clone)]
pub struct ForwardResponse {
    /// Origin status, not remapped.
    pub status: StatusCode,
    /// Filtered origin headers with a recomputed Content-Length.
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardResponse {
    /// Build a response from the raw origin parts, applying header filtering.
    pub fn from_origin(status: StatusCode, origin_headers: &HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers: filter_response_headers(origin_headers, body.len()),
            body,
        }
    }
}

impl IntoResponse for ForwardResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
