//! Error taxonomy for the forward operation.
//!
//! Client errors (malformed forward requests) map to 400; anything that
//! goes wrong building or executing the outbound call maps to 500. Every
//! error is terminal for the request and is rendered as `{"error": "..."}`.

use std::error::Error as _;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of a single forward request.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Missing JSON data")]
    MissingPayload,

    #[error("Missing target URL")]
    MissingTargetUrl,

    #[error("Invalid JSON data: {0}")]
    InvalidPayload(serde_json::Error),

    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    #[error("Invalid header {0:?}")]
    InvalidHeader(String),

    #[error("{}", describe(.0))]
    Upstream(#[from] reqwest::Error),
}

impl RelayError {
    /// HTTP status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingPayload
            | RelayError::MissingTargetUrl
            | RelayError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            RelayError::InvalidMethod(_)
            | RelayError::InvalidHeader(_)
            | RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

/// Render a reqwest error with its source chain, e.g.
/// `error sending request for url (...): client error (Connect): tcp connect error: Connection refused`.
fn describe(err: &reqwest::Error) -> String {
    let mut description = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    description
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
