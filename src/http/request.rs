//! Forward request parsing.
//!
//! # Responsibilities
//! - Decode the JSON description of the outbound request
//! - Distinguish a missing payload from a missing target URL
//! - Normalize the method (default GET, upper-cased)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::RelayError;

/// JSON description of the request the relay should execute.
///
/// Also used by the browser client to build requests, hence `Serialize`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ForwardRequest {
    /// Target URL. Required; kept optional so absence is reported as
    /// `Missing target URL` rather than a generic decode error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty", deserialize_with = "nullable")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty", deserialize_with = "nullable")]
    pub params: HashMap<String, String>,

    /// Any JSON value; sent verbatim as the JSON request body.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

/// Treat an explicit `null` mapping like an absent one.
fn nullable<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let map = Option::<HashMap<String, String>>::deserialize(deserializer)?;
    Ok(map.unwrap_or_default())
}

impl ForwardRequest {
    /// Convenience constructor for a GET of `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            method: Some("GET".to_string()),
            ..Self::default()
        }
    }

    /// Decode a raw request body.
    ///
    /// Empty bodies, invalid JSON, `null` and non-object values are all a
    /// missing payload. An object without a non-empty `url` is a missing
    /// target URL.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => return Err(RelayError::MissingPayload),
        };
        if !value.is_object() {
            return Err(RelayError::MissingPayload);
        }

        let request: ForwardRequest =
            serde_json::from_value(value).map_err(RelayError::InvalidPayload)?;
        match request.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(request),
            _ => Err(RelayError::MissingTargetUrl),
        }
    }

    /// Target URL; empty only for requests that did not come through `from_body`.
    pub fn target(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    /// Upper-cased method, `GET` when unspecified.
    pub fn method_name(&self) -> String {
        self.method
            .as_deref()
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| "GET".to_string())
    }
}
