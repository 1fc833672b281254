//! Header manipulation for relayed responses.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from origin responses
//! - Strip compression/negotiation headers (the body is always identity-encoded)
//! - Recompute Content-Length for the exact relayed body
//!
//! # Design Decisions
//! - Matching is case-insensitive (HeaderName is normalized to lowercase)
//! - Every value of a multi-valued header (e.g. Set-Cookie) is kept

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Headers meaningful only on a single connection.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Headers describing a content coding the relay never passes through.
pub const ENCODING_HEADERS: [&str; 3] = ["content-encoding", "vary", "accept-encoding"];

/// Value forced onto every outbound `Accept-Encoding` header.
pub const IDENTITY_ENCODING: &str = "identity";

/// Returns true if the header must not be relayed back to the caller.
pub fn is_filtered(name: &HeaderName) -> bool {
    let name = name.as_str();
    HOP_BY_HOP_HEADERS.contains(&name) || ENCODING_HEADERS.contains(&name)
}

/// Build the header set returned to the caller for a body of `body_len` bytes.
pub fn filter_response_headers(headers: &HeaderMap, body_len: usize) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_filtered(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        filtered.append(name.clone(), value.clone());
    }
    filtered.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
    filtered
}

/// Force an uncompressed response from the origin.
pub fn force_identity_encoding(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static(IDENTITY_ENCODING),
    );
}
