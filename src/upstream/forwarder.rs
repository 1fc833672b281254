//! Outbound call execution.
//!
//! # Responsibilities
//! - Translate a ForwardRequest into a reqwest request
//! - Force `Accept-Encoding: identity`
//! - Bound the whole call by the configured timeout
//! - Follow redirects and buffer the final body
//!
//! # Design Decisions
//! - No retries: every failure is terminal for the request
//! - Built without reqwest's decompression features, so bodies arrive as sent
//! - One client shared by all requests; it holds only the connection pool

use std::time::{Duration, Instant};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect, Client, Method,
};

use crate::config::UpstreamConfig;
use crate::http::{ForwardRequest, ForwardResponse, RelayError};
use crate::observability::metrics;
use crate::security::headers::force_identity_encoding;

/// Executes forward requests against arbitrary origins.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
}

impl Forwarder {
    /// Build the outbound client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(redirect::Policy::limited(config.max_redirects));
        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Execute `request` and return the filtered origin response.
    pub async fn forward(&self, request: &ForwardRequest) -> Result<ForwardResponse, RelayError> {
        let method_name = request.method_name();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| RelayError::InvalidMethod(method_name.clone()))?;

        let mut headers = outbound_headers(request)?;
        force_identity_encoding(&mut headers);

        let mut builder = self
            .client
            .request(method, request.target())
            .headers(headers);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if !request.payload.is_null() {
            builder = builder.json(&request.payload);
        }

        let start = Instant::now();
        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let final_url = response.url().to_string();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, final_url, headers, body))
        }
        .await;
        metrics::record_upstream(&method_name, start, result.is_ok());

        let (status, final_url, headers, body) = result?;
        tracing::debug!(
            method = %method_name,
            target = %request.target(),
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            "Origin responded"
        );

        Ok(ForwardResponse::from_origin(status, &headers, body))
    }
}

/// Convert the caller's string map into a header map.
fn outbound_headers(request: &ForwardRequest) -> Result<HeaderMap, RelayError> {
    let mut headers = HeaderMap::with_capacity(request.headers.len() + 1);
    for (name, value) in &request.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| RelayError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}
