//! Client for the relay's forward endpoint.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use axum::body::Bytes;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Client, StatusCode,
};
use url::Url;

use crate::browser::inline::{Resource, ResourceFetcher};
use crate::http::ForwardRequest;

/// Browser-like identity sent with every relayed fetch.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Deadline for one call to the relay, matching the relay's own outbound timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Response as returned by the relay.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Relayed {
    /// Content-Type header, `text/plain` when absent.
    pub fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain")
    }

    /// `charset` parameter of the Content-Type, if declared.
    pub fn charset(&self) -> Option<&str> {
        charset(self.content_type())
    }

    /// Body decoded with the declared charset.
    pub fn text(&self) -> Cow<'_, str> {
        decode_text(&self.body, self.content_type())
    }
}

/// `charset` parameter of a Content-Type value.
pub fn charset(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// Decode `body` using the charset of `content_type`. Unknown or missing
/// labels fall back to UTF-8; a byte order mark overrides the label.
pub fn decode_text<'a>(body: &'a [u8], content_type: &str) -> Cow<'a, str> {
    let encoding = charset(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text
}

/// Issues forward requests to one relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    relay_url: String,
}

impl RelayClient {
    pub fn new(relay_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self::with_client(relay_url, client))
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(relay_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            relay_url: relay_url.into(),
        }
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// Point the client at a different relay.
    pub fn set_relay_url(&mut self, relay_url: impl Into<String>) {
        self.relay_url = relay_url.into();
    }

    /// GET `target` through the relay.
    pub async fn fetch(&self, target: &str) -> Result<Relayed, reqwest::Error> {
        let request = ForwardRequest {
            headers: HashMap::from([
                ("User-Agent".to_string(), USER_AGENT.to_string()),
                ("Accept-Language".to_string(), ACCEPT_LANGUAGE.to_string()),
            ]),
            ..ForwardRequest::get(target)
        };

        let response = self
            .client
            .post(&self.relay_url)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Relayed {
            status,
            headers,
            body,
        })
    }
}

impl ResourceFetcher for RelayClient {
    async fn fetch_resource(&self, url: &Url) -> Option<Resource> {
        match self.fetch(url.as_str()).await {
            Ok(relayed) if relayed.status.is_success() => Some(Resource {
                mime: relayed.content_type().to_string(),
                data: relayed.body,
            }),
            Ok(relayed) => {
                tracing::debug!(url = %url, status = relayed.status.as_u16(), "Resource not inlined");
                None
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Resource fetch failed");
                None
            }
        }
    }
}
