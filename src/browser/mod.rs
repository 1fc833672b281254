//! Resource-rewriting client for the relay.
//!
//! # Data Flow
//! ```text
//! user input → normalize_url
//!     → client.rs (POST / on the relay)
//!     → Html mode: inline.rs (images, stylesheets, scripts re-fetched through the relay)
//!       Raw mode:  view.rs (text dump)
//!     → document for the render surface
//! ```
//!
//! Sub-resource failures are never fatal; a failed page load renders an
//! error document instead.

pub mod client;
pub mod inline;
pub mod view;

use url::Url;

pub use client::{RelayClient, Relayed};
pub use inline::{inline_resources, Resource, ResourceFetcher};
pub use view::ViewMode;

/// Prefix `http://` unless the input already names http or https.
pub fn normalize_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("http://{input}")
    }
}

/// A loaded page ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Normalized URL that was requested.
    pub url: String,
    pub document: String,
    /// False when `document` is an error document.
    pub loaded: bool,
}

/// Loads pages through a relay and renders them in the current view mode.
#[derive(Debug, Clone)]
pub struct Browser {
    client: RelayClient,
    mode: ViewMode,
}

impl Browser {
    pub fn new(client: RelayClient, mode: ViewMode) -> Self {
        Self { client, mode }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn client_mut(&mut self) -> &mut RelayClient {
        &mut self.client
    }

    /// Load `input` and render it. Never fails: errors become an error document.
    pub async fn load(&self, input: &str) -> Page {
        let url = normalize_url(input);
        tracing::info!(url = %url, mode = ?self.mode, "Loading");

        match self.render(&url).await {
            Ok(document) => {
                tracing::info!(url = %url, "Load complete");
                Page {
                    url,
                    document,
                    loaded: true,
                }
            }
            Err(message) => {
                tracing::warn!(url = %url, error = %message, "Load failed");
                Page {
                    document: view::render_error(self.mode, &message),
                    url,
                    loaded: false,
                }
            }
        }
    }

    async fn render(&self, url: &str) -> Result<String, String> {
        let relayed = self.client.fetch(url).await.map_err(|e| e.to_string())?;
        match self.mode {
            ViewMode::Raw => Ok(view::render_raw(url, &relayed)),
            ViewMode::Html => {
                let base = Url::parse(url).map_err(|e| e.to_string())?;
                let html = view::body_text(&relayed);
                Ok(inline_resources(&html, &base, &self.client).await)
            }
        }
    }
}
