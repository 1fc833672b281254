//! Sub-resource inlining.
//!
//! Rewrites a page so it renders without further network access:
//! - `<img src>` becomes a base64 `data:` URI
//! - `<link rel="stylesheet" href>` is removed and its CSS appended to `<head>`
//! - `<script src>` is replaced by an inline `<script>` with the fetched code
//!
//! The page is tokenized with `lol_html`, so markup inside comments, script
//! code and quoted attribute values is never mistaken for a tag. A first
//! rewriter pass collects references, the fetches run sequentially (images,
//! then stylesheets, then scripts, each in document order), and a second pass
//! applies the results. A reference that cannot be resolved or fetched is
//! left exactly as it was.

use std::collections::VecDeque;
use std::future::Future;

use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine};
use lol_html::html_content::{ContentType, Element};
use lol_html::{element, rewrite_str, RewriteStrSettings};
use url::Url;

use crate::browser::client::decode_text;

const IMAGES: &str = "img[src]";
const STYLESHEETS: &str = "link[href]";
const SCRIPTS: &str = "script[src]";

/// A fetched sub-resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Value of the origin's Content-Type header.
    pub mime: String,
    pub data: Bytes,
}

impl Resource {
    /// Media type without parameters, e.g. `image/svg+xml`.
    pub fn media_type(&self) -> &str {
        self.mime.split(';').next().unwrap_or_default().trim()
    }

    /// Body decoded with the charset of its Content-Type.
    pub fn text(&self) -> String {
        decode_text(&self.data, &self.mime).into_owned()
    }

    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type(), STANDARD.encode(&self.data))
    }
}

/// Source of sub-resources. `None` means the fetch failed and the reference
/// should stay untouched.
pub trait ResourceFetcher {
    fn fetch_resource(&self, url: &Url) -> impl Future<Output = Option<Resource>> + Send;
}

/// References found in a page, one entry per matching element.
#[derive(Debug, Default)]
struct References {
    images: Vec<String>,
    stylesheets: Vec<String>,
    scripts: Vec<String>,
}

/// Inline every image, stylesheet and script `html` references.
pub async fn inline_resources<F: ResourceFetcher>(html: &str, base: &Url, fetcher: &F) -> String {
    let references = match collect(html) {
        Ok(references) => references,
        Err(e) => {
            tracing::warn!(error = %e, "Page could not be tokenized; left as is");
            return html.to_string();
        }
    };

    let mut images = VecDeque::with_capacity(references.images.len());
    for src in &references.images {
        images.push_back(fetch(src, base, fetcher).await.map(|r| r.data_uri()));
    }
    let mut stylesheets = VecDeque::with_capacity(references.stylesheets.len());
    for href in &references.stylesheets {
        stylesheets.push_back(fetch(href, base, fetcher).await.map(|r| r.text()));
    }
    let mut scripts = VecDeque::with_capacity(references.scripts.len());
    for src in &references.scripts {
        scripts.push_back(fetch(src, base, fetcher).await.map(|r| r.text()));
    }

    let styles: String = stylesheets
        .iter()
        .flatten()
        .map(|css| format!("<style>{css}</style>"))
        .collect();

    match rewrite(html, images, stylesheets, scripts, &styles) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            tracing::warn!(error = %e, "Page rewrite failed; left as is");
            html.to_string()
        }
    }
}

/// First pass: record the reference of every candidate element.
fn collect(html: &str) -> Result<References, lol_html::errors::RewritingError> {
    let mut images = Vec::new();
    let mut stylesheets = Vec::new();
    let mut scripts = Vec::new();

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(IMAGES, |el| {
                    images.extend(reference(el, "src"));
                    Ok(())
                }),
                element!(STYLESHEETS, |el| {
                    if is_stylesheet(el) {
                        stylesheets.extend(reference(el, "href"));
                    }
                    Ok(())
                }),
                element!(SCRIPTS, |el| {
                    scripts.extend(reference(el, "src"));
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;

    Ok(References {
        images,
        stylesheets,
        scripts,
    })
}

/// Second pass: apply fetched results in the order `collect` found them.
fn rewrite(
    html: &str,
    mut images: VecDeque<Option<String>>,
    mut stylesheets: VecDeque<Option<String>>,
    mut scripts: VecDeque<Option<String>>,
    styles: &str,
) -> Result<String, lol_html::errors::RewritingError> {
    let mut head_seen = false;

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(IMAGES, |el| {
                    if let Some(data_uri) = images.pop_front().flatten() {
                        el.set_attribute("src", &data_uri)?;
                    }
                    Ok(())
                }),
                element!(STYLESHEETS, |el| {
                    if is_stylesheet(el) && stylesheets.pop_front().flatten().is_some() {
                        el.remove();
                    }
                    Ok(())
                }),
                element!(SCRIPTS, |el| {
                    if let Some(code) = scripts.pop_front().flatten() {
                        el.replace(&format!("<script>{code}</script>"), ContentType::Html);
                    }
                    Ok(())
                }),
                element!("head", |el| {
                    if !head_seen {
                        head_seen = true;
                        el.append(styles, ContentType::Html);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )?;

    if head_seen || styles.is_empty() {
        Ok(rewritten)
    } else {
        Ok(format!("{styles}{rewritten}"))
    }
}

fn reference(el: &Element<'_, '_>, name: &str) -> Option<String> {
    el.get_attribute(name).map(|value| decode_entities(&value))
}

fn is_stylesheet(el: &Element<'_, '_>) -> bool {
    el.get_attribute("rel").is_some_and(|rel| {
        rel.split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Resolve `reference` against `base` and fetch it. Empty references,
/// non-http(s) targets, failed fetches and empty bodies all yield `None`.
async fn fetch<F: ResourceFetcher>(reference: &str, base: &Url, fetcher: &F) -> Option<Resource> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    let url = match base.join(reference) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(reference = %reference, error = %e, "Unresolvable resource reference");
            return None;
        }
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let resource = fetcher.fetch_resource(&url).await?;
    if resource.data.is_empty() || resource.media_type().is_empty() {
        return None;
    }
    Some(resource)
}

fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
