//! Rendering of relayed pages for display.

use std::fmt::Write as _;

use crate::browser::client::Relayed;

/// How a loaded page is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// The page with its sub-resources inlined.
    #[default]
    Html,
    /// A text dump of the relayed response.
    Raw,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Html => ViewMode::Raw,
            ViewMode::Raw => ViewMode::Html,
        }
    }
}

/// Decode a body with its declared charset, replacing invalid sequences.
pub fn body_text(relayed: &Relayed) -> String {
    relayed.text().into_owned()
}

/// Text dump: status, URL, encoding, every header, then the body.
pub fn render_raw(url: &str, relayed: &Relayed) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status: {}", relayed.status.as_u16());
    let _ = writeln!(out, "URL: {url}");
    let _ = writeln!(out, "Encoding: {}", relayed.charset().unwrap_or("utf-8"));
    out.push_str("\nHeaders:\n");
    for (name, value) in &relayed.headers {
        let _ = writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
    }
    out.push_str("\nBody:\n");
    out.push_str(&relayed.text());
    out
}

/// Document shown when a page cannot be loaded.
pub fn render_error(mode: ViewMode, message: &str) -> String {
    match mode {
        ViewMode::Raw => format!("Error: {message}\n"),
        ViewMode::Html => format!(
            "<html><body><h1>Load error</h1><p>{}</p></body></html>",
            escape_html(message)
        ),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use reqwest::{
        header::{HeaderMap, HeaderValue},
        StatusCode,
    };

    #[test]
    fn test_raw_dump() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html; charset=utf-8"));
        let relayed = Relayed {
            status: StatusCode::NOT_FOUND,
            headers,
            body: Bytes::from_static(b"no"),
        };

        assert_eq!(
            render_raw("http://a.test/", &relayed),
            "Status: 404\nURL: http://a.test/\nEncoding: utf-8\n\nHeaders:\n\
             content-type: text/html; charset=utf-8\n\nBody:\nno"
        );
    }

    #[test]
    fn test_raw_dump_decodes_declared_charset() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html; charset=gbk"));
        let relayed = Relayed {
            status: StatusCode::OK,
            headers,
            body: Bytes::from_static(b"\xd6\xd0\xce\xc4"),
        };

        let dump = render_raw("http://a.test/", &relayed);
        assert!(dump.contains("\nEncoding: gbk\n"));
        assert!(dump.ends_with("\nBody:\n中文"));
        assert_eq!(body_text(&relayed), "中文");
    }

    #[test]
    fn test_error_page_escapes_message() {
        assert_eq!(
            render_error(ViewMode::Html, "bad <url>"),
            "<html><body><h1>Load error</h1><p>bad &lt;url&gt;</p></body></html>"
        );
        assert_eq!(render_error(ViewMode::Raw, "boom"), "Error: boom\n");
    }

    #[test]
    fn test_toggle() {
        assert_eq!(ViewMode::default().toggled(), ViewMode::Raw);
        assert_eq!(ViewMode::Raw.toggled(), ViewMode::Html);
    }
}
