//! End-to-end tests of the forward endpoint against local origins.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::Redirect,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};

mod common;

const FILTERED: [&str; 11] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "content-encoding",
    "vary",
    "accept-encoding",
];

/// Echo what the origin received, as JSON.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "query": uri.query(),
        "accept_encoding": header("accept-encoding"),
        "content_type": header("content-type"),
        "x_token": header("x-token"),
        "body": String::from_utf8_lossy(&body),
    }))
}

fn origin_router() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
        .route("/start", get(|| async { Redirect::temporary("/hop") }))
        .route("/hop", get(|| async { Redirect::to("/end") }))
        .route("/end", get(|| async { "end of the line" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "too late"
            }),
        )
}

#[tokio::test]
async fn test_gzip_labelled_body_relayed_uncompressed() {
    let origin = common::start_raw_origin(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: text/plain\r\n\
         Content-Encoding: gzip\r\n\
         Content-Length: 5\r\n\
         Connection: close\r\n\r\n\
         hello"
            .to_string(),
    )
    .await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({"url": format!("http://{origin}/"), "method": "GET"})).await;

    assert_eq!(res.status(), 200);
    assert!(res.headers().get("content-encoding").is_none());
    assert_eq!(res.headers()["content-length"], "5");
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.bytes().await.unwrap(), "hello");
}

#[tokio::test]
async fn test_filtered_headers_never_relayed() {
    let origin = common::start_raw_origin(
        "HTTP/1.1 200 OK\r\n\
         Keep-Alive: timeout=5\r\n\
         Proxy-Authenticate: Basic\r\n\
         Trailers: X-Checksum\r\n\
         Vary: Accept-Encoding\r\n\
         Accept-Encoding: gzip\r\n\
         X-Origin: yes\r\n\
         Set-Cookie: a=1\r\n\
         Set-Cookie: b=2\r\n\
         Content-Length: 11\r\n\
         Connection: close\r\n\r\n\
         hello world"
            .to_string(),
    )
    .await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({"url": format!("http://{origin}/")})).await;

    assert_eq!(res.status(), 200);
    for name in FILTERED {
        assert!(res.headers().get(name).is_none(), "{name} was relayed");
    }
    assert_eq!(res.headers()["x-origin"], "yes");
    assert_eq!(res.headers().get_all("set-cookie").iter().count(), 2);
    assert_eq!(res.headers()["content-length"], "11");
    assert_eq!(res.text().await.unwrap(), "hello world");
}

#[tokio::test]
async fn test_binary_body_relayed_byte_for_byte() {
    let body: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, 0xff, 0xfe, 0xc3, 0x28, 0x80, b'\r', b'\n'];
    let mut response = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: application/octet-stream\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    response.extend_from_slice(body);
    let origin = common::start_raw_origin(response).await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({"url": format!("http://{origin}/blob")})).await;

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-length"], body.len().to_string().as_str());
    assert_eq!(res.bytes().await.unwrap().as_ref(), body);
}

#[tokio::test]
async fn test_request_shape_reaches_origin() {
    let origin = common::start_origin(origin_router()).await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(
        relay,
        &json!({
            "url": format!("http://{origin}/echo"),
            "method": "put",
            "headers": {"Accept-Encoding": "gzip, br", "X-Token": "t0k"},
            "params": {"q": "rust"},
            "payload": {"k": [1, 2]},
        }),
    )
    .await;

    assert_eq!(res.status(), 200);
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed["method"], "PUT");
    assert_eq!(echoed["query"], "q=rust");
    assert_eq!(echoed["accept_encoding"], "identity");
    assert_eq!(echoed["x_token"], "t0k");
    assert_eq!(echoed["content_type"], "application/json");
    let body: Value = serde_json::from_str(echoed["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, json!({"k": [1, 2]}));
}

#[tokio::test]
async fn test_non_object_payload_sent_as_json() {
    let origin = common::start_origin(origin_router()).await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(
        relay,
        &json!({"url": format!("http://{origin}/echo"), "method": "POST", "payload": "plain"}),
    )
    .await;
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed["body"], "\"plain\"");
    assert_eq!(echoed["content_type"], "application/json");

    let res = common::forward(relay, &json!({"url": format!("http://{origin}/echo")})).await;
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed["method"], "GET");
    assert_eq!(echoed["body"], "");
    assert_eq!(echoed["content_type"], Value::Null);
}

#[tokio::test]
async fn test_origin_status_not_remapped() {
    let origin = common::start_origin(origin_router()).await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({"url": format!("http://{origin}/missing")})).await;
    assert_eq!(res.status(), 404);
    assert_eq!(res.headers()["content-length"], "4");
    assert_eq!(res.text().await.unwrap(), "nope");
}

#[tokio::test]
async fn test_redirects_followed() {
    let origin = common::start_origin(origin_router()).await;
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({"url": format!("http://{origin}/start")})).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "end of the line");
}

#[tokio::test]
async fn test_empty_object_is_missing_target_url() {
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({})).await;
    assert_eq!(res.status(), 400);
    assert_eq!(res.text().await.unwrap(), r#"{"error":"Missing target URL"}"#);
}

#[tokio::test]
async fn test_absent_body_is_missing_payload() {
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::client()
        .post(format!("http://{relay}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "Missing JSON data"}));
}

#[tokio::test]
async fn test_unreachable_origin_is_server_error() {
    let (relay, _shutdown) = common::start_relay(common::relay_config()).await;

    let res = common::forward(relay, &json!({"url": "http://127.0.0.1:1/"})).await;
    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    let description = body["error"].as_str().unwrap();
    assert!(!description.is_empty());
}

#[tokio::test]
async fn test_slow_origin_times_out() {
    let origin = common::start_origin(origin_router()).await;
    let mut config = common::relay_config();
    config.upstream.timeout_secs = 1;
    let (relay, _shutdown) = common::start_relay(config).await;

    let start = Instant::now();
    let res = common::forward(relay, &json!({"url": format!("http://{origin}/slow")})).await;

    assert_eq!(res.status(), 500);
    assert!(start.elapsed() < Duration::from_secs(3));
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let (relay, shutdown) = common::start_relay(common::relay_config()).await;
    let res = common::forward(relay, &json!({})).await;
    assert_eq!(res.status(), 400);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let result = common::client()
        .post(format!("http://{relay}/"))
        .body("{}")
        .send()
        .await;
    assert!(result.is_err(), "relay still serving after shutdown");
}
