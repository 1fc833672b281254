//! Shared utilities for integration testing.

use std::net::SocketAddr;

use axum::Router;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use va_relay::config::RelayConfig;
use va_relay::{RelayServer, Shutdown};

/// Start an origin that answers every connection with `response` verbatim.
///
/// Lets tests send headers an HTTP framework would rewrite or refuse.
#[allow(dead_code)]
pub async fn start_raw_origin(response: impl Into<Vec<u8>>) -> SocketAddr {
    let response: Vec<u8> = response.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let response = response.clone();
            tokio::spawn(async move {
                // Consume the request head before answering.
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// Serve `router` as an origin on an ephemeral port.
#[allow(dead_code)]
pub async fn start_origin(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// Test configuration: ephemeral port, no environment proxies.
pub fn relay_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.use_env_proxy = false;
    config
}

/// Start the relay; dropping or triggering the returned `Shutdown` stops it.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = RelayServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// reqwest client that never goes through an environment proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// POST `body` to the relay.
#[allow(dead_code)]
pub async fn forward(relay: SocketAddr, body: &Value) -> reqwest::Response {
    client()
        .post(format!("http://{relay}/"))
        .json(body)
        .send()
        .await
        .expect("relay unreachable")
}
