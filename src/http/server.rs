//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the single forward endpoint
//! - Wire up middleware (request ID, tracing, body limit, concurrency limit)
//! - Serve on a bound listener until shutdown
//! - Dispatch forward requests to the outbound client

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::{ForwardRequest, RelayError};
use crate::lifecycle::shutdown::signalled;
use crate::observability::metrics;
use crate::upstream::Forwarder;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let state = AppState {
            forwarder: Forwarder::new(&config.upstream)?,
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", post(forward_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(ConcurrencyLimitLayer::new(config.listener.max_connections))
                    .layer(DefaultBodyLimit::disable())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. In-flight requests are drained first.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_secs = self.config.upstream.timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The fully layered router, for embedding in another server.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// `POST /`: decode the forward request, execute it, relay the result.
async fn forward_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match ForwardRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => return reject("-", e),
    };
    let method = request.method_name();

    tracing::debug!(method = %method, target = %request.target(), "Forwarding request");

    match state.forwarder.forward(&request).await {
        Ok(relayed) => {
            metrics::record_request(&method, relayed.status.as_u16());
            tracing::info!(
                method = %method,
                target = %request.target(),
                status = relayed.status.as_u16(),
                bytes = relayed.body.len(),
                "Relayed"
            );
            relayed.into_response()
        }
        Err(e) => reject(&method, e),
    }
}

fn reject(method: &str, err: RelayError) -> Response {
    let status = err.status();
    if err.is_client_error() {
        tracing::warn!(status = status.as_u16(), error = %err, "Rejected forward request");
    } else {
        tracing::error!(method = %method, error = %err, "Upstream failure");
    }
    metrics::record_request(method, status.as_u16());
    err.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn router() -> Router {
        RelayServer::new(RelayConfig::default()).unwrap().into_router()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_object_is_missing_url() {
        let response = router()
            .oneshot(Request::post("/").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(body_string(response).await, r#"{"error":"Missing target URL"}"#);
    }

    #[tokio::test]
    async fn test_no_body_is_missing_payload() {
        let response = router()
            .oneshot(Request::post("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, r#"{"error":"Missing JSON data"}"#);
    }

    #[tokio::test]
    async fn test_only_post_root_is_routed() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = router()
            .oneshot(Request::post("/other").body(Body::from("{}")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let mut config = RelayConfig::default();
        config.security.max_body_size = 16;
        let router = RelayServer::new(config).unwrap().into_router();

        let response = router
            .oneshot(
                Request::post("/")
                    .body(Body::from(r#"{"url":"http://example.com/a/long/path"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
