//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: gateway upgrade route plus dispatcher fallback
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Bind server to listener and shut down gracefully
//! - Record per-request logs and metrics

use axum::{
    body::Body,
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::dispatch::Dispatcher;
use super::request::ApiRequest;
use super::response::ApiError;
use crate::config::ServiceConfig;
use crate::gateway::{self, Gateway};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub gateway: Arc<Gateway>,
    pub max_body_bytes: usize,
}

/// HTTP server for the API and the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over already-built services.
    pub fn new(state: AppState, config: &ServiceConfig) -> Self {
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            // Other methods on the gateway path fall through to the route table.
            .route(
                &config.gateway.path,
                get(gateway_handler).fallback(dispatch_handler),
            )
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    // Timeout needs a `Default` response body, so it sits
                    // directly on the router, inside the body limit.
                    .layer(RequestBodyLimitLayer::new(config.http.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.http.request_timeout_secs,
                    ))),
            )
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Upgrade to a websocket and hand the socket to the gateway.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    let gateway = state.gateway.clone();
    ws.on_upgrade(move |socket| gateway::socket::serve(gateway, socket, addr))
}

/// Every non-gateway request goes through the route table.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();

    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let request_id = parts
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = ?remote_addr,
        "Incoming Request"
    );

    let response = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => {
            let mut req = ApiRequest::new(method.clone(), path)
                .with_query(parts.uri.query())
                .with_body(bytes);
            req.headers = parts.headers;
            req.remote_addr = remote_addr;

            match state.dispatcher.dispatch(req).await {
                Ok(response) => response.into_response(),
                Err(err) => err.into_response(),
            }
        }
        Err(_) => ApiError::PayloadTooLarge.into_response(),
    };

    let status = response.status().as_u16();
    metrics::record_request(method.as_str(), status, start_time);
    tracing::info!(
        request_id = %request_id,
        status,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request Finished"
    );

    response
}
