//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and proxy handlers
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Dispatch requests to the routing engine
//! - Forward requests to the chosen backend

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::forward::Forwarder;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::HealthStatus;
use crate::observability::metrics;
use crate::resolver::HttpProbe;
use crate::routing::{BuildError, Dispatcher, RouteError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub forwarder: Forwarder,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server that probes data stores over HTTP.
    pub fn new(config: GatewayConfig) -> Result<Self, BuildError> {
        let probe = HttpProbe::new(Duration::from_secs(config.lookup.probe_timeout_secs))?;
        let dispatcher = Dispatcher::from_config(&config, Arc::new(probe))?;
        Ok(Self::with_dispatcher(config, dispatcher))
    }

    /// Create a server around an existing dispatcher.
    pub fn with_dispatcher(config: GatewayConfig, dispatcher: Dispatcher) -> Self {
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            forwarder: Forwarder::new(&config.timeouts),
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", any(health_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Liveness check for any method. Never touches routing.
async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus::up())
}

/// Main proxy handler.
/// Resolves the route, then forwards the request unchanged.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let original_url = request.uri().to_string();

    let (parts, body) = request.into_parts();
    let decision = match state.dispatcher.dispatch(&parts.uri, &parts.headers).await {
        Ok(decision) => decision,
        Err(e @ RouteError::NotFound { .. }) => {
            tracing::warn!(request_id = %request_id, path = %parts.uri.path(), "No route matched");
            metrics::record_request("none", StatusCode::NOT_FOUND.as_u16(), start_time);
            return e.into_response();
        }
        Err(e @ RouteError::MissingRouteConfiguration { .. }) => {
            tracing::error!(request_id = %request_id, error = %e, "Route configuration is incomplete");
            metrics::record_request("none", StatusCode::INTERNAL_SERVER_ERROR.as_u16(), start_time);
            return e.into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        rule = %decision.rule,
        case_type = %decision.case_type,
        "{} -> {}",
        original_url,
        decision.target
    );

    let request = Request::from_parts(parts, body);
    match state.forwarder.forward(request, &decision).await {
        Ok(response) => {
            metrics::record_request(&decision.rule, response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                target = %decision.target,
                error = %e,
                "Upstream error"
            );
            let response = e.into_response();
            metrics::record_request(&decision.rule, response.status().as_u16(), start_time);
            response
        }
    }
}
