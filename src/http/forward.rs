//! Forwarding to the chosen backend.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the target base URL
//! - Rewrite `Host` to the target origin when asked to
//! - Strip hop-by-hop headers
//! - Stream request and response bodies without buffering
//!
//! # Design Decisions
//! - Plain HTTP client (`hyper-util` legacy client, pooled)
//! - Connect and total-request timeouts from config
//! - Unreachable backend → 502, timed-out backend → 504

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{header, HeaderValue, Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::TimeoutConfig;
use crate::routing::RouteDecision;

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "upgrade",
];

/// Failure to deliver a request to its backend.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid target `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

/// Relays requests to backends.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Send the request to the decided backend and return its response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        decision: &RouteDecision,
    ) -> Result<Response<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = target_uri(&decision.target, &parts.uri)?;

        for name in HOP_BY_HOP {
            parts.headers.remove(name);
        }
        if decision.change_origin {
            let host = origin_host(&decision.target)?;
            parts.headers.insert(header::HOST, host);
        }

        let request = Request::from_parts(parts, body);
        let response = tokio::time::timeout(self.request_timeout, self.client.request(request))
            .await
            .map_err(|_| ForwardError::Timeout(self.request_timeout))??;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Join the target base URL with the inbound path and query.
pub fn target_uri(target: &Url, inbound: &Uri) -> Result<Uri, ForwardError> {
    let invalid = |reason: String| ForwardError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    let base_path = target.path().trim_end_matches('/');
    let path_and_query = inbound
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");

    format!(
        "{}://{}{}{}",
        target.scheme(),
        authority(target).ok_or_else(|| invalid("missing host".to_string()))?,
        base_path,
        path_and_query
    )
    .parse::<Uri>()
    .map_err(|e| invalid(e.to_string()))
}

fn origin_host(target: &Url) -> Result<HeaderValue, ForwardError> {
    let host = authority(target).ok_or_else(|| ForwardError::InvalidTarget {
        target: target.to_string(),
        reason: "missing host".to_string(),
    })?;
    HeaderValue::from_str(&host).map_err(|e| ForwardError::InvalidTarget {
        target: target.to_string(),
        reason: e.to_string(),
    })
}

/// `host[:port]`, omitting the port when it is the scheme default.
fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
