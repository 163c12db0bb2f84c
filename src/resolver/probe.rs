//! Data-store probes.
//!
//! A probe asks one case type's data store whether it knows a case id. Any
//! 2xx answer counts as "this case type owns the case"; everything else,
//! including transport errors, counts as "it does not".

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::time::Duration;
use thiserror::Error;

/// Headers copied from the inbound request onto every probe.
pub const FORWARDED_AUTH_HEADERS: [&str; 2] = ["serviceauthorization", "authorization"];

/// Why a probe did not succeed.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("data store answered {0}")]
    Status(StatusCode),
}

/// A single probe against one case type's data store.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    pub case_type: String,
    pub url: String,
    pub headers: HeaderMap,
}

impl ProbeRequest {
    /// Build the probe headers from the inbound request's headers.
    pub fn headers_from(inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in FORWARDED_AUTH_HEADERS {
            if let Some(value) = inbound.get(name) {
                headers.insert(HeaderName::from_static(name), value.clone());
            }
        }
        headers.insert(
            HeaderName::from_static("experimental"),
            HeaderValue::from_static("true"),
        );
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }
}

/// Issues probes. Implemented over HTTP in production and faked in tests.
pub trait CaseProbe: Send + Sync + 'static {
    fn probe(&self, request: ProbeRequest) -> BoxFuture<'static, Result<(), ProbeError>>;
}

/// Probe implementation backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("casegate/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl CaseProbe for HttpProbe {
    fn probe(&self, request: ProbeRequest) -> BoxFuture<'static, Result<(), ProbeError>> {
        let pending = self.client.get(&request.url).headers(request.headers).send();
        async move {
            let response = pending
                .await
                .map_err(|e| ProbeError::Transport(e.to_string()))?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(ProbeError::Status(status))
            }
        }
        .boxed()
    }
}
