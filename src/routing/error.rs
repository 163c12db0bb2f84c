//! Routing error types.

use thiserror::Error;

use crate::routing::matcher::PatternError;
use crate::routing::Service;

/// Errors produced while routing a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No rule matches the request path.
    #[error("Not Found: {path}")]
    NotFound { path: String },

    /// The route table has no URL for the requested service.
    ///
    /// This is a deployment defect rather than a per-request condition.
    #[error("no `{service}` URL configured for case type `{case_type}`")]
    MissingRouteConfiguration { case_type: String, service: Service },
}

/// Errors produced while building the routing subsystem at startup.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("route `{rule}`: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: PatternError,
    },

    #[error("proxies.{case_type}.{service}: {source}")]
    InvalidUrl {
        case_type: String,
        service: Service,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build probe client: {0}")]
    ProbeClient(#[from] reqwest::Error),
}
