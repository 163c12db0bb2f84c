//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled rules in registration order
//! - Pick the first rule whose pattern matches the request path
//! - Resolve the case type and look up the backend base URL
//! - Return a decision for the forwarder, or an explicit error
//!
//! # Design Decisions
//! - Immutable after construction; shared via Arc
//! - First match wins (registration order)
//! - Explicit NotFound rather than silent default

use axum::http::{HeaderMap, Uri};
use std::sync::Arc;
use url::Url;

use crate::config::GatewayConfig;
use crate::resolver::fanout::ProbeTarget;
use crate::resolver::{CaseProbe, CaseTypeResolver, FanOutEngine};
use crate::routing::error::{BuildError, RouteError};
use crate::routing::rules::{compile_rules, RouteRule};
use crate::routing::table::RouteTable;
use crate::routing::Service;

/// Where a request should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// Name of the rule that matched.
    pub rule: String,
    pub service: Service,
    /// Case type used for the table lookup (lowercase, or `default`).
    pub case_type: String,
    /// Backend base URL.
    pub target: Url,
    /// Rewrite the outbound `Host` header to the target's origin.
    pub change_origin: bool,
}

/// Chooses a backend for every inbound request.
pub struct Dispatcher {
    rules: Vec<RouteRule>,
    table: Arc<RouteTable>,
    resolver: CaseTypeResolver,
}

impl Dispatcher {
    pub fn new(rules: Vec<RouteRule>, table: Arc<RouteTable>, resolver: CaseTypeResolver) -> Self {
        Self {
            rules,
            table,
            resolver,
        }
    }

    /// Build the dispatcher and its collaborators from configuration.
    pub fn from_config(config: &GatewayConfig, probe: Arc<dyn CaseProbe>) -> Result<Self, BuildError> {
        let rules = compile_rules(&config.effective_routes())?;
        let table = Arc::new(RouteTable::from_config(&config.proxies)?);

        let targets = table
            .targets(Service::DataStore)
            .map(|(case_type, url)| ProbeTarget {
                case_type: case_type.to_string(),
                data_store: url.clone(),
            })
            .collect();
        let engine = Arc::new(FanOutEngine::new(targets, probe, &config.lookup));

        tracing::info!(
            rules = rules.len(),
            case_types = table.len(),
            cache_capacity = config.lookup.cache_capacity,
            "Dispatcher ready"
        );

        Ok(Self::new(rules, table, CaseTypeResolver::new(engine)))
    }

    /// First rule whose patterns match the path.
    pub fn match_rule(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Decide where a request goes.
    ///
    /// Takes the request head rather than the request so the body can be
    /// streamed to the backend untouched.
    pub async fn dispatch(&self, uri: &Uri, headers: &HeaderMap) -> Result<RouteDecision, RouteError> {
        let path = uri.path();
        let rule = self.match_rule(path).ok_or_else(|| RouteError::NotFound {
            path: path.to_string(),
        })?;

        let case_type = self
            .resolver
            .resolve(rule.case_type.as_ref(), uri, headers)
            .await
            .to_lowercase();
        let target = self.table.lookup(&case_type, rule.target)?.clone();

        Ok(RouteDecision {
            rule: rule.name.clone(),
            service: rule.target,
            case_type,
            target,
            change_origin: true,
        })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn resolver(&self) -> &CaseTypeResolver {
        &self.resolver
    }
}
