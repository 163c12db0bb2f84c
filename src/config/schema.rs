//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::resolver::CaseTypeSource;
use crate::routing::rules::builtin_rules;
use crate::routing::Service;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Case-type lookup settings (cache, probes).
    pub lookup: LookupConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Backend base URLs per case type and service.
    pub proxies: CaseTypeRoutes,

    /// Route rules. When empty the built-in rule set is used.
    pub routes: Vec<RouteRuleConfig>,
}

impl GatewayConfig {
    /// The configured rules, or the built-in set when none are configured.
    pub fn effective_routes(&self) -> Cow<'_, [RouteRuleConfig]> {
        if self.routes.is_empty() {
            Cow::Owned(builtin_rules())
        } else {
            Cow::Borrowed(&self.routes)
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Settings for resolving a case id to its case type.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Maximum number of case ids remembered.
    pub cache_capacity: usize,

    /// How long an unresolved case id is remembered, in seconds.
    /// `0` keeps negative entries until they are evicted.
    pub negative_ttl_secs: u64,

    /// Timeout for a single data-store probe in seconds.
    pub probe_timeout_secs: u64,

    /// Prefixes stripped from the request path before probing a data store.
    /// The first matching prefix wins.
    pub strip_prefixes: Vec<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            negative_ttl_secs: 30,
            probe_timeout_secs: 10,
            strip_prefixes: vec!["/data/internal".to_string(), "/data".to_string()],
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A route rule as written in the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteRuleConfig {
    /// Rule identifier for logging/metrics.
    pub name: String,

    /// Path patterns, checked in order.
    pub sources: Vec<String>,

    /// Service the request is forwarded to.
    pub target: Service,

    /// How the case type is determined. Absent means `default`.
    #[serde(default)]
    pub case_type: Option<CaseTypeSource>,
}

/// Service URLs for a single case type.
pub type ServiceUrls = BTreeMap<Service, String>;

/// Case type → service URLs, in the order the case types were declared.
///
/// Declaration order matters: it is the order in which data stores are
/// probed and therefore decides which case type wins when several claim the
/// same case id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseTypeRoutes(Vec<(String, ServiceUrls)>);

impl CaseTypeRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the URLs for a case type.
    pub fn insert(&mut self, case_type: impl Into<String>, urls: ServiceUrls) {
        let case_type = case_type.into();
        match self.0.iter_mut().find(|(name, _)| *name == case_type) {
            Some(entry) => entry.1 = urls,
            None => self.0.push((case_type, urls)),
        }
    }

    pub fn get(&self, case_type: &str) -> Option<&ServiceUrls> {
        self.0
            .iter()
            .find(|(name, _)| name == case_type)
            .map(|(_, urls)| urls)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceUrls)> {
        self.0.iter().map(|(name, urls)| (name.as_str(), urls))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for CaseTypeRoutes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RoutesVisitor;

        impl<'de> Visitor<'de> for RoutesVisitor {
            type Value = CaseTypeRoutes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of case types to service URLs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut routes = CaseTypeRoutes::new();
                while let Some((case_type, urls)) = map.next_entry::<String, ServiceUrls>()? {
                    routes.0.push((case_type, urls));
                }
                Ok(routes)
            }
        }

        deserializer.deserialize_map(RoutesVisitor)
    }
}

impl Serialize for CaseTypeRoutes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (case_type, urls) in &self.0 {
            map.serialize_entry(case_type, urls)?;
        }
        map.end()
    }
}
