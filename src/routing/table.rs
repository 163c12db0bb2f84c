//! Case-type route table.
//!
//! # Responsibilities
//! - Map (case type, service) pairs to backend base URLs
//! - Normalize case types to lowercase
//! - Fall back to the `default` entry for unknown case types
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Entries keep their declaration order; fan-out probes follow it

use std::collections::HashMap;
use url::Url;

use crate::config::CaseTypeRoutes;
use crate::routing::error::{BuildError, RouteError};
use crate::routing::Service;

/// Case type used when none can be determined, and the fallback entry.
pub const DEFAULT_CASE_TYPE: &str = "default";

#[derive(Debug, Clone)]
struct Entry {
    case_type: String,
    urls: HashMap<Service, Url>,
}

/// Static mapping from case type to backend base URLs.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<Entry>,
}

impl RouteTable {
    /// Build the table from configuration, parsing every URL.
    ///
    /// Case types are lowercased; if two collide the first declaration wins.
    pub fn from_config(routes: &CaseTypeRoutes) -> Result<Self, BuildError> {
        let mut entries: Vec<Entry> = Vec::with_capacity(routes.len());

        for (case_type, urls) in routes.iter() {
            let normalized = case_type.to_lowercase();
            if entries.iter().any(|e| e.case_type == normalized) {
                tracing::warn!(case_type = %case_type, "Duplicate case type ignored");
                continue;
            }

            let mut parsed = HashMap::with_capacity(urls.len());
            for (service, raw) in urls {
                let url = Url::parse(raw).map_err(|source| BuildError::InvalidUrl {
                    case_type: case_type.to_string(),
                    service: *service,
                    source,
                })?;
                parsed.insert(*service, url);
            }

            entries.push(Entry {
                case_type: normalized,
                urls: parsed,
            });
        }

        Ok(Self { entries })
    }

    /// Resolve the base URL for a case type and service.
    ///
    /// Unknown case types use the `default` entry.
    pub fn lookup(&self, case_type: &str, service: Service) -> Result<&Url, RouteError> {
        let normalized = case_type.to_lowercase();
        let entry = self
            .entry(&normalized)
            .or_else(|| self.entry(DEFAULT_CASE_TYPE))
            .ok_or_else(|| RouteError::MissingRouteConfiguration {
                case_type: DEFAULT_CASE_TYPE.to_string(),
                service,
            })?;

        entry
            .urls
            .get(&service)
            .ok_or_else(|| RouteError::MissingRouteConfiguration {
                case_type: entry.case_type.clone(),
                service,
            })
    }

    /// Case types with a URL for `service`, in declaration order.
    pub fn targets(&self, service: Service) -> impl Iterator<Item = (&str, &Url)> {
        self.entries.iter().filter_map(move |entry| {
            entry
                .urls
                .get(&service)
                .map(|url| (entry.case_type.as_str(), url))
        })
    }

    /// All case types, in declaration order.
    pub fn case_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.case_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, case_type: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.case_type == case_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceUrls;

    fn urls(host: &str) -> ServiceUrls {
        Service::ALL
            .into_iter()
            .map(|s| (s, format!("http://{}-{}:8080", host, s)))
            .collect()
    }

    fn table() -> RouteTable {
        let mut routes = CaseTypeRoutes::new();
        routes.insert("default", urls("default"));
        routes.insert("Probate", urls("probate"));
        routes.insert("divorce", urls("divorce"));
        RouteTable::from_config(&routes).unwrap()
    }

    #[test]
    fn test_configured_lookup() {
        let table = table();
        for service in Service::ALL {
            let url = table.lookup("divorce", service).unwrap();
            assert_eq!(url.as_str(), format!("http://divorce-{}:8080/", service));
        }
    }

    #[test]
    fn test_unknown_case_type_uses_default() {
        let table = table();
        for service in Service::ALL {
            assert_eq!(
                table.lookup("unknown-case-type", service),
                table.lookup("default", service)
            );
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = table();
        assert_eq!(
            table.lookup("PROBATE", Service::Gateway),
            table.lookup("probate", Service::Gateway)
        );
        assert_eq!(
            table.lookup("Probate", Service::Gateway).unwrap().host_str(),
            Some("probate-gateway")
        );
    }

    #[test]
    fn test_missing_service_is_an_error() {
        let mut routes = CaseTypeRoutes::new();
        let mut partial = ServiceUrls::new();
        partial.insert(Service::Gateway, "http://gateway:3453".into());
        routes.insert("default", partial);
        let table = RouteTable::from_config(&routes).unwrap();

        assert_eq!(
            table.lookup("probate", Service::DataStore),
            Err(RouteError::MissingRouteConfiguration {
                case_type: "default".into(),
                service: Service::DataStore,
            })
        );
    }

    #[test]
    fn test_empty_table_reports_default() {
        let table = RouteTable::default();
        assert!(matches!(
            table.lookup("probate", Service::Gateway),
            Err(RouteError::MissingRouteConfiguration { case_type, .. }) if case_type == "default"
        ));
    }

    #[test]
    fn test_targets_follow_declaration_order() {
        let table = table();
        let order: Vec<&str> = table.targets(Service::DataStore).map(|(ct, _)| ct).collect();
        assert_eq!(order, vec!["default", "probate", "divorce"]);
    }

    #[test]
    fn test_invalid_url_fails_build() {
        let mut routes = CaseTypeRoutes::new();
        let mut bad = ServiceUrls::new();
        bad.insert(Service::Gateway, "not a url".into());
        routes.insert("default", bad);

        assert!(matches!(
            RouteTable::from_config(&routes),
            Err(BuildError::InvalidUrl { service: Service::Gateway, .. })
        ));
    }
}
