//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the route table is complete for every service a rule targets
//! - Validate URLs, patterns and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;
use crate::routing::table::DEFAULT_CASE_TYPE;
use crate::routing::{PathPattern, Service};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("proxies: missing required `default` case type")]
    MissingDefaultCaseType,

    #[error("proxies.{case_type}: no URL for service `{service}`")]
    MissingServiceUrl { case_type: String, service: Service },

    #[error("proxies.{case_type}.{service}: invalid URL `{url}`: {reason}")]
    InvalidUrl {
        case_type: String,
        service: Service,
        url: String,
        reason: String,
    },

    #[error("proxies: case type `{0}` is declared more than once (case-insensitive)")]
    DuplicateCaseType(String),

    #[error("routes.{rule}: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("lookup.cache_capacity must be greater than zero")]
    ZeroCacheCapacity,

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("listener.bind_address: invalid address `{0}`")]
    InvalidBindAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.lookup.cache_capacity == 0 {
        errors.push(ValidationError::ZeroCacheCapacity);
    }

    let timeouts = [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("lookup.probe_timeout_secs", config.lookup.probe_timeout_secs),
    ];
    for (field, secs) in timeouts {
        if secs == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        }
    }

    let rules = config.effective_routes();
    let mut targets = BTreeSet::new();
    for rule in rules.iter() {
        targets.insert(rule.target);
        if rule.sources.is_empty() {
            errors.push(ValidationError::InvalidRule {
                rule: rule.name.clone(),
                reason: "no source patterns".to_string(),
            });
        }
        for source in &rule.sources {
            if let Err(e) = PathPattern::parse(source) {
                errors.push(ValidationError::InvalidRule {
                    rule: rule.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    // Fan-out probes always go to the data store, whichever rule triggers them.
    if rules.iter().any(|rule| rule.case_type.as_ref().is_some_and(|s| s.needs_lookup())) {
        targets.insert(Service::DataStore);
    }

    let mut seen = HashSet::new();
    let mut has_default = false;
    for (case_type, urls) in config.proxies.iter() {
        let normalized = case_type.to_lowercase();
        if normalized == DEFAULT_CASE_TYPE {
            has_default = true;
        }
        if !seen.insert(normalized) {
            errors.push(ValidationError::DuplicateCaseType(case_type.to_string()));
        }

        for service in &targets {
            if !urls.contains_key(service) {
                errors.push(ValidationError::MissingServiceUrl {
                    case_type: case_type.to_string(),
                    service: *service,
                });
            }
        }

        for (service, raw) in urls {
            if let Err(reason) = check_base_url(raw) {
                errors.push(ValidationError::InvalidUrl {
                    case_type: case_type.to_string(),
                    service: *service,
                    url: raw.clone(),
                    reason,
                });
            }
        }
    }

    if !has_default {
        errors.push(ValidationError::MissingDefaultCaseType);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    // The forwarder's connector has no TLS, so https backends are refused here
    // rather than failing on every request.
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{RouteRuleConfig, ServiceUrls};

    fn urls(base: &str) -> ServiceUrls {
        Service::ALL
            .into_iter()
            .map(|s| (s, format!("{}/{}", base, s)))
            .collect()
    }

    fn valid_config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.proxies.insert("default", urls("http://default"));
        config.proxies.insert("probate", urls("http://probate"));
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_missing_default_is_reported() {
        let mut config = GatewayConfig::default();
        config.proxies.insert("probate", urls("http://probate"));

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingDefaultCaseType));
    }

    #[test]
    fn test_incomplete_entry_is_reported() {
        let mut config = valid_config();
        let mut partial = urls("http://divorce");
        partial.remove(&Service::RoleAssignment);
        config.proxies.insert("divorce", partial);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingServiceUrl {
                case_type: "divorce".into(),
                service: Service::RoleAssignment,
            }]
        );
    }

    #[test]
    fn test_only_targeted_services_are_required() {
        let mut config = GatewayConfig::default();
        config.routes.push(RouteRuleConfig {
            name: "users".into(),
            sources: vec!["/users".into()],
            target: Service::UserProfile,
            case_type: None,
        });
        let mut only_users = ServiceUrls::new();
        only_users.insert(Service::UserProfile, "http://users:4453".into());
        config.proxies.insert("default", only_users);

        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid_config();
        config.lookup.cache_capacity = 0;
        config.listener.bind_address = "not an address".into();
        let mut bad = urls("http://bad");
        bad.insert(Service::Gateway, "ftp://bad/gateway".into());
        config.proxies.insert("PROBATE", bad);

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroCacheCapacity));
        assert!(errors.contains(&ValidationError::InvalidBindAddress("not an address".into())));
        assert!(errors.contains(&ValidationError::DuplicateCaseType("PROBATE".into())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl { service: Service::Gateway, .. })));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let mut config = valid_config();
        config.timeouts.request_secs = 0;
        config.lookup.probe_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::ZeroTimeout("timeouts.request_secs"),
                ValidationError::ZeroTimeout("lookup.probe_timeout_secs"),
            ]
        );
        assert_eq!(
            errors[0].to_string(),
            "timeouts.request_secs must be greater than zero"
        );
    }

    #[test]
    fn test_https_backend_is_rejected() {
        assert!(check_base_url("http://ccd-data-store:4452").is_ok());
        assert!(check_base_url("https://ccd-data-store:4452")
            .unwrap_err()
            .contains("https"));
        assert!(check_base_url("not a url").is_err());
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let mut config = valid_config();
        config.routes.push(RouteRuleConfig {
            name: "broken".into(),
            sources: vec!["cases".into()],
            target: Service::Gateway,
            case_type: None,
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(&errors[0], ValidationError::InvalidRule { rule, .. } if rule == "broken"));
    }
}
