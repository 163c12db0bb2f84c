//! Logical backend services.
//!
//! Every case type in the route table maps each of these services to a base
//! URL. The set is closed so the table can be checked for completeness when
//! the configuration is loaded.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A logical service a request can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    DataStore,
    Gateway,
    DefinitionStore,
    UserProfile,
    CaseDocumentAccess,
    CaseAccess,
    RoleAssignment,
}

impl Service {
    /// All services, in declaration order.
    pub const ALL: [Service; 7] = [
        Service::DataStore,
        Service::Gateway,
        Service::DefinitionStore,
        Service::UserProfile,
        Service::CaseDocumentAccess,
        Service::CaseAccess,
        Service::RoleAssignment,
    ];

    /// The configuration key for this service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::DataStore => "data-store",
            Service::Gateway => "gateway",
            Service::DefinitionStore => "definition-store",
            Service::UserProfile => "user-profile",
            Service::CaseDocumentAccess => "case-document-access",
            Service::CaseAccess => "case-access",
            Service::RoleAssignment => "role-assignment",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown service name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service: {0}")]
pub struct UnknownService(pub String);

impl FromStr for Service {
    type Err = UnknownService;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .into_iter()
            .find(|service| service.as_str() == s)
            .ok_or_else(|| UnknownService(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for service in Service::ALL {
            assert_eq!(service.as_str().parse::<Service>().unwrap(), service);
        }
        assert!("billing".parse::<Service>().is_err());
    }

    #[test]
    fn test_serde_names_match_config_keys() {
        let json = serde_json::to_string(&Service::CaseDocumentAccess).unwrap();
        assert_eq!(json, "\"case-document-access\"");
    }
}
