//! Route rules.
//!
//! A rule pairs source path patterns with a target service and, optionally,
//! a way to work out the case type of a request. Rules are compiled once at
//! startup and evaluated in registration order.

use crate::config::RouteRuleConfig;
use crate::resolver::CaseTypeSource;
use crate::routing::error::BuildError;
use crate::routing::matcher::PathPattern;
use crate::routing::Service;

/// A compiled route rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub name: String,
    pub patterns: Vec<PathPattern>,
    pub target: Service,
    pub case_type: Option<CaseTypeSource>,
}

impl RouteRule {
    pub fn from_config(config: &RouteRuleConfig) -> Result<Self, BuildError> {
        let patterns = config
            .sources
            .iter()
            .map(|source| PathPattern::parse(source))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| BuildError::Pattern {
                rule: config.name.clone(),
                source,
            })?;

        Ok(Self {
            name: config.name.clone(),
            patterns,
            target: config.target,
            case_type: config.case_type.clone(),
        })
    }

    /// Returns true if any of the rule's patterns matches the path.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Compile a list of rule configurations, keeping their order.
pub fn compile_rules(configs: &[RouteRuleConfig]) -> Result<Vec<RouteRule>, BuildError> {
    configs.iter().map(RouteRule::from_config).collect()
}

fn rule(name: &str, sources: &[&str], target: Service, case_type: Option<CaseTypeSource>) -> RouteRuleConfig {
    RouteRuleConfig {
        name: name.to_string(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
        target,
        case_type,
    }
}

/// The rule set used when the configuration does not declare one.
///
/// Order matters: `/case-users` is claimed by the data store before the
/// case-access rule, and `/cases/documents` is shadowed by `/cases`.
pub fn builtin_rules() -> Vec<RouteRuleConfig> {
    vec![
        rule(
            "search-cases",
            &["/data/internal/searchCases"],
            Service::Gateway,
            Some(CaseTypeSource::Query { param: "ctid".to_string() }),
        ),
        rule(
            "internal-case-types",
            &["/data/internal/case-types/**"],
            Service::Gateway,
            Some(CaseTypeSource::PathSegment { index: 4 }),
        ),
        rule(
            "case-types",
            &["/data/case-types/**"],
            Service::Gateway,
            Some(CaseTypeSource::PathSegment { index: 3 }),
        ),
        rule(
            "cases",
            &["/data/cases/**"],
            Service::Gateway,
            Some(CaseTypeSource::CaseId { index: 3 }),
        ),
        rule(
            "internal-cases",
            &["/data/internal/cases/**"],
            Service::Gateway,
            Some(CaseTypeSource::CaseIdLastSegment),
        ),
        rule(
            "data-store",
            &["/case-types", "/searchCases", "/cases", "/case-users", "/caseworkers", "/citizens"],
            Service::DataStore,
            None,
        ),
        rule(
            "gateway",
            &[
                "/aggregated",
                "/data",
                "/definition_import",
                "/addresses",
                "/em-anno",
                "/print",
                "/activity",
                "/payments",
            ],
            Service::Gateway,
            None,
        ),
        rule(
            "definition-store",
            &["/import", "/api/import-audits", "/api/user-role"],
            Service::DefinitionStore,
            None,
        ),
        rule("user-profile", &["/users", "/user-profile"], Service::UserProfile, None),
        rule("case-documents", &["/cases/documents"], Service::CaseDocumentAccess, None),
        rule(
            "case-access",
            &["/case-users", "/case-assignments", "/noc"],
            Service::CaseAccess,
            None,
        ),
        rule("role-assignment", &["/am"], Service::RoleAssignment, None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match<'a>(rules: &'a [RouteRule], path: &str) -> Option<&'a RouteRule> {
        rules.iter().find(|r| r.matches(path))
    }

    #[test]
    fn test_builtin_rules_compile() {
        let rules = compile_rules(&builtin_rules()).unwrap();
        assert_eq!(rules.len(), 12);
        assert_eq!(rules[0].name, "search-cases");
    }

    #[test]
    fn test_builtin_precedence() {
        let rules = compile_rules(&builtin_rules()).unwrap();

        let cases = [
            ("/data/internal/searchCases", "search-cases"),
            ("/data/internal/case-types/Probate/triggers", "internal-case-types"),
            ("/data/case-types/TestType", "case-types"),
            ("/data/cases/1234", "cases"),
            ("/data/internal/cases/1234", "internal-cases"),
            ("/data/internal/profile", "gateway"),
            ("/case-users", "data-store"),
            ("/cases/documents", "data-store"),
            ("/noc/check", "case-access"),
            ("/am/role-assignments", "role-assignment"),
            ("/api/user-role", "definition-store"),
            ("/Cases/1234", "data-store"),
            ("/DATA/internal/searchCases", "search-cases"),
            ("/Users/me", "user-profile"),
            ("/data/Cases/1234", "cases"),
            ("/data//cases/1234", "cases"),
        ];
        for (path, expected) in cases {
            assert_eq!(first_match(&rules, path).map(|r| r.name.as_str()), Some(expected), "{}", path);
        }

        assert!(first_match(&rules, "/not-a-real-path").is_none());
        assert!(first_match(&rules, "/health").is_none());
    }

    #[test]
    fn test_first_registered_rule_wins() {
        let configs = vec![
            rule("first", &["/data/**"], Service::Gateway, None),
            rule("second", &["/data/cases/**"], Service::DataStore, None),
        ];
        let rules = compile_rules(&configs).unwrap();
        assert_eq!(first_match(&rules, "/data/cases/1").unwrap().name, "first");
    }

    #[test]
    fn test_bad_pattern_names_rule() {
        let configs = vec![rule("broken", &["no-slash"], Service::Gateway, None)];
        let err = compile_rules(&configs).unwrap_err();
        assert!(err.to_string().starts_with("route `broken`"));
    }
}
