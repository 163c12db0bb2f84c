//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse glob-style source patterns (`/data/cases/**`)
//! - Match request paths segment by segment
//!
//! # Design Decisions
//! - Literal segments compare ASCII case-insensitively
//! - Empty segments (`//`, trailing `/`) are ignored, here and wherever a
//!   segment is read by index
//! - A pattern without a trailing wildcard matches its whole subtree,
//!   on a segment boundary (`/cases` matches `/cases/1` but not `/casesx`)
//! - `*` matches exactly one segment, `**` zero or more trailing segments
//! - No regex to guarantee O(n) matching

use std::fmt;
use thiserror::Error;

/// Error raised for a malformed pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern `{0}` must start with '/'")]
    NotAbsolute(String),

    #[error("pattern `{0}`: `**` is only allowed as the last segment")]
    InnerRest(String),

    #[error("pattern `{0}`: wildcards must span a whole segment")]
    PartialWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Rest,
}

/// A compiled source pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| PatternError::NotAbsolute(raw.to_string()))?;

        let parts: Vec<&str> = split_segments(rest).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let segment = match *part {
                "**" if i + 1 == parts.len() => Segment::Rest,
                "**" => return Err(PatternError::InnerRest(raw.to_string())),
                "*" => Segment::Any,
                p if p.contains('*') => return Err(PatternError::PartialWildcard(raw.to_string())),
                p => Segment::Literal(p.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Returns true if the path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = split_segments(path);

        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Any => {
                    if parts.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(expected) => match parts.next() {
                    Some(part) if part.eq_ignore_ascii_case(expected) => {}
                    _ => return false,
                },
            }
        }

        true
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split on '/', ignoring empty segments.
pub fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> PathPattern {
        PathPattern::parse(raw).unwrap()
    }

    #[test]
    fn test_literal_matches_subtree() {
        let p = pattern("/cases");
        assert!(p.matches("/cases"));
        assert!(p.matches("/cases/"));
        assert!(p.matches("/cases/1234/events"));
        assert!(!p.matches("/casesx"));
        assert!(!p.matches("/case"));
        assert!(!p.matches("/data/cases"));
    }

    #[test]
    fn test_rest_wildcard() {
        let p = pattern("/data/cases/**");
        assert!(p.matches("/data/cases/1234"));
        assert!(p.matches("/data/cases/1234/events"));
        assert!(p.matches("/data/cases"));
        assert!(!p.matches("/data/internal/cases/1234"));
    }

    #[test]
    fn test_single_segment_wildcard() {
        let p = pattern("/data/*/events");
        assert!(p.matches("/data/1234/events"));
        assert!(!p.matches("/data/events"));
        assert!(!p.matches("/data//events"));
    }

    #[test]
    fn test_matching_ignores_case() {
        let p = pattern("/data/internal/searchCases");
        assert!(p.matches("/data/internal/searchCases"));
        assert!(p.matches("/data/internal/searchcases"));
        assert!(p.matches("/DATA/Internal/SEARCHCASES"));
        assert!(!p.matches("/data/internal/searchCasesX"));

        assert!(pattern("/cases").matches("/Cases/1234"));
        assert!(pattern("/data/cases/**").matches("/data/Cases/1234"));
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let p = pattern("/data/cases/**");
        assert!(p.matches("/data//cases/1234"));
        assert_eq!(
            split_segments("/data//cases/1234/").collect::<Vec<_>>(),
            vec!["data", "cases", "1234"]
        );
    }

    #[test]
    fn test_root_pattern_matches_everything() {
        let p = pattern("/");
        assert!(p.matches("/"));
        assert!(p.matches("/anything/at/all"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            PathPattern::parse("cases"),
            Err(PatternError::NotAbsolute("cases".into()))
        );
        assert_eq!(
            PathPattern::parse("/a/**/b"),
            Err(PatternError::InnerRest("/a/**/b".into()))
        );
        assert_eq!(
            PathPattern::parse("/a/b*"),
            Err(PatternError::PartialWildcard("/a/b*".into()))
        );
    }
}
