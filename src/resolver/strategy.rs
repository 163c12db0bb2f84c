//! Case-type resolution strategies.
//!
//! Direct strategies read the case type from the request itself. Case-id
//! strategies read a case id from the path and hand it to the fan-out
//! engine. Whatever happens, resolution ends in a case type: empty values and
//! failed lookups become `default`.

use axum::http::{HeaderMap, Uri};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::resolver::fanout::FanOutEngine;
use crate::routing::matcher::split_segments;
use crate::routing::table::DEFAULT_CASE_TYPE;

/// Where a rule finds the case type of a request.
///
/// Segment indices count from the empty segment before the leading slash,
/// so in `/data/cases/1234` index 3 is `1234`. Other empty segments are
/// skipped, the same way the path matcher skips them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "from", rename_all = "kebab-case")]
pub enum CaseTypeSource {
    /// Query parameter holding the case type.
    Query { param: String },
    /// Path segment holding the case type.
    PathSegment { index: usize },
    /// Path segment holding a case id to look up.
    CaseId { index: usize },
    /// Last path segment holds a case id to look up.
    CaseIdLastSegment,
}

impl CaseTypeSource {
    /// Returns true if this strategy queries the data stores.
    pub fn needs_lookup(&self) -> bool {
        matches!(self, CaseTypeSource::CaseId { .. } | CaseTypeSource::CaseIdLastSegment)
    }

    /// Read a case type straight from the request, for direct strategies.
    pub fn direct(&self, uri: &Uri) -> Option<String> {
        match self {
            CaseTypeSource::Query { param } => query_param(uri, param),
            CaseTypeSource::PathSegment { index } => segment(uri.path(), *index).map(str::to_string),
            _ => None,
        }
    }

    /// Read the case id from the path, for lookup strategies.
    pub fn case_id<'a>(&self, path: &'a str) -> Option<&'a str> {
        match self {
            CaseTypeSource::CaseId { index } => segment(path, *index),
            // A trailing slash means there is no id, not that the id is one segment up.
            CaseTypeSource::CaseIdLastSegment => path.rsplit('/').next().filter(|s| !s.is_empty()),
            _ => None,
        }
    }
}

fn segment(path: &str, index: usize) -> Option<&str> {
    split_segments(path).nth(index.checked_sub(1)?)
}

fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Applies a rule's strategy to a request.
#[derive(Clone)]
pub struct CaseTypeResolver {
    engine: Arc<FanOutEngine>,
}

impl CaseTypeResolver {
    pub fn new(engine: Arc<FanOutEngine>) -> Self {
        Self { engine }
    }

    /// Determine the case type for a request. Never fails.
    pub async fn resolve(&self, source: Option<&CaseTypeSource>, uri: &Uri, headers: &HeaderMap) -> String {
        let Some(source) = source else {
            return DEFAULT_CASE_TYPE.to_string();
        };

        let resolved = if source.needs_lookup() {
            match source.case_id(uri.path()) {
                Some(case_id) => self
                    .engine
                    .resolve(case_id, uri.path(), headers)
                    .await
                    .case_type()
                    .map(str::to_string),
                None => None,
            }
        } else {
            source.direct(uri)
        };

        resolved.unwrap_or_else(|| {
            tracing::debug!(path = %uri.path(), ?source, "Case type not resolved, using default");
            DEFAULT_CASE_TYPE.to_string()
        })
    }

    pub fn engine(&self) -> &Arc<FanOutEngine> {
        &self.engine
    }
}
