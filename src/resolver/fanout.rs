//! Fan-out lookup of a case id across every case type's data store.
//!
//! # Algorithm
//! 1. Cache hit (positive or negative): return it, no probes.
//! 2. Otherwise probe every data store concurrently and wait for all of
//!    them to settle. A probe that merely completes is not a match; only a
//!    successful one is.
//! 3. The first successful probe in route-table order wins.
//! 4. Cache the outcome, then return it.
//!
//! # Concurrency
//! - At most one fan-out per case id is in flight. Concurrent callers for
//!   the same id await a shared future.
//! - The fan-out runs on its own task, so a caller that goes away does not
//!   cancel it and the cache is still populated.

use axum::http::HeaderMap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{join_all, BoxFuture, Shared};
use futures_util::FutureExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::LookupConfig;
use crate::observability::metrics;
use crate::resolver::cache::LookupCache;
use crate::resolver::probe::{CaseProbe, ProbeRequest};
use crate::resolver::Resolution;
use crate::routing::matcher::split_segments;

type PendingLookup = Shared<BoxFuture<'static, Resolution>>;

/// Removes a case id from the in-flight map when its lookup task ends.
struct InFlightGuard<'a> {
    in_flight: &'a DashMap<String, PendingLookup>,
    case_id: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(self.case_id);
    }
}

/// A case type and the data-store base URL that answers for it.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub case_type: String,
    pub data_store: Url,
}

/// Resolves case ids to case types by probing every data store.
pub struct FanOutEngine {
    targets: Vec<ProbeTarget>,
    probe: Arc<dyn CaseProbe>,
    cache: LookupCache,
    in_flight: DashMap<String, PendingLookup>,
    strip_prefixes: Vec<String>,
}

impl FanOutEngine {
    pub fn new(targets: Vec<ProbeTarget>, probe: Arc<dyn CaseProbe>, config: &LookupConfig) -> Self {
        let negative_ttl = match config.negative_ttl_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            targets,
            probe,
            cache: LookupCache::new(config.cache_capacity, negative_ttl),
            in_flight: DashMap::new(),
            strip_prefixes: config.strip_prefixes.clone(),
        }
    }

    /// Resolve a case id.
    ///
    /// `path` is the inbound request path; the probe path is derived from it.
    /// `headers` are the inbound headers, used for authorization pass-through.
    pub async fn resolve(self: &Arc<Self>, case_id: &str, path: &str, headers: &HeaderMap) -> Resolution {
        if let Some(hit) = self.cache.get(case_id) {
            metrics::record_cache_lookup(true);
            tracing::debug!(case_id = %case_id, resolution = ?hit, "Lookup cache hit");
            return hit;
        }
        metrics::record_cache_lookup(false);

        let pending = match self.in_flight.entry(case_id.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(case_id = %case_id, "Joining in-flight lookup");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                // A lookup may have finished between the cache check and here.
                if let Some(hit) = self.cache.get(case_id) {
                    return hit;
                }
                let pending = self.spawn_lookup(case_id.to_string(), self.probe_requests(path, headers));
                entry.insert(pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Number of case ids currently remembered.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn targets(&self) -> &[ProbeTarget] {
        &self.targets
    }

    /// Collapse empty segments, then strip the first matching internal prefix.
    pub fn probe_path(&self, path: &str) -> String {
        let normalized: String = split_segments(path).flat_map(|segment| ["/", segment]).collect();
        match self
            .strip_prefixes
            .iter()
            .find_map(|prefix| normalized.strip_prefix(prefix.as_str()))
        {
            Some(stripped) => stripped.to_string(),
            None => normalized,
        }
    }

    fn probe_requests(&self, path: &str, headers: &HeaderMap) -> Vec<ProbeRequest> {
        let probe_path = self.probe_path(path);
        let headers = ProbeRequest::headers_from(headers);

        self.targets
            .iter()
            .map(|target| ProbeRequest {
                case_type: target.case_type.clone(),
                url: format!("{}{}", target.data_store.as_str().trim_end_matches('/'), probe_path),
                headers: headers.clone(),
            })
            .collect()
    }

    fn spawn_lookup(self: &Arc<Self>, case_id: String, requests: Vec<ProbeRequest>) -> PendingLookup {
        let engine = Arc::clone(self);
        let task = tokio::spawn(async move {
            // Dropped on panic as well as on completion.
            let _in_flight = InFlightGuard {
                in_flight: &engine.in_flight,
                case_id: &case_id,
            };
            let resolution = engine.probe_all(&case_id, requests).await;
            engine.cache.put(case_id.clone(), resolution.clone());
            resolution
        });

        task.map(|joined| match joined {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!(error = %e, "Case lookup task failed");
                Resolution::Unresolved
            }
        })
        .boxed()
        .shared()
    }

    async fn probe_all(&self, case_id: &str, requests: Vec<ProbeRequest>) -> Resolution {
        let started = Instant::now();
        let probes = requests.into_iter().map(|request| {
            let case_type = request.case_type.clone();
            let outcome = self.probe.probe(request);
            async move { (case_type, outcome.await) }
        });
        let outcomes = join_all(probes).await;

        let mut resolution = Resolution::Unresolved;
        for (case_type, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    metrics::record_probe(true);
                    if resolution == Resolution::Unresolved {
                        resolution = Resolution::Resolved(case_type);
                    }
                }
                Err(e) => {
                    metrics::record_probe(false);
                    tracing::debug!(case_id = %case_id, case_type = %case_type, error = %e, "Probe failed");
                }
            }
        }

        metrics::record_fanout(started.elapsed());
        tracing::info!(
            case_id = %case_id,
            resolution = ?resolution,
            probes = self.targets.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Case lookup finished"
        );
        resolution
    }
}
