//! Observability subsystem.
//!
//! # What gets recorded
//! ```text
//! proxy handler   → "<url> -> <target>" per routed request, request metrics
//! fan-out engine  → cache hit/miss, one debug line per failed probe,
//!                   lookup summary, fan-out latency
//! config / table  → errors at startup, incomplete tables at request time
//! ```
//!
//! Logs go to stdout through `tracing`. Metrics are exported for Prometheus
//! only when `observability.metrics_enabled` is set; until then every
//! `record_*` call is a no-op.

pub mod logging;
pub mod metrics;
