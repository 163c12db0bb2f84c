//! Case-type resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Matched rule + request
//!     → strategy.rs (query param / path segment / case id)
//!     → case id? fanout.rs
//!         → cache.rs (hit: done)
//!         → probe.rs (GET every data store concurrently, wait for all)
//!         → first success in table order, cached
//!     → Return: case type, or "default"
//! ```
//!
//! # Design Decisions
//! - Resolution never fails; every failure degrades to the default case type
//! - One fan-out in flight per case id; concurrent callers share it
//! - Negative results are cached with a TTL so a transient outage does not
//!   pin a case id to the default route forever

pub mod cache;
pub mod fanout;
pub mod probe;
pub mod strategy;

pub use cache::LookupCache;
pub use fanout::FanOutEngine;
pub use probe::{CaseProbe, HttpProbe, ProbeError, ProbeRequest};
pub use strategy::{CaseTypeResolver, CaseTypeSource};

/// Outcome of looking up a case id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A data store recognised the case id.
    Resolved(String),
    /// No data store recognised the case id.
    Unresolved,
}

impl Resolution {
    pub fn case_type(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(case_type) => Some(case_type),
            Resolution::Unresolved => None,
        }
    }
}
