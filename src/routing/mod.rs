//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query, headers)
//!     → router.rs (first matching rule)
//!     → matcher.rs (evaluate glob patterns)
//!     → resolver (case type for the rule)
//!     → table.rs (case type + service → base URL)
//!     → Return: RouteDecision or RouteError
//!
//! Rule Compilation (at startup):
//!     RouteRuleConfig[] (or the built-in set)
//!     → Compile patterns
//!     → Freeze as immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same rule
//! - First match wins (registration order)

pub mod error;
pub mod matcher;
pub mod router;
pub mod rules;
pub mod service;
pub mod table;

pub use error::{BuildError, RouteError};
pub use matcher::{PathPattern, PatternError};
pub use router::{Dispatcher, RouteDecision};
pub use rules::RouteRule;
pub use service::Service;
pub use table::{RouteTable, DEFAULT_CASE_TYPE};
