//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build dispatcher → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C / trigger → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - In-flight fan-out lookups are not cancelled on shutdown

pub mod shutdown;

pub use shutdown::Shutdown;
