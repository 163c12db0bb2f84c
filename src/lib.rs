//! Case-type aware request router.
//!
//! Sits in front of the case-management backends and forwards every request
//! to the backend that serves its case type.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server ──▶ routing::Dispatcher ──▶ first matching rule
//!                                        │
//!                                        ▼
//!                              resolver::CaseTypeResolver
//!                           query / path segment / case id
//!                                        │ case id
//!                                        ▼
//!                              resolver::FanOutEngine ──▶ every data store
//!                                  (LookupCache)
//!                                        │
//!                                        ▼
//!                     routing::RouteTable (case type, service) → URL
//!                                        │
//!     Client ◀── http::forward ◀─────────┘  (Host rewritten to target)
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
