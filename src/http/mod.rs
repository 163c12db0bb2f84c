//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → /health? answered locally
//!     → routing layer decides backend
//!     → forward.rs (rewrite URI and Host, stream to backend)
//!     → response.rs (gateway-generated errors)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
