//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! mock compilation, target selection, middleware outcome
//!     → tracing events (route, method, path, target)
//!     → logging.rs (subscriber: pretty or JSON, env filter)
//! ```

pub mod logging;

pub use logging::init_logging;
