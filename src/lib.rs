//! Mock Responses Library
//!
//! Answers HTTP requests from canned or computed mocks, keyed by a route
//! pattern and an ordered list of target rules.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ http::middleware ──▶ routing::MockRouter
//!                                               │  first mock whose route
//!                                               │  pattern takes the path
//!                                               ▼
//!                                         mock::MockResponses
//!                                               │  selector: predicate rules,
//!                                               │  then catch-all
//!                                               ▼
//!     Client Response  ◀── http::response ◀── fragment merge / handler call
//!
//!     No route takes the path ──▶ next handler in the axum stack
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod observability;
pub mod routing;

pub use error::MockError;
pub use http::{attach_all, MockContext};
pub use mock::{MockResponse, MockResponses, Outcome, ResponseFragment, TargetRule};
pub use routing::{MockRouter, PathParams};
