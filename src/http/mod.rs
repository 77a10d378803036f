//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! axum Request
//!     → middleware/mock.rs (split parts, build context)
//!     → context.rs (method, path, headers, accepts())
//!     → [mock selects and renders a target]
//!     → response.rs (status/headers/body → axum Response)
//!     → Send to client
//! ```

pub mod accepts;
pub mod context;
pub mod middleware;
pub mod response;

pub use context::MockContext;
pub use middleware::{attach_all, mock_responses_middleware};
pub use response::{MockBody, ResponseState};
