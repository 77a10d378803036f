//! HTTP middleware.

pub mod mock;

pub use mock::{attach_all, mock_responses_middleware};
