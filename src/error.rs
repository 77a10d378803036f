//! Crate error types.

use thiserror::Error;

use crate::mock::target::{FragmentError, HandlerError};
use crate::routing::PatternError;

/// Errors raised while building or running a mock.
#[derive(Debug, Error)]
pub enum MockError {
    /// The selected target's response is neither a fragment nor a handler.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid route pattern '{route}': {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    /// Raised by a response handler; passed through as is.
    #[error(transparent)]
    Handler(HandlerError),
}
