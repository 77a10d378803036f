//! Ordered chain of mocks.
//!
//! # Responsibilities
//! - Hold several `MockResponses` in registration order
//! - Hand each request to the first mock whose route takes it
//!
//! # Design Decisions
//! - Behaves like the mocks stacked as separate middleware: a mock that
//!   does not take the path passes the request on to the next one
//! - Immutable after construction (thread-safe without locks)

use std::future::Future;

use crate::error::MockError;
use crate::http::MockContext;
use crate::mock::{MockResponses, Outcome};

/// Mocks tried in order; the first whose route takes the path answers.
#[derive(Debug, Clone, Default)]
pub struct MockRouter {
    mocks: Vec<MockResponses>,
}

impl MockRouter {
    pub fn new(mocks: Vec<MockResponses>) -> Self {
        Self { mocks }
    }

    /// Append a mock; it is tried after every mock already present.
    pub fn push(&mut self, mock: MockResponses) {
        self.mocks.push(mock);
    }

    pub fn mocks(&self) -> &[MockResponses] {
        &self.mocks
    }

    pub fn len(&self) -> usize {
        self.mocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mocks.is_empty()
    }

    /// The mock that takes `path`, with its position.
    pub fn find(&self, path: &str) -> Option<(usize, &MockResponses)> {
        self.mocks
            .iter()
            .enumerate()
            .find(|(_, mock)| mock.handles(path))
    }

    /// Process one request through the chain. `next` runs when no mock takes the path.
    pub async fn process<N, Fut>(
        &self,
        ctx: &mut MockContext,
        next: N,
    ) -> Result<Outcome<Fut::Output>, MockError>
    where
        N: FnOnce() -> Fut,
        Fut: Future,
    {
        match self.find(ctx.path()) {
            Some((_, mock)) => mock.respond(ctx).await,
            None => Ok(Outcome::Delegated(next().await)),
        }
    }
}

impl From<Vec<MockResponses>> for MockRouter {
    fn from(mocks: Vec<MockResponses>) -> Self {
        Self::new(mocks)
    }
}

impl FromIterator<MockResponses> for MockRouter {
    fn from_iter<I: IntoIterator<Item = MockResponses>>(iter: I) -> Self {
        let mut router = Self::default();
        for mock in iter {
            router.push(mock);
        }
        router
    }
}
