//! Request predicate matching.
//!
//! # Responsibilities
//! - Match the request method against a set of methods
//! - Match the request's `Accept` header against a content type
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Method comparison is exact (`GET` and `get` differ, as on the wire)
//! - An absent condition is never built: no matcher = wildcard
//! - Matchers are compiled once per rule and only read afterwards

use axum::http::Method;

use crate::http::MockContext;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, ctx: &MockContext) -> bool;
}

/// Matches when the request method is one of a set.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: impl IntoIterator<Item = Method>) -> Self {
        Self {
            methods: methods.into_iter().collect(),
        }
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, ctx: &MockContext) -> bool {
        self.methods.contains(ctx.method())
    }
}

/// Matches when the request accepts a content type.
#[derive(Debug, Clone)]
pub struct AcceptsMatcher {
    content_type: String,
}

impl AcceptsMatcher {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
        }
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl Matcher for AcceptsMatcher {
    fn matches(&self, ctx: &MockContext) -> bool {
        ctx.accepts(&self.content_type).is_some()
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, ctx: &MockContext) -> bool {
        // An empty AND is vacuously true.
        self.matchers.iter().all(|m| m.matches(ctx))
    }
}
