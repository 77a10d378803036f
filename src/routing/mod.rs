//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, Accept)
//!     → router.rs (first mock whose route takes the path)
//!     → pattern.rs (test path, extract params)
//!     → matcher.rs (evaluate target predicates)
//!     → Return: selected target or NoMatch
//!
//! Route Compilation (at construction):
//!     route template
//!     → tokenize (literals, :params, groups, *)
//!     → compile to one anchored regex
//!     → freeze inside an immutable MockResponses
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, immutable at runtime
//! - Deterministic: same input always selects the same target
//! - First match wins (registration order)

pub mod matcher;
pub mod pattern;
pub mod router;

pub use matcher::{AcceptsMatcher, AndMatcher, Matcher, MethodMatcher};
pub use pattern::{PathParam, PathParams, PathPattern, PatternError};
pub use router::MockRouter;
