//! Target selection.
//!
//! # Selection Order
//! ```text
//! 1. rules with a predicate, in list order: first satisfied wins
//! 2. otherwise rules without a predicate, in list order: first wins
//! 3. otherwise nothing
//! ```

use crate::http::MockContext;
use crate::mock::target::TargetRule;

/// Index of the target that answers `ctx`, if any.
pub fn select_target(targets: &[TargetRule], ctx: &MockContext) -> Option<usize> {
    targets
        .iter()
        .position(|target| target.predicate_matches(ctx))
        .or_else(|| targets.iter().position(TargetRule::is_catch_all))
}
