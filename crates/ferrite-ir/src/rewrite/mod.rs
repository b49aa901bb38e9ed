//! Rewrite infrastructure.
//!
//! In-place mutation + RAUW-based rewriting: folds, rewrite patterns and the
//! fixpoint driver that applies them.

pub mod applicator;
pub mod fold;
pub mod pattern;
pub mod rewriter;

pub use applicator::{ApplyResult, PatternApplicator, erase_dead_ops};
pub use fold::fold_op;
pub use pattern::RewritePattern;
pub use rewriter::PatternRewriter;
