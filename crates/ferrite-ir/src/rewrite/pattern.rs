//! Rewrite pattern trait.

use super::rewriter::PatternRewriter;
use crate::context::IrContext;
use crate::refs::OpRef;

/// A local rewrite tried on every op during canonicalization.
///
/// A pattern that applies records its result on `rewriter` and returns
/// `true`. One that does not apply returns `false` and leaves `ctx` as it
/// found it.
pub trait RewritePattern {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool;

    /// Reported in `trace!` output when the pattern fires.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
