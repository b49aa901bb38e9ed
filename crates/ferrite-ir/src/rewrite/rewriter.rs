//! The handle a [`RewritePattern`](super::RewritePattern) records its rewrite through.
//!
//! Nothing is spliced while the pattern runs; the applicator commits the
//! recorded rewrite once the pattern returns.

use crate::context::IrContext;
use crate::refs::{OpRef, ValueRef};

/// What a matched pattern asked for.
pub(crate) struct Mutations {
    /// Detached ops placed, in order, ahead of the matched op.
    pub(crate) prefix_ops: Vec<OpRef>,
    /// Detached op whose results take over from the matched op.
    pub(crate) replacement: Option<OpRef>,
}

#[derive(Default)]
pub struct PatternRewriter {
    prefix_ops: Vec<OpRef>,
    replacement: Option<OpRef>,
}

impl PatternRewriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Swaps the matched op for `new_op`, result by result.
    pub fn replace_op(&mut self, new_op: OpRef) {
        debug_assert!(self.replacement.is_none(), "matched op already replaced");
        self.replacement = Some(new_op);
    }

    /// Like [`PatternRewriter::replace_op`], also placing `prefix` ahead of it.
    pub fn replace_with_prefix(&mut self, prefix: Vec<OpRef>, new_op: OpRef) {
        self.prefix_ops.extend(prefix);
        self.replace_op(new_op);
    }

    pub(crate) fn has_mutations(&self) -> bool {
        self.replacement.is_some() || !self.prefix_ops.is_empty()
    }

    pub(crate) fn take_mutations(self) -> Mutations {
        Mutations {
            prefix_ops: self.prefix_ops,
            replacement: self.replacement,
        }
    }
}

pub(crate) fn apply_mutations(ctx: &mut IrContext, matched: OpRef, mutations: Mutations) {
    let block = ctx.op(matched).parent_block;
    let placed = mutations.prefix_ops.iter().chain(&mutations.replacement);
    if let Some(block) = block {
        for &op in placed {
            ctx.insert_op_before(block, matched, op);
        }
    }

    let Some(new_op) = mutations.replacement else {
        return;
    };
    let old: Vec<ValueRef> = ctx.op_results(matched).to_vec();
    let new: Vec<ValueRef> = ctx.op_results(new_op).to_vec();
    debug_assert_eq!(old.len(), new.len(), "replacement changes the result count");
    for (old, new) in old.into_iter().zip(new) {
        ctx.replace_all_uses(old, new);
    }
    ctx.erase_op(matched);
}
