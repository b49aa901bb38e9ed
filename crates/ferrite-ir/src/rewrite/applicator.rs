//! PatternApplicator: fold + pattern fixpoint driver.
//!
//! Visitor-based fixpoint iteration over a region. Uses snapshots of block
//! operations and checks `parent_block` validity to skip erased ops.

use tracing::{debug, trace};

use super::fold::fold_op;
use super::pattern::RewritePattern;
use super::rewriter::{self, PatternRewriter};
use crate::context::IrContext;
use crate::refs::{BlockRef, OpRef, RegionRef};

/// Result of applying rewrite patterns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyResult {
    /// Number of fixpoint iterations performed.
    pub iterations: usize,
    /// Total number of folds, pattern matches and dead-op erasures.
    pub total_changes: usize,
    /// Whether the fixpoint was reached (no changes in last iteration).
    pub reached_fixpoint: bool,
}

/// Applies folds and rewrite patterns until nothing changes.
///
/// Each sweep visits every operation (nested regions first), tries the fold
/// and then the patterns in registration order, applying at most one rewrite
/// per operation. Pure operations left without uses are erased at the end of
/// the sweep.
pub struct PatternApplicator {
    patterns: Vec<Box<dyn RewritePattern>>,
    max_iterations: usize,
    fold: bool,
}

impl PatternApplicator {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            max_iterations: 10,
            fold: true,
        }
    }

    /// Add a rewrite pattern.
    pub fn add_pattern(mut self, pattern: impl RewritePattern + 'static) -> Self {
        self.patterns.push(Box::new(pattern));
        self
    }

    /// Add a batch of already boxed patterns, keeping their order.
    pub fn with_patterns(
        mut self,
        patterns: impl IntoIterator<Item = Box<dyn RewritePattern>>,
    ) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Set maximum fixpoint iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Disable the fold step; only patterns and dead-op erasure run.
    pub fn without_folding(mut self) -> Self {
        self.fold = false;
        self
    }

    /// Apply folds and patterns to every operation of `region`.
    pub fn apply_region(&self, ctx: &mut IrContext, region: RegionRef) -> ApplyResult {
        let mut total_changes = 0;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let changes = self.visit_region(ctx, region) + erase_dead_ops(ctx, region);
            total_changes += changes;
            trace!(iteration = iterations, changes, "rewrite sweep");
            if changes == 0 {
                debug!(iterations, total_changes, "rewrite fixpoint reached");
                return ApplyResult {
                    iterations,
                    total_changes,
                    reached_fixpoint: true,
                };
            }
        }

        debug!(iterations, total_changes, "rewrite iteration bound reached");
        ApplyResult {
            iterations,
            total_changes,
            reached_fixpoint: false,
        }
    }

    fn visit_region(&self, ctx: &mut IrContext, region: RegionRef) -> usize {
        let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
        blocks
            .into_iter()
            .map(|block| self.visit_block(ctx, block))
            .sum()
    }

    fn visit_block(&self, ctx: &mut IrContext, block: BlockRef) -> usize {
        let mut changes = 0;

        // Snapshot the ops in this block
        let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();

        for op in ops {
            if ctx.op(op).parent_block != Some(block) {
                continue;
            }

            let regions: Vec<RegionRef> = ctx.op(op).regions.to_vec();
            for region in regions {
                changes += self.visit_region(ctx, region);
            }

            if ctx.op(op).parent_block != Some(block) {
                continue;
            }

            if self.fold && self.try_fold(ctx, op) {
                changes += 1;
                continue;
            }

            for pattern in &self.patterns {
                let mut rw = PatternRewriter::new();
                let matched = pattern.match_and_rewrite(ctx, op, &mut rw);
                if matched && rw.has_mutations() {
                    trace!(pattern = pattern.name(), %op, "pattern applied");
                    rewriter::apply_mutations(ctx, op, rw.take_mutations());
                    changes += 1;
                    break;
                }
            }
        }

        changes
    }

    fn try_fold(&self, ctx: &mut IrContext, op: OpRef) -> bool {
        let Some(value) = fold_op(ctx, op) else {
            return false;
        };
        let [result] = ctx.op_results(op) else {
            return false;
        };
        let result = *result;
        if result == value {
            return false;
        }
        trace!(%op, kind = %ctx.op_kind(op), "folded");
        ctx.replace_all_uses(result, value);
        if ctx.op_kind(op).is_pure() {
            ctx.erase_op(op);
        }
        true
    }
}

impl Default for PatternApplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Erase pure operations whose results have no uses. Returns the number erased.
///
/// Blocks are scanned back to front so a chain of dead operations goes away
/// in a single call.
pub fn erase_dead_ops(ctx: &mut IrContext, region: RegionRef) -> usize {
    let mut erased = 0;
    let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
    for block in blocks {
        let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
        for &op in ops.iter().rev() {
            let regions: Vec<RegionRef> = ctx.op(op).regions.to_vec();
            for region in regions {
                erased += erase_dead_ops(ctx, region);
            }
            let data = ctx.op(op);
            if data.kind.is_pure() && data.regions.is_empty() && ctx.results_unused(op) {
                ctx.erase_op(op);
                erased += 1;
            }
        }
    }
    erased
}
