//! Recursive operation traversal.

use std::ops::ControlFlow;

use crate::context::IrContext;
use crate::dialect::DialectOp;
use crate::refs::{BlockRef, OpRef, RegionRef};

/// Returned by a walk callback for each visited op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkAction {
    /// Visit the op's regions next.
    Advance,
    /// Move on to the next sibling, e.g. past a module body.
    Skip,
}

/// Visits every op under `region` in pre-order, stopping on `Break`.
pub fn walk_region<B>(
    ctx: &IrContext,
    region: RegionRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    for &block in &ctx.region(region).blocks {
        walk_block(ctx, block, f)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_block<B>(
    ctx: &IrContext,
    block: BlockRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    for &op in &ctx.block(block).ops {
        walk_op(ctx, op, f)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_op<B>(
    ctx: &IrContext,
    op: OpRef,
    f: &mut dyn FnMut(OpRef) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()> {
    match f(op) {
        ControlFlow::Break(b) => return ControlFlow::Break(b),
        ControlFlow::Continue(WalkAction::Skip) => return ControlFlow::Continue(()),
        ControlFlow::Continue(WalkAction::Advance) => {}
    }
    for &region in &ctx.op(op).regions {
        walk_region(ctx, region, f)?;
    }
    ControlFlow::Continue(())
}

/// Like [`walk_region`], but calls `f` only for ops that convert to `T`.
/// Other ops are always descended into.
pub fn walk_typed<T, B>(
    ctx: &IrContext,
    region: RegionRef,
    f: &mut dyn FnMut(T) -> ControlFlow<B, WalkAction>,
) -> ControlFlow<B, ()>
where
    T: DialectOp,
{
    walk_region(ctx, region, &mut |op| {
        if let Ok(typed) = T::from_op(ctx, op) {
            f(typed)
        } else {
            ControlFlow::Continue(WalkAction::Advance)
        }
    })
}
