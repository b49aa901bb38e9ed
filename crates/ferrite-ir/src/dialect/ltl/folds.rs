//! Identity folds for temporal operations.

use crate::context::IrContext;
use crate::dialect::hw;
use crate::dialect::{DialectOp, LtlOp};
use crate::refs::{OpRef, ValueRef};

use super::{CastToProp, Concat, Delay, Disable, Repeat, defined_by, is_property};

/// Fold a temporal operation to one of its operands, if it is an identity.
pub fn fold(ctx: &IrContext, op: OpRef, kind: LtlOp) -> Option<ValueRef> {
    match kind {
        LtlOp::Delay => fold_delay(ctx, Delay::from_op(ctx, op).ok()?),
        LtlOp::Concat => fold_concat(ctx, Concat::from_op(ctx, op).ok()?),
        LtlOp::Repeat => fold_repeat(ctx, Repeat::from_op(ctx, op).ok()?),
        LtlOp::Disable => fold_disable(ctx, Disable::from_op(ctx, op).ok()?),
        LtlOp::CastToProp => fold_cast_to_prop(ctx, CastToProp::from_op(ctx, op).ok()?),
        LtlOp::Not
        | LtlOp::And
        | LtlOp::Or
        | LtlOp::Implication
        | LtlOp::Eventually
        | LtlOp::Until
        | LtlOp::Clock => None,
    }
}

/// `delay(s, 0, 0) -> s`
fn fold_delay(ctx: &IrContext, op: Delay) -> Option<ValueRef> {
    let input = op.input(ctx);
    let same_type = ctx.value_ty(input) == ctx.value_ty(op.result(ctx));
    (op.delay(ctx) == 0 && op.length(ctx) == Some(0) && same_type).then_some(input)
}

/// `concat(s) -> s`
fn fold_concat(ctx: &IrContext, op: Concat) -> Option<ValueRef> {
    match op.operands(ctx) {
        [single] => Some(*single),
        _ => None,
    }
}

/// `repeat(s, 1, 0) -> s`
fn fold_repeat(ctx: &IrContext, op: Repeat) -> Option<ValueRef> {
    (op.base(ctx) == 1 && op.more(ctx) == Some(0)).then(|| op.input(ctx))
}

/// `disable(p, false) -> p`
fn fold_disable(ctx: &IrContext, op: Disable) -> Option<ValueRef> {
    let condition = defined_by::<hw::Constant>(ctx, op.condition(ctx))?;
    condition.is_zero(ctx).then(|| op.input(ctx))
}

/// `castp(p) -> p`
fn fold_cast_to_prop(ctx: &IrContext, op: CastToProp) -> Option<ValueRef> {
    let input = op.input(ctx);
    is_property(ctx, input).then_some(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BlockData;
    use crate::dialect::ltl;
    use crate::location::{Location, Span};
    use crate::rewrite::fold_op;
    use crate::types::Type;

    fn setup() -> (IrContext, Location, ValueRef, ValueRef) {
        let mut ctx = IrContext::new();
        let loc = Location::new(ctx.paths.intern("folds.fir"), Span::default());
        let block = ctx.create_block(BlockData::new(loc, vec![Type::Sequence, Type::Property]));
        let s = ctx.block_arg(block, 0);
        let p = ctx.block_arg(block, 1);
        (ctx, loc, s, p)
    }

    #[test]
    fn delay_zero_folds_only_when_bounded_to_zero() {
        let (mut ctx, loc, s, _) = setup();
        let identity = ltl::delay(&mut ctx, loc, s, 0, Some(0));
        let unbounded = ltl::delay(&mut ctx, loc, s, 0, None);
        let later = ltl::delay(&mut ctx, loc, s, 1, Some(0));

        assert_eq!(fold_op(&ctx, identity.op_ref()), Some(s));
        assert_eq!(fold_op(&ctx, unbounded.op_ref()), None);
        assert_eq!(fold_op(&ctx, later.op_ref()), None);
    }

    #[test]
    fn delay_zero_keeps_boolean_input() {
        let (mut ctx, loc, _, _) = setup();
        let c = hw::constant(&mut ctx, loc, 1, 1).result(&ctx);
        let d = ltl::delay(&mut ctx, loc, c, 0, Some(0));
        // i1 input vs sequence result: types differ, no fold.
        assert_eq!(fold_op(&ctx, d.op_ref()), None);
    }

    #[test]
    fn single_concat_and_trivial_repeat() {
        let (mut ctx, loc, s, _) = setup();
        let single = ltl::concat(&mut ctx, loc, [s]);
        let pair = ltl::concat(&mut ctx, loc, [s, s]);
        let once = ltl::repeat(&mut ctx, loc, s, 1, Some(0));
        let twice = ltl::repeat(&mut ctx, loc, s, 2, Some(0));

        assert_eq!(fold_op(&ctx, single.op_ref()), Some(s));
        assert_eq!(fold_op(&ctx, pair.op_ref()), None);
        assert_eq!(fold_op(&ctx, once.op_ref()), Some(s));
        assert_eq!(fold_op(&ctx, twice.op_ref()), None);
    }

    #[test]
    fn disable_on_constant_false() {
        let (mut ctx, loc, _, p) = setup();
        let zero = hw::constant(&mut ctx, loc, 1, 0).result(&ctx);
        let one = hw::constant(&mut ctx, loc, 1, 1).result(&ctx);
        let never = ltl::disable(&mut ctx, loc, p, zero);
        let sometimes = ltl::disable(&mut ctx, loc, p, one);

        assert_eq!(fold_op(&ctx, never.op_ref()), Some(p));
        assert_eq!(fold_op(&ctx, sometimes.op_ref()), None);
    }

    #[test]
    fn cast_of_property_is_identity() {
        let (mut ctx, loc, s, p) = setup();
        let redundant = ltl::cast_to_prop(&mut ctx, loc, p);
        let needed = ltl::cast_to_prop(&mut ctx, loc, s);
        assert_eq!(fold_op(&ctx, redundant.op_ref()), Some(p));
        assert_eq!(fold_op(&ctx, needed.op_ref()), None);
    }

    #[test]
    fn non_temporal_ops_never_fold() {
        let (mut ctx, loc, _, _) = setup();
        let c = hw::constant(&mut ctx, loc, 1, 0);
        assert_eq!(fold_op(&ctx, c.op_ref()), None);
    }
}
