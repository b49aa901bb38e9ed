//! `comb` dialect: combinational boolean logic.

use crate::context::{IrContext, OperationDataBuilder};
use crate::dialect::{CombOp, OpKind, typed_op};
use crate::location::Location;
use crate::refs::ValueRef;

typed_op! {
    And = OpKind::Comb(CombOp::And); lhs: 0, rhs: 1
}

typed_op! {
    Or = OpKind::Comb(CombOp::Or); lhs: 0, rhs: 1
}

typed_op! {
    Xor = OpKind::Comb(CombOp::Xor); lhs: 0, rhs: 1
}

typed_op! {
    /// Two-way multiplexer selecting `on_true` when `cond` is set.
    Mux = OpKind::Comb(CombOp::Mux); cond: 0, on_true: 1, on_false: 2
}

fn binary(
    ctx: &mut IrContext,
    location: Location,
    kind: CombOp,
    lhs: ValueRef,
    rhs: ValueRef,
) -> crate::refs::OpRef {
    let ty = ctx.value_ty(lhs);
    OperationDataBuilder::new(location, kind)
        .operands([lhs, rhs])
        .result(ty)
        .create(ctx)
}

pub fn and(ctx: &mut IrContext, location: Location, lhs: ValueRef, rhs: ValueRef) -> And {
    And(binary(ctx, location, CombOp::And, lhs, rhs))
}

pub fn or(ctx: &mut IrContext, location: Location, lhs: ValueRef, rhs: ValueRef) -> Or {
    Or(binary(ctx, location, CombOp::Or, lhs, rhs))
}

pub fn xor(ctx: &mut IrContext, location: Location, lhs: ValueRef, rhs: ValueRef) -> Xor {
    Xor(binary(ctx, location, CombOp::Xor, lhs, rhs))
}

pub fn mux(
    ctx: &mut IrContext,
    location: Location,
    cond: ValueRef,
    on_true: ValueRef,
    on_false: ValueRef,
) -> Mux {
    let ty = ctx.value_ty(on_true);
    let op = OperationDataBuilder::new(location, CombOp::Mux)
        .operands([cond, on_true, on_false])
        .result(ty)
        .create(ctx);
    Mux(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{DialectOp, hw};
    use crate::location::Span;
    use crate::types::Type;

    #[test]
    fn mux_takes_arm_type() {
        let mut ctx = IrContext::new();
        let loc = Location::new(ctx.paths.intern("comb.fir"), Span::default());
        let c = hw::constant(&mut ctx, loc, 1, 1).result(&ctx);
        let a = hw::constant(&mut ctx, loc, 4, 3).result(&ctx);
        let b = hw::constant(&mut ctx, loc, 4, 5).result(&ctx);

        let m = mux(&mut ctx, loc, c, a, b);
        assert_eq!(ctx.value_ty(m.result(&ctx)), Type::Int(4));
        assert_eq!(m.on_false(&ctx), b);
        assert!(Mux::from_op(&ctx, m.op_ref()).is_ok());
        assert!(And::from_op(&ctx, m.op_ref()).is_err());
    }
}
