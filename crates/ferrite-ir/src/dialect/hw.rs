//! `hw` dialect: structural operations.
//!
//! `hw.circuit` and `hw.module` are region-carrying containers managed through
//! [`crate::program`]; this module covers the leaf operations that live inside
//! module bodies.

use crate::context::{IrContext, OperationDataBuilder};
use crate::dialect::{HwOp, OpKind, typed_op};
use crate::location::Location;
use crate::refs::ValueRef;
use crate::symbol::Symbol;
use crate::symbols;
use crate::types::Type;

symbols! {
    ATTR_VALUE => "value",
    ATTR_NAME => "name",
    ATTR_MODULE => "module",
    ATTR_SYM_NAME => "sym_name",
    ATTR_TOP => "top",
    ATTR_LAYER => "layer",
    ATTR_COMPANION => "companion",
}

typed_op! {
    /// Integer constant.
    Constant = OpKind::Hw(HwOp::Constant)
}

typed_op! {
    /// Named wire forwarding its input.
    Wire = OpKind::Hw(HwOp::Wire); input: 0
}

typed_op! {
    /// Instantiation of another module by name.
    Instance = OpKind::Hw(HwOp::Instance)
}

typed_op! {
    /// Module body terminator.
    Output = OpKind::Hw(HwOp::Output)
}

impl Constant {
    pub fn value(&self, ctx: &IrContext) -> u64 {
        ctx.op_attr(self.0, ATTR_VALUE())
            .and_then(|a| a.as_int())
            .unwrap_or(0)
    }

    pub fn is_zero(&self, ctx: &IrContext) -> bool {
        self.value(ctx) == 0
    }
}

impl Wire {
    pub fn name(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op_attr(self.0, ATTR_NAME()).and_then(|a| a.as_symbol())
    }
}

impl Instance {
    /// Name of the instantiated module.
    pub fn module_name(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op_attr(self.0, ATTR_MODULE()).and_then(|a| a.as_symbol())
    }

    pub fn instance_name(&self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op_attr(self.0, ATTR_NAME()).and_then(|a| a.as_symbol())
    }
}

pub fn constant(ctx: &mut IrContext, location: Location, width: u32, value: u64) -> Constant {
    let op = OperationDataBuilder::new(location, HwOp::Constant)
        .attr(ATTR_VALUE(), value)
        .result(Type::Int(width))
        .create(ctx);
    Constant(op)
}

pub fn wire(ctx: &mut IrContext, location: Location, input: ValueRef, name: Symbol) -> Wire {
    let ty = ctx.value_ty(input);
    let op = OperationDataBuilder::new(location, HwOp::Wire)
        .operand(input)
        .attr(ATTR_NAME(), name)
        .result(ty)
        .create(ctx);
    Wire(op)
}

pub fn instance(
    ctx: &mut IrContext,
    location: Location,
    module: Symbol,
    name: Symbol,
    inputs: impl IntoIterator<Item = ValueRef>,
    result_types: impl IntoIterator<Item = Type>,
) -> Instance {
    let op = OperationDataBuilder::new(location, HwOp::Instance)
        .operands(inputs)
        .attr(ATTR_MODULE(), module)
        .attr(ATTR_NAME(), name)
        .results(result_types)
        .create(ctx);
    Instance(op)
}

pub fn output(
    ctx: &mut IrContext,
    location: Location,
    values: impl IntoIterator<Item = ValueRef>,
) -> Output {
    let op = OperationDataBuilder::new(location, HwOp::Output)
        .operands(values)
        .create(ctx);
    Output(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{ConversionError, DialectOp};
    use crate::location::Span;

    fn loc(ctx: &mut IrContext) -> Location {
        Location::new(ctx.paths.intern("hw.fir"), Span::default())
    }

    #[test]
    fn constant_round_trip() {
        let mut ctx = IrContext::new();
        let loc = loc(&mut ctx);
        let c = constant(&mut ctx, loc, 8, 42);

        let again = Constant::from_op(&ctx, c.op_ref()).unwrap();
        assert_eq!(again.value(&ctx), 42);
        assert_eq!(ctx.value_ty(c.result(&ctx)), Type::Int(8));
        assert!(!c.is_zero(&ctx));
    }

    #[test]
    fn instance_attributes() {
        let mut ctx = IrContext::new();
        let loc = loc(&mut ctx);
        let inst = instance(
            &mut ctx,
            loc,
            Symbol::new("Child"),
            Symbol::new("u0"),
            [],
            [Type::bool()],
        );
        assert_eq!(inst.module_name(&ctx), Some(Symbol::new("Child")));
        assert_eq!(inst.instance_name(&ctx), Some(Symbol::new("u0")));
        assert_eq!(ctx.op_results(inst.op_ref()).len(), 1);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut ctx = IrContext::new();
        let loc = loc(&mut ctx);
        let c = constant(&mut ctx, loc, 1, 0);
        let err = Wire::from_op(&ctx, c.op_ref()).unwrap_err();
        assert_eq!(
            err,
            ConversionError::WrongOperation {
                expected: OpKind::Hw(HwOp::Wire),
                actual: OpKind::Hw(HwOp::Constant),
            }
        );
        assert_eq!(err.to_string(), "expected `hw.wire`, found `hw.constant`");
    }
}
