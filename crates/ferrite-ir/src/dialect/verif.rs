//! `verif` dialect: assertion-like statements over properties.

use crate::context::{IrContext, OperationDataBuilder};
use crate::dialect::{OpKind, VerifOp, typed_op};
use crate::location::Location;
use crate::refs::{OpRef, ValueRef};
use crate::symbol::Symbol;
use crate::symbols;

symbols! {
    ATTR_LABEL => "label",
}

typed_op! {
    Assert = OpKind::Verif(VerifOp::Assert); property: 0
}

typed_op! {
    Assume = OpKind::Verif(VerifOp::Assume); property: 0
}

typed_op! {
    Cover = OpKind::Verif(VerifOp::Cover); property: 0
}

fn assertion_like(
    ctx: &mut IrContext,
    location: Location,
    kind: VerifOp,
    property: ValueRef,
    label: Option<Symbol>,
) -> OpRef {
    OperationDataBuilder::new(location, kind)
        .operand(property)
        .attr_opt(ATTR_LABEL(), label)
        .create(ctx)
}

pub fn assert(
    ctx: &mut IrContext,
    location: Location,
    property: ValueRef,
    label: Option<Symbol>,
) -> Assert {
    Assert(assertion_like(ctx, location, VerifOp::Assert, property, label))
}

pub fn assume(
    ctx: &mut IrContext,
    location: Location,
    property: ValueRef,
    label: Option<Symbol>,
) -> Assume {
    Assume(assertion_like(ctx, location, VerifOp::Assume, property, label))
}

pub fn cover(
    ctx: &mut IrContext,
    location: Location,
    property: ValueRef,
    label: Option<Symbol>,
) -> Cover {
    Cover(assertion_like(ctx, location, VerifOp::Cover, property, label))
}

/// Label of any assertion-like operation.
pub fn label(ctx: &IrContext, op: OpRef) -> Option<Symbol> {
    ctx.op_attr(op, ATTR_LABEL()).and_then(|a| a.as_symbol())
}
