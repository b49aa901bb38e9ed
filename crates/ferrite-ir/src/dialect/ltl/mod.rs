//! `ltl` dialect: temporal sequences and properties.
//!
//! Sequences describe behaviour over clock cycles; properties are assertions
//! built from sequences. Boolean (`i1`) values are valid sequences of length
//! one.
//!
//! Connectives (`not`, `and`, `or`, `implication`, `eventually`, `until`,
//! `disable`) infer their result type from their property-position operands:
//! the result is `ltl.property` when every such operand is a property, and
//! `ltl.sequence` otherwise. `cast_to_prop` lifts a sequence to a property.

use crate::context::{IrContext, OperationDataBuilder};
use crate::dialect::{DialectOp, LtlOp, OpKind, typed_op};
use crate::location::Location;
use crate::refs::{OpRef, ValueRef};
use crate::rewrite::RewritePattern;
use crate::symbol::Symbol;
use crate::symbols;
use crate::types::Type;

pub mod folds;
pub mod patterns;

symbols! {
    ATTR_DELAY => "delay",
    ATTR_LENGTH => "length",
    ATTR_BASE => "base",
    ATTR_MORE => "more",
    ATTR_EDGE => "edge",
}

typed_op! {
    /// `delay(input, delay, length)`: `input` starts `delay` cycles later,
    /// with up to `length` further cycles of slack. No `length` means unbounded.
    Delay = OpKind::Ltl(LtlOp::Delay); input: 0
}

typed_op! {
    /// Back-to-back concatenation of sequences.
    Concat = OpKind::Ltl(LtlOp::Concat)
}

typed_op! {
    /// `repeat(input, base, more)`: `base` repetitions plus up to `more`
    /// additional ones. No `more` means unbounded.
    Repeat = OpKind::Ltl(LtlOp::Repeat); input: 0
}

typed_op! {
    /// Property that holds vacuously while `condition` is set.
    Disable = OpKind::Ltl(LtlOp::Disable); input: 0, condition: 1
}

typed_op! {
    CastToProp = OpKind::Ltl(LtlOp::CastToProp); input: 0
}

typed_op! {
    Not = OpKind::Ltl(LtlOp::Not); input: 0
}

typed_op! {
    And = OpKind::Ltl(LtlOp::And)
}

typed_op! {
    Or = OpKind::Ltl(LtlOp::Or)
}

typed_op! {
    Implication = OpKind::Ltl(LtlOp::Implication); antecedent: 0, consequent: 1
}

typed_op! {
    Eventually = OpKind::Ltl(LtlOp::Eventually); input: 0
}

typed_op! {
    Until = OpKind::Ltl(LtlOp::Until); input: 0, condition: 1
}

typed_op! {
    /// Associates a sequence or property with a clock edge.
    Clock = OpKind::Ltl(LtlOp::Clock); input: 0, clock: 1
}

fn int_attr(ctx: &IrContext, op: OpRef, key: Symbol) -> Option<u64> {
    ctx.op_attr(op, key).and_then(|a| a.as_int())
}

impl Delay {
    pub fn delay(&self, ctx: &IrContext) -> u64 {
        int_attr(ctx, self.0, ATTR_DELAY()).unwrap_or(0)
    }

    /// Extra cycles of slack; `None` means unbounded.
    pub fn length(&self, ctx: &IrContext) -> Option<u64> {
        int_attr(ctx, self.0, ATTR_LENGTH())
    }
}

impl Repeat {
    pub fn base(&self, ctx: &IrContext) -> u64 {
        int_attr(ctx, self.0, ATTR_BASE()).unwrap_or(0)
    }

    /// Additional repetitions; `None` means unbounded.
    pub fn more(&self, ctx: &IrContext) -> Option<u64> {
        int_attr(ctx, self.0, ATTR_MORE())
    }
}

/// Clock edge a [`Clock`] operation samples on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClockEdge {
    Pos,
    Neg,
    Both,
}

impl ClockEdge {
    pub fn as_str(self) -> &'static str {
        match self {
            ClockEdge::Pos => "posedge",
            ClockEdge::Neg => "negedge",
            ClockEdge::Both => "edge",
        }
    }
}

impl Clock {
    pub fn edge(&self, ctx: &IrContext) -> Option<ClockEdge> {
        let edge = ctx.op_attr(self.0, ATTR_EDGE())?.as_symbol()?;
        [ClockEdge::Pos, ClockEdge::Neg, ClockEdge::Both]
            .into_iter()
            .find(|e| edge == e.as_str())
    }
}

// ============================================================================
// Result type inference
// ============================================================================

/// Result type of a connective given its property-position operands.
pub fn connective_type(ctx: &IrContext, operands: &[ValueRef]) -> Type {
    if operands.iter().all(|&v| ctx.value_ty(v).is_property()) {
        Type::Property
    } else {
        Type::Sequence
    }
}

/// Whether `v` is property-typed.
pub fn is_property(ctx: &IrContext, v: ValueRef) -> bool {
    ctx.value_ty(v).is_property()
}

// ============================================================================
// Builders
// ============================================================================

pub fn delay(
    ctx: &mut IrContext,
    location: Location,
    input: ValueRef,
    delay: u64,
    length: Option<u64>,
) -> Delay {
    let op = OperationDataBuilder::new(location, LtlOp::Delay)
        .operand(input)
        .attr(ATTR_DELAY(), delay)
        .attr_opt(ATTR_LENGTH(), length)
        .result(Type::Sequence)
        .create(ctx);
    Delay(op)
}

pub fn concat(
    ctx: &mut IrContext,
    location: Location,
    inputs: impl IntoIterator<Item = ValueRef>,
) -> Concat {
    let op = OperationDataBuilder::new(location, LtlOp::Concat)
        .operands(inputs)
        .result(Type::Sequence)
        .create(ctx);
    Concat(op)
}

pub fn repeat(
    ctx: &mut IrContext,
    location: Location,
    input: ValueRef,
    base: u64,
    more: Option<u64>,
) -> Repeat {
    let op = OperationDataBuilder::new(location, LtlOp::Repeat)
        .operand(input)
        .attr(ATTR_BASE(), base)
        .attr_opt(ATTR_MORE(), more)
        .result(Type::Sequence)
        .create(ctx);
    Repeat(op)
}

pub fn disable(
    ctx: &mut IrContext,
    location: Location,
    input: ValueRef,
    condition: ValueRef,
) -> Disable {
    let ty = connective_type(ctx, &[input]);
    let op = OperationDataBuilder::new(location, LtlOp::Disable)
        .operands([input, condition])
        .result(ty)
        .create(ctx);
    Disable(op)
}

pub fn cast_to_prop(ctx: &mut IrContext, location: Location, input: ValueRef) -> CastToProp {
    let op = OperationDataBuilder::new(location, LtlOp::CastToProp)
        .operand(input)
        .result(Type::Property)
        .create(ctx);
    CastToProp(op)
}

pub fn not(ctx: &mut IrContext, location: Location, input: ValueRef) -> Not {
    let ty = connective_type(ctx, &[input]);
    let op = OperationDataBuilder::new(location, LtlOp::Not)
        .operand(input)
        .result(ty)
        .create(ctx);
    Not(op)
}

pub fn and(
    ctx: &mut IrContext,
    location: Location,
    inputs: impl IntoIterator<Item = ValueRef>,
) -> And {
    let inputs: Vec<ValueRef> = inputs.into_iter().collect();
    let ty = connective_type(ctx, &inputs);
    let op = OperationDataBuilder::new(location, LtlOp::And)
        .operands(inputs)
        .result(ty)
        .create(ctx);
    And(op)
}

pub fn or(
    ctx: &mut IrContext,
    location: Location,
    inputs: impl IntoIterator<Item = ValueRef>,
) -> Or {
    let inputs: Vec<ValueRef> = inputs.into_iter().collect();
    let ty = connective_type(ctx, &inputs);
    let op = OperationDataBuilder::new(location, LtlOp::Or)
        .operands(inputs)
        .result(ty)
        .create(ctx);
    Or(op)
}

pub fn implication(
    ctx: &mut IrContext,
    location: Location,
    antecedent: ValueRef,
    consequent: ValueRef,
) -> Implication {
    let ty = connective_type(ctx, &[consequent]);
    let op = OperationDataBuilder::new(location, LtlOp::Implication)
        .operands([antecedent, consequent])
        .result(ty)
        .create(ctx);
    Implication(op)
}

pub fn eventually(ctx: &mut IrContext, location: Location, input: ValueRef) -> Eventually {
    let ty = connective_type(ctx, &[input]);
    let op = OperationDataBuilder::new(location, LtlOp::Eventually)
        .operand(input)
        .result(ty)
        .create(ctx);
    Eventually(op)
}

pub fn until(
    ctx: &mut IrContext,
    location: Location,
    input: ValueRef,
    condition: ValueRef,
) -> Until {
    let ty = connective_type(ctx, &[input, condition]);
    let op = OperationDataBuilder::new(location, LtlOp::Until)
        .operands([input, condition])
        .result(ty)
        .create(ctx);
    Until(op)
}

pub fn clock(
    ctx: &mut IrContext,
    location: Location,
    input: ValueRef,
    edge: ClockEdge,
    clock: ValueRef,
) -> Clock {
    let ty = match ctx.value_ty(input) {
        Type::Property => Type::Property,
        _ => Type::Sequence,
    };
    let op = OperationDataBuilder::new(location, LtlOp::Clock)
        .operands([input, clock])
        .attr(ATTR_EDGE(), Symbol::new(edge.as_str()))
        .result(ty)
        .create(ctx);
    Clock(op)
}

/// Canonicalization patterns of the temporal dialect, in application order.
pub fn canonicalization_patterns() -> Vec<Box<dyn RewritePattern>> {
    use patterns::*;
    vec![
        Box::new(FlattenConcats),
        Box::new(NestedDelays),
        Box::new(MoveDelayIntoConcat),
        Box::new(CastpInNot),
        Box::new(CastpInImplication),
        Box::new(CastpInEventually),
        Box::new(CastpInUntilInput),
        Box::new(CastpInUntilCondition),
        Box::new(CastpInDisable),
    ]
}

/// Whether `v` is produced by an operation of wrapper type `T`.
pub(crate) fn defined_by<T: DialectOp>(ctx: &IrContext, v: ValueRef) -> Option<T> {
    let op = ctx.defining_op(v)?;
    T::from_op(ctx, op).ok()
}
