//! Canonicalization patterns for temporal operations.
//!
//! Delay patterns keep delays innermost and merged; concat patterns keep
//! concatenations flat. The `CastpIn*` patterns push a `cast_to_prop` through
//! a connective so the cast lands on every sequence operand that needs it and
//! the connective itself becomes property-typed.

use smallvec::{SmallVec, smallvec};

use crate::context::{IrContext, OperationDataBuilder};
use crate::dialect::DialectOp;
use crate::refs::{OpRef, ValueRef};
use crate::rewrite::{PatternRewriter, RewritePattern};
use crate::types::Type;

use super::{
    CastToProp, Concat, Delay, Disable, Eventually, Implication, Not, Until, defined_by,
    is_property,
};

/// Create a copy of `op` with new operands and a property result.
fn rebuild_as_property(ctx: &mut IrContext, op: OpRef, operands: &[ValueRef]) -> OpRef {
    let data = ctx.op(op);
    let location = data.location;
    let kind = data.kind;
    let attributes = data.attributes.clone();
    let mut builder = OperationDataBuilder::new(location, kind)
        .operands(operands.iter().copied())
        .result(Type::Property);
    for (key, value) in attributes {
        builder = builder.attr(key, value);
    }
    builder.create(ctx)
}

/// Sum two optional lengths, where `None` is unbounded.
fn add_lengths(a: Option<u64>, b: Option<u64>) -> Option<Option<u64>> {
    match (a, b) {
        (Some(a), Some(b)) => a.checked_add(b).map(Some),
        _ => Some(None),
    }
}

// ============================================================================
// Concat / delay
// ============================================================================

/// `concat(..., concat(a, b), ...) -> concat(..., a, b, ...)`
pub struct FlattenConcats;

impl RewritePattern for FlattenConcats {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let Ok(concat) = Concat::from_op(ctx, op) else {
            return false;
        };
        let inputs = concat.operands(ctx);
        if !inputs
            .iter()
            .any(|&v| defined_by::<Concat>(ctx, v).is_some())
        {
            return false;
        }

        let mut flat: SmallVec<[ValueRef; 8]> = SmallVec::new();
        for &v in inputs {
            match defined_by::<Concat>(ctx, v) {
                Some(inner) => flat.extend_from_slice(inner.operands(ctx)),
                None => flat.push(v),
            }
        }

        let location = ctx.op(op).location;
        let new_op = super::concat(ctx, location, flat);
        rewriter.replace_op(new_op.op_ref());
        true
    }

    fn name(&self) -> &'static str {
        "FlattenConcats"
    }
}

/// `delay(delay(s, a, l1), b, l2) -> delay(s, a + b, l1 + l2)`
pub struct NestedDelays;

impl RewritePattern for NestedDelays {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let Ok(outer) = Delay::from_op(ctx, op) else {
            return false;
        };
        let Some(inner) = defined_by::<Delay>(ctx, outer.input(ctx)) else {
            return false;
        };
        let Some(delay) = inner.delay(ctx).checked_add(outer.delay(ctx)) else {
            return false;
        };
        let Some(length) = add_lengths(inner.length(ctx), outer.length(ctx)) else {
            return false;
        };

        let location = ctx.op(op).location;
        let input = inner.input(ctx);
        let new_op = super::delay(ctx, location, input, delay, length);
        rewriter.replace_op(new_op.op_ref());
        true
    }

    fn name(&self) -> &'static str {
        "NestedDelays"
    }
}

/// `delay(concat(s0, s1, ...), n, m) -> concat(delay(s0, n, m), s1, ...)`
pub struct MoveDelayIntoConcat;

impl RewritePattern for MoveDelayIntoConcat {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        let Ok(delay) = Delay::from_op(ctx, op) else {
            return false;
        };
        let Some(concat) = defined_by::<Concat>(ctx, delay.input(ctx)) else {
            return false;
        };
        let Some((&first, rest)) = concat.operands(ctx).split_first() else {
            return false;
        };
        let rest: SmallVec<[ValueRef; 8]> = rest.into();

        let location = ctx.op(op).location;
        let (n, m) = (delay.delay(ctx), delay.length(ctx));
        let moved = super::delay(ctx, location, first, n, m);
        let moved_value = moved.result(ctx);
        let new_concat = super::concat(
            ctx,
            location,
            std::iter::once(moved_value).chain(rest),
        );
        rewriter.replace_with_prefix(vec![moved.op_ref()], new_concat.op_ref());
        true
    }

    fn name(&self) -> &'static str {
        "MoveDelayIntoConcat"
    }
}

// ============================================================================
// Cast push
// ============================================================================

/// Shared shape of the cast-push patterns: match `castp(producer(...))`, let
/// `select` pick the operand indices to cast, then rebuild the producer with
/// the cast operands and a property result. An empty selection means no match.
fn push_cast<T: DialectOp>(
    ctx: &mut IrContext,
    op: OpRef,
    rewriter: &mut PatternRewriter,
    select: impl FnOnce(&IrContext, T) -> SmallVec<[usize; 2]>,
) -> bool {
    let Ok(cast) = CastToProp::from_op(ctx, op) else {
        return false;
    };
    let Some(producer) = defined_by::<T>(ctx, cast.input(ctx)) else {
        return false;
    };
    let indices = select(&*ctx, producer);
    if indices.is_empty() {
        return false;
    }

    let producer_op = producer.op_ref();
    let mut operands: SmallVec<[ValueRef; 4]> = ctx.op_operands(producer_op).into();
    let location = ctx.op(op).location;
    let mut casts = Vec::with_capacity(indices.len());
    for index in indices {
        let inner_cast = super::cast_to_prop(ctx, location, operands[index]);
        operands[index] = inner_cast.result(ctx);
        casts.push(inner_cast.op_ref());
    }
    let rebuilt = rebuild_as_property(ctx, producer_op, &operands);
    rewriter.replace_with_prefix(casts, rebuilt);
    true
}

/// Selects operand `index` when it is not yet a property.
fn cast_if_sequence(ctx: &IrContext, v: ValueRef, index: usize) -> SmallVec<[usize; 2]> {
    if is_property(ctx, v) {
        SmallVec::new()
    } else {
        smallvec![index]
    }
}

/// `castp(not(s)) -> not(castp(s))`
pub struct CastpInNot;

impl RewritePattern for CastpInNot {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        push_cast::<Not>(ctx, op, rewriter, |ctx, not| {
            cast_if_sequence(ctx, not.input(ctx), 0)
        })
    }

    fn name(&self) -> &'static str {
        "CastpInNot"
    }
}

/// `castp(implication(a, s)) -> implication(a, castp(s))`
pub struct CastpInImplication;

impl RewritePattern for CastpInImplication {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        push_cast::<Implication>(ctx, op, rewriter, |ctx, imp| {
            cast_if_sequence(ctx, imp.consequent(ctx), 1)
        })
    }

    fn name(&self) -> &'static str {
        "CastpInImplication"
    }
}

/// `castp(eventually(s)) -> eventually(castp(s))`
pub struct CastpInEventually;

impl RewritePattern for CastpInEventually {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        push_cast::<Eventually>(ctx, op, rewriter, |ctx, ev| {
            cast_if_sequence(ctx, ev.input(ctx), 0)
        })
    }

    fn name(&self) -> &'static str {
        "CastpInEventually"
    }
}

/// `castp(until(s, p)) -> until(castp(s), p)`, casting a sequence condition
/// as well so the rebuilt `until` is a property.
pub struct CastpInUntilInput;

impl RewritePattern for CastpInUntilInput {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        push_cast::<Until>(ctx, op, rewriter, |ctx, until| {
            let mut indices = cast_if_sequence(ctx, until.input(ctx), 0);
            if !indices.is_empty() {
                indices.extend(cast_if_sequence(ctx, until.condition(ctx), 1));
            }
            indices
        })
    }

    fn name(&self) -> &'static str {
        "CastpInUntilInput"
    }
}

/// `castp(until(p, s)) -> until(p, castp(s))`
pub struct CastpInUntilCondition;

impl RewritePattern for CastpInUntilCondition {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        push_cast::<Until>(ctx, op, rewriter, |ctx, until| {
            if is_property(ctx, until.input(ctx)) {
                cast_if_sequence(ctx, until.condition(ctx), 1)
            } else {
                SmallVec::new()
            }
        })
    }

    fn name(&self) -> &'static str {
        "CastpInUntilCondition"
    }
}

/// `castp(disable(s, c)) -> disable(castp(s), c)`
pub struct CastpInDisable;

impl RewritePattern for CastpInDisable {
    fn match_and_rewrite(
        &self,
        ctx: &mut IrContext,
        op: OpRef,
        rewriter: &mut PatternRewriter,
    ) -> bool {
        push_cast::<Disable>(ctx, op, rewriter, |ctx, disable| {
            cast_if_sequence(ctx, disable.input(ctx), 0)
        })
    }

    fn name(&self) -> &'static str {
        "CastpInDisable"
    }
}
