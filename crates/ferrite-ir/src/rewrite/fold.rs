//! Fold dispatch.
//!
//! A fold inspects a single operation and, when it is an identity, returns
//! an existing value that can stand in for the operation's result. Folds
//! never create operations and never fail.

use crate::context::IrContext;
use crate::dialect::{OpKind, ltl};
use crate::refs::{OpRef, ValueRef};

/// Try to fold `op` to an existing value.
pub fn fold_op(ctx: &IrContext, op: OpRef) -> Option<ValueRef> {
    match ctx.op_kind(op) {
        OpKind::Ltl(kind) => ltl::folds::fold(ctx, op, kind),
        OpKind::Hw(_) | OpKind::Comb(_) | OpKind::Verif(_) => None,
    }
}
