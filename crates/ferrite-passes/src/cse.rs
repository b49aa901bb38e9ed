//! Common subexpression elimination.
//!
//! Two pure, region-free operations with the same kind, operands, attributes
//! and result types compute the same values; the later one is replaced by the
//! earlier. An operation is visible to everything after it in its block and
//! to every region nested below that point.

use std::collections::HashMap;

use ferrite_ir::{
    Attribute, BlockRef, IrContext, OpKind, OpRef, RegionRef, Symbol, Type, ValueRef,
};
use smallvec::SmallVec;
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::runner::{PassContext, PassTarget};

#[derive(Clone, PartialEq, Eq, Hash)]
struct OpKey {
    kind: OpKind,
    operands: SmallVec<[ValueRef; 4]>,
    attributes: Vec<(Symbol, Attribute)>,
    results: SmallVec<[Type; 2]>,
}

impl OpKey {
    fn of(ctx: &IrContext, op: OpRef) -> Option<OpKey> {
        let data = ctx.op(op);
        if !data.kind.is_pure() || !data.regions.is_empty() {
            return None;
        }
        Some(OpKey {
            kind: data.kind,
            operands: ctx.op_operands(op).iter().copied().collect(),
            attributes: data
                .attributes
                .iter()
                .map(|(k, v)| (*k, v.clone()))
                .collect(),
            results: data.results.clone(),
        })
    }
}

type Known = HashMap<OpKey, OpRef>;

pub fn run(pctx: &mut PassContext<'_>, target: PassTarget) -> Result<(), Diagnostic> {
    for module in target.modules(&*pctx.program) {
        let body = module.body(&pctx.program.ctx);
        let erased = cse_region(pctx.ctx(), body, &Known::new());
        if erased > 0 {
            debug!(module = %module.name(&pctx.program.ctx), erased, "cse");
        }
    }
    Ok(())
}

/// Deduplicate within `region`, seeing everything in `outer`. Returns the
/// number of operations erased.
fn cse_region(ctx: &mut IrContext, region: RegionRef, outer: &Known) -> usize {
    let blocks: Vec<BlockRef> = ctx.region(region).blocks.to_vec();
    blocks
        .into_iter()
        .map(|block| cse_block(ctx, block, outer.clone()))
        .sum()
}

fn cse_block(ctx: &mut IrContext, block: BlockRef, mut known: Known) -> usize {
    let mut erased = 0;
    let ops: Vec<OpRef> = ctx.block(block).ops.to_vec();
    for op in ops {
        let regions: Vec<RegionRef> = ctx.op(op).regions.to_vec();
        for region in regions {
            erased += cse_region(ctx, region, &known);
        }

        let Some(key) = OpKey::of(ctx, op) else {
            continue;
        };
        match known.get(&key) {
            Some(&existing) => {
                let old: SmallVec<[ValueRef; 2]> = ctx.op_results(op).iter().copied().collect();
                let new: SmallVec<[ValueRef; 2]> =
                    ctx.op_results(existing).iter().copied().collect();
                for (from, to) in old.into_iter().zip(new) {
                    ctx.replace_all_uses(from, to);
                }
                ctx.erase_op(op);
                erased += 1;
            }
            None => {
                known.insert(key, op);
            }
        }
    }
    erased
}
