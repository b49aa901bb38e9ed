//! Fold constants and apply the temporal canonicalization patterns until the
//! module body stops changing.

use ferrite_ir::dialect::canonicalization_patterns;
use ferrite_ir::rewrite::PatternApplicator;
use tracing::debug;

use crate::diagnostic::Diagnostic;
use crate::runner::{PassContext, PassTarget};

pub fn run(pctx: &mut PassContext<'_>, target: PassTarget) -> Result<(), Diagnostic> {
    for module in target.modules(&*pctx.program) {
        let ctx = pctx.ctx();
        let body = module.body(ctx);
        let bound = module.op_count(ctx) + 1;
        let result = PatternApplicator::new()
            .with_patterns(canonicalization_patterns())
            .with_max_iterations(bound)
            .apply_region(ctx, body);
        debug!(
            module = %module.name(ctx),
            iterations = result.iterations,
            changes = result.total_changes,
            "canonicalized"
        );
        if !result.reached_fixpoint {
            let name = module.name(ctx);
            let location = ctx.op(module.op()).location;
            pctx.warn(
                Diagnostic::warning(format!(
                    "canonicalization of `{name}` stopped after {bound} iterations"
                ))
                .at(location),
            );
        }
    }
    Ok(())
}
