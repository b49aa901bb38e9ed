//! Structural validation.
//!
//! Three checks, run together by [`validate_program`]:
//!
//! 1. **Dominance**: every operand is a block argument of the current or an
//!    enclosing block, or the result of an operation placed earlier in the
//!    current or an enclosing block.
//! 2. **Use-chain consistency**: the use-chain stored in `IrContext` matches
//!    the actual operands, in both directions.
//! 3. **Unique module names** within each circuit.

use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;

use derive_more::Display;

use crate::context::IrContext;
use crate::dialect::OpKind;
use crate::dialect::hw::ATTR_SYM_NAME;
use crate::location::Location;
use crate::program::Program;
use crate::refs::{BlockRef, OpRef, RegionRef, ValueDef, ValueRef};
use crate::symbol::Symbol;
use crate::types::Attribute;
use crate::walk::{WalkAction, walk_region};

/// A single validation failure.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum ValidationError {
    #[display("operand #{operand_index} of `{consumer}` in @{scope} does not dominate its use: {value}")]
    Dominance {
        scope: Symbol,
        consumer: OpKind,
        operand_index: usize,
        value: String,
        location: Location,
    },
    #[display("{message}")]
    UseChain { message: String, location: Location },
    #[display("module @{module} is defined more than once in circuit @{circuit}")]
    DuplicateModule {
        circuit: Symbol,
        module: Symbol,
        location: Location,
    },
}

impl ValidationError {
    /// Where the offending operation sits in the source.
    pub fn location(&self) -> Location {
        match self {
            ValidationError::Dominance { location, .. }
            | ValidationError::UseChain { location, .. }
            | ValidationError::DuplicateModule { location, .. } => *location,
        }
    }
}

/// Result of validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "validation passed");
        }
        writeln!(f, "{} validation error(s) found:", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "  - {err}")?;
        }
        Ok(())
    }
}

fn sym_name(ctx: &IrContext, op: OpRef) -> Option<Symbol> {
    ctx.op_attr(op, ATTR_SYM_NAME()).and_then(Attribute::as_symbol)
}

/// Describe a value for diagnostic purposes.
fn describe_value(ctx: &IrContext, v: ValueRef) -> String {
    match ctx.value_def(v) {
        ValueDef::OpResult(op, idx) => {
            let state = if ctx.is_attached(op) { "" } else { " (detached)" };
            format!("result #{idx} of `{}`{state}", ctx.op_kind(op))
        }
        ValueDef::BlockArg(block, idx) => format!("argument #{idx} of {block}"),
    }
}

// ============================================================================
// Dominance
// ============================================================================

struct DominanceChecker<'a> {
    ctx: &'a IrContext,
    errors: Vec<ValidationError>,
}

impl DominanceChecker<'_> {
    fn check_region(&mut self, region: RegionRef, visible: &HashSet<ValueRef>, scope: Symbol) {
        for &block in &self.ctx.region(region).blocks {
            let mut visible = visible.clone();
            self.check_block(block, &mut visible, scope);
        }
    }

    fn check_block(&mut self, block: BlockRef, visible: &mut HashSet<ValueRef>, scope: Symbol) {
        let ctx = self.ctx;
        visible.extend(ctx.block_args(block).iter().copied());
        for &op in &ctx.block(block).ops {
            for (operand_index, &operand) in ctx.op_operands(op).iter().enumerate() {
                if !visible.contains(&operand) {
                    self.errors.push(ValidationError::Dominance {
                        scope,
                        consumer: ctx.op_kind(op),
                        operand_index,
                        value: describe_value(ctx, operand),
                        location: ctx.op(op).location,
                    });
                }
            }
            let inner_scope = sym_name(ctx, op).unwrap_or(scope);
            for &region in &ctx.op(op).regions {
                self.check_region(region, visible, inner_scope);
            }
            visible.extend(ctx.op_results(op).iter().copied());
        }
    }
}

/// Check that every operand in `region` is dominated by its definition.
pub fn validate_dominance(ctx: &IrContext, region: RegionRef, scope: Symbol) -> ValidationResult {
    let mut checker = DominanceChecker {
        ctx,
        errors: Vec::new(),
    };
    checker.check_region(region, &HashSet::new(), scope);
    ValidationResult {
        errors: checker.errors,
    }
}

// ============================================================================
// Use-chain consistency
// ============================================================================

/// Validate that the use-chain stored in `IrContext` matches the actual operands.
///
/// Checks two directions:
/// 1. For every operand of every op, there must be a corresponding entry in `uses(operand)`.
/// 2. For every use of a value defined in the region, the referenced op's operand must point back.
pub fn validate_use_chains(ctx: &IrContext, region: RegionRef) -> ValidationResult {
    let mut errors = Vec::new();
    let mut actual_uses: HashSet<(ValueRef, OpRef, u32)> = HashSet::new();
    let mut defined: HashSet<ValueRef> = HashSet::new();

    let _ = walk_region::<()>(ctx, region, &mut |op| {
        for (idx, &operand) in ctx.op_operands(op).iter().enumerate() {
            actual_uses.insert((operand, op, idx as u32));
        }
        defined.extend(ctx.op_results(op).iter().copied());
        for &r in &ctx.op(op).regions {
            for &block in &ctx.region(r).blocks {
                defined.extend(ctx.block_args(block).iter().copied());
            }
        }
        ControlFlow::Continue(WalkAction::Advance)
    });
    for &block in &ctx.region(region).blocks {
        defined.extend(ctx.block_args(block).iter().copied());
    }

    for &(val, op, idx) in &actual_uses {
        let found = ctx
            .uses(val)
            .iter()
            .any(|u| u.user == op && u.operand_index == idx);
        if !found {
            errors.push(ValidationError::UseChain {
                message: format!(
                    "operand #{idx} of `{}` ({op}) uses {val} but no use-chain entry exists",
                    ctx.op_kind(op),
                ),
                location: ctx.op(op).location,
            });
        }
    }

    for &val in &defined {
        for u in ctx.uses(val) {
            if !actual_uses.contains(&(val, u.user, u.operand_index)) {
                errors.push(ValidationError::UseChain {
                    message: format!(
                        "use-chain entry for {val} claims use by {} operand #{}, but no such operand exists",
                        u.user, u.operand_index,
                    ),
                    location: ctx.op(u.user).location,
                });
            }
        }
    }

    ValidationResult { errors }
}

// ============================================================================
// Program
// ============================================================================

/// Run every check over every circuit of the program.
pub fn validate_program(program: &Program) -> ValidationResult {
    let ctx = &program.ctx;
    let mut result = ValidationResult::default();
    for circuit in program.circuits() {
        let name = circuit.name(ctx);
        let body = ctx.op(circuit.op()).regions[0];
        result.merge(validate_dominance(ctx, body, name));
        result.merge(validate_use_chains(ctx, body));

        let mut seen = HashSet::new();
        for module in circuit.modules(ctx) {
            let module_name = module.name(ctx);
            if !seen.insert(module_name) {
                result.errors.push(ValidationError::DuplicateModule {
                    circuit: name,
                    module: module_name,
                    location: ctx.op(module.op()).location,
                });
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::OperationDataBuilder;
    use crate::dialect::{DialectOp, HwOp, ModuleKind, hw, ltl};
    use crate::program::Module;
    use crate::types::Type;
    use cranelift_entity::EntityList;

    fn program_with_module() -> (Program, Module, Location) {
        let mut program = Program::new();
        let loc = program.location("valid.fir");
        let circuit = program.add_circuit(Symbol::new("V"), loc);
        let module = circuit
            .add_module(
                &mut program.ctx,
                Symbol::new("Top"),
                ModuleKind::Design,
                vec![Type::bool()],
                loc,
            )
            .unwrap();
        (program, module, loc)
    }

    #[test]
    fn well_formed_module_passes() {
        let (mut program, module, loc) = program_with_module();
        let ctx = &mut program.ctx;
        let port = module.ports(ctx)[0];
        let d = ltl::delay(ctx, loc, port, 1, Some(0));
        module.append(ctx, d.op_ref());
        let v = d.result(ctx);
        let assert = crate::dialect::verif::assert(ctx, loc, v, None);
        module.append(ctx, assert.op_ref());

        let result = validate_program(&program);
        assert!(result.is_ok(), "{result}");
    }

    #[test]
    fn use_before_definition_is_reported() {
        let (mut program, module, loc) = program_with_module();
        let ctx = &mut program.ctx;
        let c = hw::constant(ctx, loc, 1, 0);
        let v = c.result(ctx);
        let out = hw::output(ctx, loc, [v]);
        module.append(ctx, out.op_ref());
        module.append(ctx, c.op_ref());

        let result = validate_program(&program);
        assert_eq!(
            result.errors,
            vec![ValidationError::Dominance {
                scope: Symbol::new("Top"),
                consumer: OpKind::Hw(HwOp::Output),
                operand_index: 0,
                value: "result #0 of `hw.constant`".to_string(),
                location: loc,
            }]
        );
    }

    #[test]
    fn detached_producer_is_reported() {
        let (mut program, module, loc) = program_with_module();
        let ctx = &mut program.ctx;
        let c = hw::constant(ctx, loc, 1, 1);
        let v = c.result(ctx);
        let out = hw::output(ctx, loc, [v]);
        module.append(ctx, out.op_ref());

        let result = validate_program(&program);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].to_string().contains("(detached)"));
    }

    #[test]
    fn values_do_not_cross_module_boundaries() {
        let (mut program, module, loc) = program_with_module();
        let circuit = program.circuits()[0];
        let ctx = &mut program.ctx;
        let other = circuit
            .add_module(ctx, Symbol::new("Other"), ModuleKind::Design, vec![], loc)
            .unwrap();
        let foreign = module.ports(ctx)[0];
        let out = hw::output(ctx, loc, [foreign]);
        other.append(ctx, out.op_ref());

        let result = validate_program(&program);
        assert!(matches!(
            &result.errors[..],
            [ValidationError::Dominance { scope, .. }] if *scope == Symbol::new("Other")
        ));
    }

    #[test]
    fn stale_use_chain_entry_is_reported() {
        let (mut program, module, loc) = program_with_module();
        let ctx = &mut program.ctx;
        let port = module.ports(ctx)[0];
        let out = hw::output(ctx, loc, [port]);
        module.append(ctx, out.op_ref());
        ctx.op_mut(out.op_ref()).operands = EntityList::new();

        let result = validate_program(&program);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0], ValidationError::UseChain { .. }));
        assert_eq!(result.errors[0].location(), loc);
    }

    #[test]
    fn duplicate_module_names_are_reported() {
        let (mut program, _, loc) = program_with_module();
        let circuit = program.circuits()[0];
        let ctx = &mut program.ctx;
        // Bypass `add_module`, which refuses duplicates.
        let region = {
            let block = ctx.create_block(crate::context::BlockData::new(loc, vec![]));
            ctx.create_region(crate::context::RegionData {
                location: loc,
                blocks: smallvec::smallvec![block],
                parent_op: None,
            })
        };
        let dup = OperationDataBuilder::new(loc, HwOp::Module(ModuleKind::Design))
            .attr(ATTR_SYM_NAME(), Symbol::new("Top"))
            .region(region)
            .create(ctx);
        let body = circuit.body_block(ctx);
        ctx.push_op(body, dup);

        let result = validate_program(&program);
        assert_eq!(
            result.errors,
            vec![ValidationError::DuplicateModule {
                circuit: Symbol::new("V"),
                module: Symbol::new("Top"),
                location: loc,
            }]
        );
    }
}
