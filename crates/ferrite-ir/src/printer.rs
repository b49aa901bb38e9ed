//! Text format printer.
//!
//! ```text
//! hw.circuit @Top {
//!   hw.module<design> @Top(%arg0: i1) {
//!     %0 = ltl.delay %arg0 {delay = 1, length = 0} : ltl.sequence
//!     verif.assert %0
//!   }
//! }
//! ```
//!
//! Values are numbered per module. Operands whose definition has not been
//! printed yet get a fresh number on first sight.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Write;

use crate::context::IrContext;
use crate::dialect::hw::ATTR_SYM_NAME;
use crate::dialect::{HwOp, OpKind};
use crate::program::Program;
use crate::refs::{BlockRef, OpRef, ValueDef, ValueRef};
use crate::types::Attribute;

struct PrintState<'a> {
    ctx: &'a IrContext,
    value_names: HashMap<ValueRef, String>,
    next_value_num: usize,
    next_arg_num: usize,
}

impl<'a> PrintState<'a> {
    fn new(ctx: &'a IrContext) -> Self {
        Self {
            ctx,
            value_names: HashMap::new(),
            next_value_num: 0,
            next_arg_num: 0,
        }
    }

    fn name(&mut self, v: ValueRef) -> String {
        if let Some(name) = self.value_names.get(&v) {
            return name.clone();
        }
        let name = match self.ctx.value_def(v) {
            ValueDef::BlockArg(..) => {
                self.next_arg_num += 1;
                format!("%arg{}", self.next_arg_num - 1)
            }
            ValueDef::OpResult(..) => {
                self.next_value_num += 1;
                format!("%{}", self.next_value_num - 1)
            }
        };
        self.value_names.insert(v, name.clone());
        name
    }

    fn reset_numbering(&mut self) {
        self.value_names.clear();
        self.next_value_num = 0;
        self.next_arg_num = 0;
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Print every circuit of a program.
pub fn print_program(program: &Program) -> String {
    let mut state = PrintState::new(&program.ctx);
    let mut out = String::new();
    for circuit in program.circuits() {
        print_operation(&mut state, &mut out, circuit.op(), 0)
            .expect("fmt::Write to String never fails");
    }
    out
}

/// Print a single operation (and its regions) as IR text.
pub fn print_op(ctx: &IrContext, op: OpRef) -> String {
    let mut state = PrintState::new(ctx);
    let mut out = String::new();
    print_operation(&mut state, &mut out, op, 0).expect("fmt::Write to String never fails");
    out
}

// ============================================================================
// Attributes
// ============================================================================

fn write_attr(f: &mut impl Write, attr: &Attribute) -> fmt::Result {
    match attr {
        Attribute::Unit => f.write_str("unit"),
        Attribute::Bool(b) => write!(f, "{b}"),
        Attribute::IntBits(v) => write!(f, "{v}"),
        Attribute::String(s) => write!(f, "{s:?}"),
        Attribute::Symbol(s) => write!(f, "@{s}"),
        Attribute::List(items) => {
            f.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_attr(f, item)?;
            }
            f.write_char(']')
        }
        Attribute::Location(loc) => write!(f, "loc({}:{})", loc.span.start, loc.span.end),
    }
}

/// Attributes other than `sym_name`, sorted by key text.
fn write_attr_dict(state: &PrintState<'_>, f: &mut impl Write, op: OpRef) -> fmt::Result {
    let mut attrs: Vec<(String, &Attribute)> = state
        .ctx
        .op(op)
        .attributes
        .iter()
        .filter(|(k, _)| **k != ATTR_SYM_NAME())
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    if attrs.is_empty() {
        return Ok(());
    }
    attrs.sort_by(|a, b| a.0.cmp(&b.0));

    f.write_str(" {")?;
    for (i, (key, value)) in attrs.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(key)?;
        if !matches!(value, Attribute::Unit) {
            f.write_str(" = ")?;
            write_attr(f, value)?;
        }
    }
    f.write_char('}')
}

// ============================================================================
// Operations
// ============================================================================

fn indent(f: &mut impl Write, level: usize) -> fmt::Result {
    for _ in 0..level {
        f.write_str("  ")?;
    }
    Ok(())
}

fn print_operation(
    state: &mut PrintState<'_>,
    f: &mut impl Write,
    op: OpRef,
    level: usize,
) -> fmt::Result {
    let ctx = state.ctx;
    let kind = ctx.op_kind(op);
    indent(f, level)?;

    if let OpKind::Hw(HwOp::Circuit | HwOp::Module(_)) = kind {
        return print_container(state, f, op, kind, level);
    }

    let results = ctx.op_results(op);
    if !results.is_empty() {
        let names: Vec<String> = results.iter().map(|&v| state.name(v)).collect();
        write!(f, "{} = ", names.join(", "))?;
    }
    write!(f, "{kind}")?;

    let operands: Vec<String> = ctx.op_operands(op).iter().map(|&v| state.name(v)).collect();
    if !operands.is_empty() {
        write!(f, " {}", operands.join(", "))?;
    }
    write_attr_dict(state, f, op)?;

    let types = ctx.op_result_types(op);
    if !types.is_empty() {
        let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
        write!(f, " : {}", types.join(", "))?;
    }
    f.write_char('\n')
}

fn print_container(
    state: &mut PrintState<'_>,
    f: &mut impl Write,
    op: OpRef,
    kind: OpKind,
    level: usize,
) -> fmt::Result {
    let ctx = state.ctx;
    let name = ctx
        .op_attr(op, ATTR_SYM_NAME())
        .and_then(Attribute::as_symbol)
        .map(|s| s.to_string())
        .unwrap_or_default();

    write!(f, "{kind}")?;
    if let Some(module_kind) = kind.module_kind() {
        write!(f, "<{module_kind}>")?;
        state.reset_numbering();
    }
    write!(f, " @{name}")?;

    let Some(&region) = ctx.op(op).regions.first() else {
        return f.write_char('\n');
    };
    let blocks = &ctx.region(region).blocks;
    let entry: Option<BlockRef> = blocks.first().copied();

    if kind.is_module() {
        let args: Vec<String> = entry
            .map(|b| ctx.block_args(b).to_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|v| format!("{}: {}", state.name(v), ctx.value_ty(v)))
            .collect();
        write!(f, "({})", args.join(", "))?;
    }
    write_attr_dict(state, f, op)?;
    f.write_str(" {\n")?;

    for &block in blocks {
        for &inner in &ctx.block(block).ops {
            print_operation(state, f, inner, level + 1)?;
        }
    }

    indent(f, level)?;
    f.write_str("}\n")
}
