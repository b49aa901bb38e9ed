//! Reject circuits whose instance graph has a cycle.
//!
//! A module that (transitively) instantiates itself can never be
//! elaborated. The diagnostic points at the instance that closes the cycle
//! and lists the modules on it.

use std::collections::HashMap;

use ferrite_ir::dialect::DialectOp;
use ferrite_ir::{Circuit, IrContext, Module, OpRef, Symbol};
use tracing::trace;

use crate::diagnostic::Diagnostic;
use crate::runner::{PassContext, PassTarget};

pub fn run(pctx: &mut PassContext<'_>, target: PassTarget) -> Result<(), Diagnostic> {
    let program = &*pctx.program;
    for circuit in target.circuits(program) {
        check_circuit(&program.ctx, circuit)?;
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

struct Search<'a> {
    ctx: &'a IrContext,
    modules: &'a [Module],
    /// Per module: (instantiated module index, instance op).
    edges: &'a [Vec<(usize, OpRef)>],
    marks: Vec<Mark>,
    stack: Vec<usize>,
}

impl Search<'_> {
    fn visit(&mut self, m: usize) -> Result<(), Diagnostic> {
        self.marks[m] = Mark::OnStack;
        self.stack.push(m);
        let edges = self.edges;
        for &(callee, inst) in &edges[m] {
            match self.marks[callee] {
                Mark::OnStack => return Err(self.cycle(callee, inst)),
                Mark::Unvisited => self.visit(callee)?,
                Mark::Done => {}
            }
        }
        self.stack.pop();
        self.marks[m] = Mark::Done;
        Ok(())
    }

    fn cycle(&self, start: usize, inst: OpRef) -> Diagnostic {
        let from = self
            .stack
            .iter()
            .position(|&m| m == start)
            .unwrap_or_default();
        let path: Vec<String> = self.stack[from..]
            .iter()
            .chain(std::iter::once(&start))
            .map(|&m| self.modules[m].name(self.ctx).to_string())
            .collect();
        Diagnostic::error(format!("recursive instantiation: {}", path.join(" -> ")))
            .at(self.ctx.op(inst).location)
    }
}

fn check_circuit(ctx: &IrContext, circuit: Circuit) -> Result<(), Diagnostic> {
    let modules = circuit.modules(ctx);
    let index: HashMap<Symbol, usize> = modules
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name(ctx), i))
        .collect();
    // Instances of modules outside the circuit cannot close a cycle.
    let edges: Vec<Vec<(usize, OpRef)>> = modules
        .iter()
        .map(|m| {
            m.instances(ctx)
                .into_iter()
                .filter_map(|inst| {
                    let callee = *index.get(&inst.module_name(ctx)?)?;
                    Some((callee, inst.op_ref()))
                })
                .collect()
        })
        .collect();
    trace!(
        circuit = %circuit.name(ctx),
        modules = modules.len(),
        "checking instance graph"
    );

    let mut search = Search {
        ctx,
        modules: &modules,
        edges: &edges,
        marks: vec![Mark::Unvisited; modules.len()],
        stack: Vec::new(),
    };
    for m in 0..modules.len() {
        if search.marks[m] == Mark::Unvisited {
            search.visit(m)?;
        }
    }
    Ok(())
}
