//! Program, circuit and module views.
//!
//! A [`Program`] owns the [`IrContext`] together with the ordered list of
//! `hw.circuit` operations. [`Circuit`] and [`Module`] are thin `Copy`
//! wrappers around the corresponding operations; all state lives in the
//! context.

use std::ops::ControlFlow;

use derive_more::{Display, Error};
use smallvec::smallvec;

use crate::context::{BlockData, IrContext, OperationDataBuilder, RegionData};
use crate::dialect::hw::{self, ATTR_COMPANION, ATTR_LAYER, ATTR_SYM_NAME, ATTR_TOP};
use crate::dialect::{DialectOp, HwOp, ModuleKind, OpKind};
use crate::location::Location;
use crate::refs::{BlockRef, OpRef, RegionRef, ValueRef};
use crate::symbol::Symbol;
use crate::types::{Attribute, Type};
use crate::walk::{WalkAction, walk_region};

/// Returned by [`Circuit::add_module`] when the name is already taken.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
#[display("module `{module}` is already defined in circuit `{circuit}`")]
pub struct ModuleNameConflict {
    pub circuit: Symbol,
    pub module: Symbol,
}

fn sym_name(ctx: &IrContext, op: OpRef) -> Symbol {
    ctx.op_attr(op, ATTR_SYM_NAME())
        .and_then(Attribute::as_symbol)
        .unwrap_or_else(|| Symbol::new(""))
}

/// Create a single-block region with the given block arguments.
fn single_block_region(ctx: &mut IrContext, location: Location, args: Vec<Type>) -> RegionRef {
    let block = ctx.create_block(BlockData::new(location, args));
    ctx.create_region(RegionData {
        location,
        blocks: smallvec![block],
        parent_op: None,
    })
}

fn first_block(ctx: &IrContext, op: OpRef) -> BlockRef {
    let region = ctx.op(op).regions[0];
    ctx.region(region).blocks[0]
}

// ============================================================================
// Program
// ============================================================================

/// Top-level container: the IR context plus its circuits, in creation order.
pub struct Program {
    pub ctx: IrContext,
    circuits: Vec<Circuit>,
}

impl Program {
    pub fn new() -> Self {
        Self {
            ctx: IrContext::new(),
            circuits: Vec::new(),
        }
    }

    /// Create a new, empty circuit.
    pub fn add_circuit(&mut self, name: Symbol, location: Location) -> Circuit {
        let region = single_block_region(&mut self.ctx, location, vec![]);
        let op = OperationDataBuilder::new(location, HwOp::Circuit)
            .attr(ATTR_SYM_NAME(), name)
            .region(region)
            .create(&mut self.ctx);
        let circuit = Circuit(op);
        self.circuits.push(circuit);
        circuit
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    /// Every module of every circuit, in circuit then module order.
    pub fn modules(&self) -> Vec<Module> {
        self.circuits
            .iter()
            .flat_map(|c| c.modules(&self.ctx))
            .collect()
    }

    /// Convenience for tests and builders: a location in a named file.
    pub fn location(&mut self, path: &str) -> Location {
        let path = self.ctx.paths.intern(path);
        Location::new(path, Default::default())
    }
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Circuit
// ============================================================================

/// View over an `hw.circuit` operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Circuit(OpRef);

impl Circuit {
    pub fn from_op(ctx: &IrContext, op: OpRef) -> Option<Self> {
        (ctx.op_kind(op) == OpKind::Hw(HwOp::Circuit)).then_some(Circuit(op))
    }

    pub fn op(self) -> OpRef {
        self.0
    }

    pub fn name(self, ctx: &IrContext) -> Symbol {
        sym_name(ctx, self.0)
    }

    pub fn body_block(self, ctx: &IrContext) -> BlockRef {
        first_block(ctx, self.0)
    }

    /// Modules in definition order.
    pub fn modules(self, ctx: &IrContext) -> Vec<Module> {
        ctx.block(self.body_block(ctx))
            .ops
            .iter()
            .filter_map(|&op| Module::from_op(ctx, op))
            .collect()
    }

    pub fn lookup(self, ctx: &IrContext, name: Symbol) -> Option<Module> {
        self.modules(ctx).into_iter().find(|m| m.name(ctx) == name)
    }

    /// The top module: the one named by the `top` attribute, or the first.
    pub fn top(self, ctx: &IrContext) -> Option<Module> {
        match ctx.op_attr(self.0, ATTR_TOP()).and_then(Attribute::as_symbol) {
            Some(name) => self.lookup(ctx, name),
            None => self.modules(ctx).into_iter().next(),
        }
    }

    pub fn set_top(self, ctx: &mut IrContext, name: Symbol) {
        ctx.op_mut(self.0)
            .attributes
            .insert(ATTR_TOP(), Attribute::Symbol(name));
    }

    /// Define a module with the given input port types.
    pub fn add_module(
        self,
        ctx: &mut IrContext,
        name: Symbol,
        kind: ModuleKind,
        ports: Vec<Type>,
        location: Location,
    ) -> Result<Module, ModuleNameConflict> {
        if self.lookup(ctx, name).is_some() {
            return Err(ModuleNameConflict {
                circuit: self.name(ctx),
                module: name,
            });
        }
        let region = single_block_region(ctx, location, ports);
        let op = OperationDataBuilder::new(location, HwOp::Module(kind))
            .attr(ATTR_SYM_NAME(), name)
            .region(region)
            .create(ctx);
        let block = self.body_block(ctx);
        ctx.push_op(block, op);
        Ok(Module(op))
    }
}

// ============================================================================
// Module
// ============================================================================

/// View over an `hw.module` operation of any kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Module(OpRef);

impl Module {
    pub fn from_op(ctx: &IrContext, op: OpRef) -> Option<Self> {
        ctx.op_kind(op).is_module().then_some(Module(op))
    }

    pub fn op(self) -> OpRef {
        self.0
    }

    pub fn name(self, ctx: &IrContext) -> Symbol {
        sym_name(ctx, self.0)
    }

    pub fn kind(self, ctx: &IrContext) -> ModuleKind {
        match ctx.op_kind(self.0) {
            OpKind::Hw(HwOp::Module(kind)) => kind,
            other => unreachable!("module view over `{other}`"),
        }
    }

    /// Change the module kind, e.g. after lowering to hardware.
    pub fn set_kind(self, ctx: &mut IrContext, kind: ModuleKind) {
        ctx.op_mut(self.0).kind = OpKind::Hw(HwOp::Module(kind));
    }

    pub fn circuit(self, ctx: &IrContext) -> Option<Circuit> {
        let parent = ctx.parent_op(self.0)?;
        Circuit::from_op(ctx, parent)
    }

    pub fn body(self, ctx: &IrContext) -> RegionRef {
        ctx.op(self.0).regions[0]
    }

    pub fn body_block(self, ctx: &IrContext) -> BlockRef {
        first_block(ctx, self.0)
    }

    /// Input port values.
    pub fn ports(self, ctx: &IrContext) -> &[ValueRef] {
        ctx.block_args(self.body_block(ctx))
    }

    /// Top-level operations of the body, in order.
    pub fn ops(self, ctx: &IrContext) -> Vec<OpRef> {
        ctx.block(self.body_block(ctx)).ops.to_vec()
    }

    /// Append an operation to the end of the body.
    pub fn append(self, ctx: &mut IrContext, op: OpRef) {
        let block = self.body_block(ctx);
        ctx.push_op(block, op);
    }

    /// Every instance in the body, including nested regions.
    pub fn instances(self, ctx: &IrContext) -> Vec<hw::Instance> {
        let mut found = Vec::new();
        let _ = walk_region::<()>(ctx, self.body(ctx), &mut |op| {
            if let Ok(inst) = hw::Instance::from_op(ctx, op) {
                found.push(inst);
            }
            ControlFlow::Continue(WalkAction::Advance)
        });
        found
    }

    /// Number of operations in the body, including nested regions.
    pub fn op_count(self, ctx: &IrContext) -> usize {
        let mut count = 0;
        let _ = walk_region::<()>(ctx, self.body(ctx), &mut |_| {
            count += 1;
            ControlFlow::Continue(WalkAction::Advance)
        });
        count
    }

    pub fn layer(self, ctx: &IrContext) -> Option<Symbol> {
        ctx.op_attr(self.0, ATTR_LAYER()).and_then(Attribute::as_symbol)
    }

    pub fn set_layer(self, ctx: &mut IrContext, layer: Symbol) {
        ctx.op_mut(self.0)
            .attributes
            .insert(ATTR_LAYER(), Attribute::Symbol(layer));
    }

    pub fn is_companion(self, ctx: &IrContext) -> bool {
        ctx.op_attr(self.0, ATTR_COMPANION()).is_some()
    }

    pub fn mark_companion(self, ctx: &mut IrContext) {
        ctx.op_mut(self.0)
            .attributes
            .insert(ATTR_COMPANION(), Attribute::Unit);
    }
}
