//! Storage for every circuit, module and operation of a design.
//!
//! Entities live in `PrimaryMap`s keyed by the handles in [`crate::refs`];
//! operand and result lists share one `ListPool`. The context keeps use
//! chains current on every mutation, so passes can ask who reads a value
//! without walking the design.

use std::collections::BTreeMap;

use cranelift_entity::{EntityList, ListPool, PrimaryMap, SecondaryMap};
use smallvec::SmallVec;

use crate::dialect::OpKind;
use crate::location::{Location, PathInterner};
use crate::refs::*;
use crate::symbol::Symbol;
use crate::types::{Attribute, Type};

/// One read of a value: operand `operand_index` of `user`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Use {
    pub user: OpRef,
    pub operand_index: u32,
}

/// An operation as stored in the context. Built with [`OperationDataBuilder`].
pub struct OperationData {
    pub location: Location,
    pub kind: OpKind,
    pub operands: EntityList<ValueRef>,
    pub results: SmallVec<[Type; 2]>,
    pub attributes: BTreeMap<Symbol, Attribute>,
    pub regions: SmallVec<[RegionRef; 2]>,
    pub parent_block: Option<BlockRef>,
}

struct ValueData {
    def: ValueDef,
    ty: Type,
}

/// A straight-line list of operations. Module ports are its arguments.
pub struct BlockData {
    pub location: Location,
    pub args: Vec<Type>,
    pub ops: SmallVec<[OpRef; 8]>,
    pub parent_region: Option<RegionRef>,
}

impl BlockData {
    pub fn new(location: Location, args: Vec<Type>) -> Self {
        Self {
            location,
            args,
            ops: SmallVec::new(),
            parent_region: None,
        }
    }
}

/// The body of a circuit, module or clocked property.
pub struct RegionData {
    pub location: Location,
    pub blocks: SmallVec<[BlockRef; 2]>,
    pub parent_op: Option<OpRef>,
}

#[derive(Default)]
pub struct IrContext {
    ops: PrimaryMap<OpRef, OperationData>,
    values: PrimaryMap<ValueRef, ValueData>,
    blocks: PrimaryMap<BlockRef, BlockData>,
    regions: PrimaryMap<RegionRef, RegionData>,
    uses: SecondaryMap<ValueRef, SmallVec<[Use; 2]>>,
    value_pool: ListPool<ValueRef>,
    results: SecondaryMap<OpRef, EntityList<ValueRef>>,
    block_args: SecondaryMap<BlockRef, EntityList<ValueRef>>,

    /// Source files referenced by locations.
    pub paths: PathInterner,
}

impl IrContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a detached operation, hooks its operands into the use
    /// chains and allocates one value per result type.
    ///
    /// # Panics
    ///
    /// Panics if `data` is already placed in a block or one of its regions
    /// is owned by another operation.
    fn insert_op(&mut self, data: OperationData) -> OpRef {
        assert!(
            data.parent_block.is_none(),
            "operation data must be detached when inserted; place it with push_op",
        );

        let operands: SmallVec<[ValueRef; 8]> = data.operands.as_slice(&self.value_pool).into();
        let result_types = data.results.clone();
        let regions = data.regions.clone();
        let op = self.ops.push(data);

        for r in regions {
            if let Some(owner) = self.regions[r].parent_op {
                panic!("{r} is already the body of {owner}, cannot attach it to {op}");
            }
            self.regions[r].parent_op = Some(op);
        }

        for (idx, val) in operands.into_iter().enumerate() {
            self.uses[val].push(Use {
                user: op,
                operand_index: idx as u32,
            });
        }

        let mut results = EntityList::new();
        for (idx, ty) in result_types.into_iter().enumerate() {
            let def = ValueDef::OpResult(op, idx as u32);
            results.push(self.values.push(ValueData { def, ty }), &mut self.value_pool);
        }
        self.results[op] = results;
        op
    }

    pub fn op(&self, op: OpRef) -> &OperationData {
        &self.ops[op]
    }

    /// Mutable access for attribute and location edits. Operand edits made
    /// here bypass the use chains; go through [`IrContext::replace_all_uses`].
    pub fn op_mut(&mut self, op: OpRef) -> &mut OperationData {
        &mut self.ops[op]
    }

    pub fn op_kind(&self, op: OpRef) -> OpKind {
        self.ops[op].kind
    }

    pub fn op_attr(&self, op: OpRef, key: Symbol) -> Option<&Attribute> {
        self.ops[op].attributes.get(&key)
    }

    pub fn op_operands(&self, op: OpRef) -> &[ValueRef] {
        self.ops[op].operands.as_slice(&self.value_pool)
    }

    pub fn op_result_types(&self, op: OpRef) -> &[Type] {
        &self.ops[op].results
    }

    pub fn op_result(&self, op: OpRef, index: u32) -> ValueRef {
        self.op_results(op)[index as usize]
    }

    pub fn op_results(&self, op: OpRef) -> &[ValueRef] {
        self.results[op].as_slice(&self.value_pool)
    }

    /// Takes `op` out of its block and drops its operand uses.
    ///
    /// # Panics
    ///
    /// Panics if a result of `op` is still read somewhere.
    pub fn erase_op(&mut self, op: OpRef) {
        if let Some(block) = self.ops[op].parent_block.take() {
            self.blocks[block].ops.retain(|o| *o != op);
        }

        for &val in self.op_results(op) {
            let readers = self.uses[val].len();
            assert!(
                readers == 0,
                "cannot erase {op}: result {val} still has {readers} reader(s)",
            );
        }

        let operands: SmallVec<[ValueRef; 8]> = self.op_operands(op).into();
        for (idx, val) in operands.into_iter().enumerate() {
            self.uses[val].retain(|u| !(u.user == op && u.operand_index == idx as u32));
        }
        self.ops[op].operands.clear(&mut self.value_pool);
    }

    pub fn is_attached(&self, op: OpRef) -> bool {
        self.ops[op].parent_block.is_some()
    }

    /// The operation whose region holds `op`: its module, circuit or clock.
    pub fn parent_op(&self, op: OpRef) -> Option<OpRef> {
        let block = self.ops[op].parent_block?;
        let region = self.blocks[block].parent_region?;
        self.regions[region].parent_op
    }

    pub fn value_ty(&self, v: ValueRef) -> Type {
        self.values[v].ty
    }

    pub fn value_def(&self, v: ValueRef) -> ValueDef {
        self.values[v].def
    }

    /// `None` for module ports and other block arguments.
    pub fn defining_op(&self, v: ValueRef) -> Option<OpRef> {
        match self.values[v].def {
            ValueDef::OpResult(op, _) => Some(op),
            ValueDef::BlockArg(..) => None,
        }
    }

    pub fn create_block(&mut self, data: BlockData) -> BlockRef {
        let arg_types = data.args.clone();
        let block = self.blocks.push(data);

        let mut args = EntityList::new();
        for (idx, ty) in arg_types.into_iter().enumerate() {
            let def = ValueDef::BlockArg(block, idx as u32);
            args.push(self.values.push(ValueData { def, ty }), &mut self.value_pool);
        }
        self.block_args[block] = args;
        block
    }

    pub fn block(&self, b: BlockRef) -> &BlockData {
        &self.blocks[b]
    }

    pub fn block_arg(&self, b: BlockRef, index: u32) -> ValueRef {
        self.block_args(b)[index as usize]
    }

    pub fn block_args(&self, b: BlockRef) -> &[ValueRef] {
        self.block_args[b].as_slice(&self.value_pool)
    }

    fn claim(&mut self, block: BlockRef, op: OpRef) {
        if let Some(current) = self.ops[op].parent_block {
            panic!("{op} is already placed in {current}, erase it before moving it to {block}");
        }
        self.ops[op].parent_block = Some(block);
    }

    /// # Panics
    ///
    /// Panics if `op` is already placed in a block.
    pub fn push_op(&mut self, block: BlockRef, op: OpRef) {
        self.claim(block, op);
        self.blocks[block].ops.push(op);
    }

    /// # Panics
    ///
    /// Panics if `op` is already placed, or `before` is not in `block`.
    pub fn insert_op_before(&mut self, block: BlockRef, before: OpRef, op: OpRef) {
        let Some(pos) = self.blocks[block].ops.iter().position(|&o| o == before) else {
            panic!("{before} is not in {block}");
        };
        self.claim(block, op);
        self.blocks[block].ops.insert(pos, op);
    }

    /// # Panics
    ///
    /// Panics if a block in `data` already belongs to another region.
    pub fn create_region(&mut self, data: RegionData) -> RegionRef {
        let blocks = data.blocks.clone();
        let region = self.regions.push(data);
        for b in blocks {
            if let Some(owner) = self.blocks[b].parent_region {
                panic!("{b} already belongs to region {owner}, cannot add it to {region}");
            }
            self.blocks[b].parent_region = Some(region);
        }
        region
    }

    pub fn region(&self, r: RegionRef) -> &RegionData {
        &self.regions[r]
    }

    pub fn uses(&self, v: ValueRef) -> &[Use] {
        &self.uses[v]
    }

    pub fn has_uses(&self, v: ValueRef) -> bool {
        !self.uses[v].is_empty()
    }

    /// True when nothing reads any result of `op`.
    pub fn results_unused(&self, op: OpRef) -> bool {
        self.op_results(op).iter().all(|&v| !self.has_uses(v))
    }

    /// Points every reader of `old` at `new`.
    pub fn replace_all_uses(&mut self, old: ValueRef, new: ValueRef) {
        if old == new {
            return;
        }
        for u in std::mem::take(&mut self.uses[old]) {
            let slice = self.ops[u.user].operands.as_mut_slice(&mut self.value_pool);
            debug_assert_eq!(slice[u.operand_index as usize], old);
            slice[u.operand_index as usize] = new;
            self.uses[new].push(u);
        }
    }
}

/// Collects the pieces of an operation before it is inserted into a context.
pub struct OperationDataBuilder {
    location: Location,
    kind: OpKind,
    operands: Vec<ValueRef>,
    results: SmallVec<[Type; 2]>,
    attributes: BTreeMap<Symbol, Attribute>,
    regions: SmallVec<[RegionRef; 2]>,
}

impl OperationDataBuilder {
    pub fn new(location: Location, kind: impl Into<OpKind>) -> Self {
        Self {
            location,
            kind: kind.into(),
            operands: Vec::new(),
            results: SmallVec::new(),
            attributes: BTreeMap::new(),
            regions: SmallVec::new(),
        }
    }

    pub fn operand(mut self, v: ValueRef) -> Self {
        self.operands.push(v);
        self
    }

    pub fn operands(mut self, vs: impl IntoIterator<Item = ValueRef>) -> Self {
        self.operands.extend(vs);
        self
    }

    pub fn result(mut self, ty: Type) -> Self {
        self.results.push(ty);
        self
    }

    pub fn results(mut self, tys: impl IntoIterator<Item = Type>) -> Self {
        self.results.extend(tys);
        self
    }

    pub fn attr(mut self, key: impl Into<Symbol>, val: impl Into<Attribute>) -> Self {
        self.attributes.insert(key.into(), val.into());
        self
    }

    /// Skips the attribute when `val` is `None`, e.g. an unbounded repeat.
    pub fn attr_opt(self, key: impl Into<Symbol>, val: Option<impl Into<Attribute>>) -> Self {
        match val {
            Some(val) => self.attr(key, val),
            None => self,
        }
    }

    pub fn region(mut self, r: RegionRef) -> Self {
        self.regions.push(r);
        self
    }

    pub fn build(self, ctx: &mut IrContext) -> OperationData {
        let operands = EntityList::from_iter(self.operands, &mut ctx.value_pool);
        OperationData {
            location: self.location,
            kind: self.kind,
            operands,
            results: self.results,
            attributes: self.attributes,
            regions: self.regions,
            parent_block: None,
        }
    }

    /// Builds the operation and inserts it, detached, into `ctx`.
    pub fn create(self, ctx: &mut IrContext) -> OpRef {
        let data = self.build(ctx);
        ctx.insert_op(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CombOp, HwOp};
    use crate::location::Span;
    use smallvec::smallvec;

    fn test_location(ctx: &mut IrContext) -> Location {
        let path = ctx.paths.intern("test.fir");
        Location::new(path, Span::new(0, 0))
    }

    fn constant(ctx: &mut IrContext, loc: Location, value: u64) -> OpRef {
        OperationDataBuilder::new(loc, HwOp::Constant)
            .result(Type::bool())
            .attr("value", value)
            .create(ctx)
    }

    #[test]
    fn create_op_and_read_back() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let op = constant(&mut ctx, loc, 1);

        assert_eq!(ctx.op_kind(op), OpKind::Hw(HwOp::Constant));
        assert_eq!(ctx.op_result_types(op), &[Type::bool()]);
        assert_eq!(
            ctx.op_attr(op, Symbol::new("value")),
            Some(&Attribute::IntBits(1))
        );
        assert_eq!(ctx.value_def(ctx.op_result(op, 0)), ValueDef::OpResult(op, 0));
    }

    #[test]
    fn block_args() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let block = ctx.create_block(BlockData::new(loc, vec![Type::bool(), Type::Clock]));

        let args = ctx.block_args(block);
        assert_eq!(args.len(), 2);
        let a1 = ctx.block_arg(block, 1);
        assert_eq!(ctx.value_ty(a1), Type::Clock);
        assert_eq!(ctx.value_def(a1), ValueDef::BlockArg(block, 1));
        assert_eq!(ctx.defining_op(a1), None);
    }

    #[test]
    fn use_chain_tracking() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let c = constant(&mut ctx, loc, 1);
        let v = ctx.op_result(c, 0);
        assert!(!ctx.has_uses(v));

        let and = OperationDataBuilder::new(loc, CombOp::And)
            .operands([v, v])
            .result(Type::bool())
            .create(&mut ctx);

        let uses = ctx.uses(v);
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].user, and);
        assert_eq!(uses[1].operand_index, 1);
    }

    #[test]
    fn rauw() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let old_op = constant(&mut ctx, loc, 0);
        let new_op = constant(&mut ctx, loc, 1);
        let v_old = ctx.op_result(old_op, 0);
        let v_new = ctx.op_result(new_op, 0);

        let user = OperationDataBuilder::new(loc, CombOp::Or)
            .operands([v_old, v_old])
            .result(Type::bool())
            .create(&mut ctx);

        ctx.replace_all_uses(v_old, v_new);

        assert!(!ctx.has_uses(v_old));
        assert_eq!(ctx.uses(v_new).len(), 2);
        assert_eq!(ctx.op_operands(user), &[v_new, v_new]);
    }

    #[test]
    fn insert_and_erase() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let block = ctx.create_block(BlockData::new(loc, vec![]));

        let a = constant(&mut ctx, loc, 0);
        let c = constant(&mut ctx, loc, 1);
        ctx.push_op(block, a);
        ctx.push_op(block, c);
        let b = constant(&mut ctx, loc, 1);
        ctx.insert_op_before(block, c, b);
        assert_eq!(ctx.block(block).ops.as_slice(), &[a, b, c]);

        ctx.erase_op(b);
        assert_eq!(ctx.block(block).ops.as_slice(), &[a, c]);
        assert!(!ctx.is_attached(b));
    }

    #[test]
    fn parent_op_follows_region_nesting() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let block = ctx.create_block(BlockData::new(loc, vec![]));
        let inner = constant(&mut ctx, loc, 0);
        ctx.push_op(block, inner);
        let region = ctx.create_region(RegionData {
            location: loc,
            blocks: smallvec![block],
            parent_op: None,
        });
        let outer = OperationDataBuilder::new(loc, HwOp::Circuit)
            .region(region)
            .create(&mut ctx);

        assert_eq!(ctx.region(region).parent_op, Some(outer));
        assert_eq!(ctx.parent_op(inner), Some(outer));
    }

    #[test]
    #[should_panic(expected = "still has")]
    fn erase_op_panics_when_result_has_uses() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let c = constant(&mut ctx, loc, 1);
        let v = ctx.op_result(c, 0);
        let _user = OperationDataBuilder::new(loc, CombOp::Xor)
            .operands([v, v])
            .result(Type::bool())
            .create(&mut ctx);

        ctx.erase_op(c);
    }

    #[test]
    #[should_panic(expected = "already belongs to region")]
    fn create_region_panics_when_block_already_owned() {
        let mut ctx = IrContext::new();
        let loc = test_location(&mut ctx);
        let block = ctx.create_block(BlockData::new(loc, vec![]));
        let _r1 = ctx.create_region(RegionData {
            location: loc,
            blocks: smallvec![block],
            parent_op: None,
        });
        ctx.create_region(RegionData {
            location: loc,
            blocks: smallvec![block],
            parent_op: None,
        });
    }
}
