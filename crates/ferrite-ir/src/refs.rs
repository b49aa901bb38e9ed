//! Typed handles into [`crate::IrContext`] storage.

use cranelift_entity::entity_impl;
use std::fmt;

/// A hardware, combinational, temporal or verification operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpRef(u32);
entity_impl!(OpRef, "op");

/// A wire: an operation result or a module port.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueRef(u32);
entity_impl!(ValueRef, "v");

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockRef(u32);
entity_impl!(BlockRef, "block");

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionRef(u32);
entity_impl!(RegionRef, "region");

/// A source file name held by [`crate::location::PathInterner`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathRef(u32);
entity_impl!(PathRef, "path");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueDef {
    /// Result `n` of an operation.
    OpResult(OpRef, u32),
    /// Argument `n` of a block; for a module body this is port `n`.
    BlockArg(BlockRef, u32),
}

impl fmt::Display for ValueDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ValueDef::OpResult(op, n) => write!(f, "{op}.result{n}"),
            ValueDef::BlockArg(block, n) => write!(f, "{block}.arg{n}"),
        }
    }
}
