//! Ferrite IR crate.
//!
//! Arena-based hierarchical IR for the ferrite hardware compiler: programs
//! own circuits, circuits own modules, modules own operations. Also home to
//! the rewrite engine that keeps temporal expressions canonical.

// === IR storage ===
pub mod context;
pub mod location;
pub mod refs;
pub mod symbol;
pub mod types;

// === Operations ===
pub mod dialect;
pub mod program;

// === IR infrastructure ===
pub mod printer;
pub mod rewrite;
pub mod validation;
pub mod walk;

// Re-export smallvec for use in macros and external crates
pub use smallvec;

pub use context::{BlockData, IrContext, OperationData, OperationDataBuilder, RegionData, Use};
pub use dialect::{ConversionError, DialectOp, ModuleKind, OpKind};
pub use location::{Location, PathInterner, Span};
pub use program::{Circuit, Module, ModuleNameConflict, Program};
pub use refs::{BlockRef, OpRef, PathRef, RegionRef, ValueDef, ValueRef};
pub use symbol::Symbol;
pub use types::{Attribute, Type};
pub use validation::{ValidationResult, validate_program};
pub use walk::WalkAction;
