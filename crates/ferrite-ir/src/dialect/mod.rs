//! The closed operation set.
//!
//! Four dialects make up the IR: `hw` (structure), `comb` (boolean logic),
//! `ltl` (temporal sequences and properties) and `verif` (assertions).
//! Each dialect module defines its typed wrappers and builder functions.

use std::fmt;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use crate::context::IrContext;
use crate::refs::{OpRef, ValueRef};

pub mod comb;
pub mod hw;
pub mod ltl;
pub mod verif;

pub use ltl::canonicalization_patterns;

// ============================================================================
// OpKind
// ============================================================================

/// Kind of module, used by scope filters to select where a pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Hardware module in the high-level representation.
    Design,
    /// Module declared outside the circuit.
    External,
    /// Non-hardware object model class.
    Class,
    /// Module after lowering to the structural representation.
    Hardware,
}

impl ModuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Design => "design",
            ModuleKind::External => "extern",
            ModuleKind::Class => "class",
            ModuleKind::Hardware => "hardware",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HwOp {
    Circuit,
    Module(ModuleKind),
    Instance,
    Constant,
    Output,
    Wire,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombOp {
    And,
    Or,
    Xor,
    Mux,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LtlOp {
    Delay,
    Concat,
    Repeat,
    Disable,
    CastToProp,
    Not,
    And,
    Or,
    Implication,
    Eventually,
    Until,
    Clock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerifOp {
    Assert,
    Assume,
    Cover,
}

/// Operation kind: dialect plus operation name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, derive_more::From)]
pub enum OpKind {
    Hw(HwOp),
    Comb(CombOp),
    Ltl(LtlOp),
    Verif(VerifOp),
}

impl OpKind {
    pub fn dialect(self) -> &'static str {
        match self {
            OpKind::Hw(_) => "hw",
            OpKind::Comb(_) => "comb",
            OpKind::Ltl(_) => "ltl",
            OpKind::Verif(_) => "verif",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OpKind::Hw(op) => match op {
                HwOp::Circuit => "circuit",
                HwOp::Module(_) => "module",
                HwOp::Instance => "instance",
                HwOp::Constant => "constant",
                HwOp::Output => "output",
                HwOp::Wire => "wire",
            },
            OpKind::Comb(op) => match op {
                CombOp::And => "and",
                CombOp::Or => "or",
                CombOp::Xor => "xor",
                CombOp::Mux => "mux",
            },
            OpKind::Ltl(op) => match op {
                LtlOp::Delay => "delay",
                LtlOp::Concat => "concat",
                LtlOp::Repeat => "repeat",
                LtlOp::Disable => "disable",
                LtlOp::CastToProp => "cast_to_prop",
                LtlOp::Not => "not",
                LtlOp::And => "and",
                LtlOp::Or => "or",
                LtlOp::Implication => "implication",
                LtlOp::Eventually => "eventually",
                LtlOp::Until => "until",
                LtlOp::Clock => "clock",
            },
            OpKind::Verif(op) => match op {
                VerifOp::Assert => "assert",
                VerifOp::Assume => "assume",
                VerifOp::Cover => "cover",
            },
        }
    }

    /// Side-effect-free kinds. Unused pure operations may be erased.
    pub fn is_pure(self) -> bool {
        match self {
            OpKind::Comb(_) | OpKind::Ltl(_) => true,
            OpKind::Hw(HwOp::Constant) => true,
            OpKind::Hw(_) | OpKind::Verif(_) => false,
        }
    }

    pub fn is_module(self) -> bool {
        matches!(self, OpKind::Hw(HwOp::Module(_)))
    }

    pub fn module_kind(self) -> Option<ModuleKind> {
        match self {
            OpKind::Hw(HwOp::Module(kind)) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dialect(), self.name())
    }
}

// ============================================================================
// Typed wrappers
// ============================================================================

/// Error returned when a generic operation does not match a typed wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum ConversionError {
    #[display("expected `{expected}`, found `{actual}`")]
    WrongOperation { expected: OpKind, actual: OpKind },
    #[display("`{kind}` expects at least {expected} operand(s), found {actual}")]
    MissingOperand {
        kind: OpKind,
        expected: usize,
        actual: usize,
    },
}

/// Trait for typed dialect operation wrappers.
pub trait DialectOp: Sized + Copy {
    const KIND: OpKind;
    /// Number of fixed operands accessed by index.
    const MIN_OPERANDS: usize;

    #[doc(hidden)]
    fn wrap_unchecked(op: OpRef) -> Self;

    fn op_ref(&self) -> OpRef;

    fn matches(ctx: &IrContext, op: OpRef) -> bool {
        ctx.op_kind(op) == Self::KIND
    }

    fn from_op(ctx: &IrContext, op: OpRef) -> Result<Self, ConversionError> {
        let actual = ctx.op_kind(op);
        if actual != Self::KIND {
            return Err(ConversionError::WrongOperation {
                expected: Self::KIND,
                actual,
            });
        }
        let operands = ctx.op_operands(op).len();
        if operands < Self::MIN_OPERANDS {
            return Err(ConversionError::MissingOperand {
                kind: actual,
                expected: Self::MIN_OPERANDS,
                actual: operands,
            });
        }
        Ok(Self::wrap_unchecked(op))
    }

    /// The first result value.
    fn result(&self, ctx: &IrContext) -> ValueRef {
        ctx.op_result(self.op_ref(), 0)
    }
}

/// Declare a typed wrapper with named accessors for fixed operand positions.
macro_rules! typed_op {
    ($(#[$meta:meta])* $name:ident = $kind:expr $(; $($acc:ident: $idx:literal),* $(,)?)?) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name($crate::refs::OpRef);

        impl $crate::dialect::DialectOp for $name {
            const KIND: $crate::dialect::OpKind = $kind;
            const MIN_OPERANDS: usize = <[usize]>::len(&[$($($idx),*)?]);

            fn wrap_unchecked(op: $crate::refs::OpRef) -> Self {
                Self(op)
            }

            fn op_ref(&self) -> $crate::refs::OpRef {
                self.0
            }
        }

        #[allow(dead_code)]
        impl $name {
            $($(
                pub fn $acc(&self, ctx: &$crate::context::IrContext) -> $crate::refs::ValueRef {
                    ctx.op_operands(self.0)[$idx]
                }
            )*)?

            pub fn operands<'a>(&self, ctx: &'a $crate::context::IrContext) -> &'a [$crate::refs::ValueRef] {
                ctx.op_operands(self.0)
            }
        }
    };
}
pub(crate) use typed_op;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(OpKind::from(LtlOp::Delay).to_string(), "ltl.delay");
        assert_eq!(OpKind::from(CombOp::Mux).to_string(), "comb.mux");
        assert_eq!(
            OpKind::from(HwOp::Module(ModuleKind::Class)).to_string(),
            "hw.module"
        );
    }

    #[test]
    fn purity() {
        assert!(OpKind::from(LtlOp::Until).is_pure());
        assert!(OpKind::from(HwOp::Constant).is_pure());
        assert!(!OpKind::from(HwOp::Wire).is_pure());
        assert!(!OpKind::from(VerifOp::Assert).is_pure());
    }
}
