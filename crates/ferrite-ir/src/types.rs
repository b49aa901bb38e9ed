//! Types and attributes.

use std::fmt;

use crate::location::Location;
use crate::symbol::Symbol;

// ============================================================================
// Type
// ============================================================================

/// The closed set of value types.
///
/// `Int(1)` doubles as the boolean type. `Sequence` and `Property` are the
/// temporal types consumed and produced by the `ltl` dialect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int(u32),
    Clock,
    Sequence,
    Property,
}

impl Type {
    /// The one-bit boolean type.
    pub const fn bool() -> Self {
        Type::Int(1)
    }

    pub fn is_property(self) -> bool {
        matches!(self, Type::Property)
    }

    pub fn is_bool(self) -> bool {
        matches!(self, Type::Int(1))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int(width) => write!(f, "i{width}"),
            Type::Clock => f.write_str("seq.clock"),
            Type::Sequence => f.write_str("ltl.sequence"),
            Type::Property => f.write_str("ltl.property"),
        }
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// Immutable attribute values attached to operations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Unit/marker value.
    Unit,
    Bool(bool),
    /// Integer constant stored as raw bits (signless).
    IntBits(u64),
    String(String),
    /// Single interned symbol.
    Symbol(Symbol),
    /// List of attributes.
    List(Vec<Attribute>),
    /// Full source location.
    Location(Location),
}

impl Attribute {
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Attribute::IntBits(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Attribute::Symbol(s) => Some(*s),
            _ => None,
        }
    }
}

impl From<u64> for Attribute {
    fn from(value: u64) -> Self {
        Attribute::IntBits(value)
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<Symbol> for Attribute {
    fn from(value: Symbol) -> Self {
        Attribute::Symbol(value)
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::String(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl From<Location> for Attribute {
    fn from(value: Location) -> Self {
        Attribute::Location(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_display() {
        assert_eq!(Type::bool().to_string(), "i1");
        assert_eq!(Type::Int(8).to_string(), "i8");
        assert_eq!(Type::Sequence.to_string(), "ltl.sequence");
        assert_eq!(Type::Property.to_string(), "ltl.property");
    }

    #[test]
    fn attribute_accessors() {
        assert_eq!(Attribute::from(3u64).as_int(), Some(3));
        assert_eq!(Attribute::from("x").as_int(), None);
        assert_eq!(
            Attribute::from(Symbol::new("Top")).as_symbol(),
            Some(Symbol::new("Top"))
        );
    }

    #[test]
    fn list_attributes_nest() {
        let inner = Attribute::List(vec![Attribute::from(1u64), Attribute::Unit]);
        let outer = Attribute::List(vec![inner.clone(), Attribute::from("a")]);
        match &outer {
            Attribute::List(items) => assert_eq!(items[0], inner),
            other => panic!("expected a list, got {other:?}"),
        }
        assert_ne!(outer, inner);
    }
}
