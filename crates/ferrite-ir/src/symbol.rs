//! Interned names.

use std::borrow::Cow;
use std::sync::LazyLock;

use lasso::{Rodeo, Spur};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

static NAMES: LazyLock<RwLock<Rodeo>> = LazyLock::new(|| RwLock::new(Rodeo::default()));

/// A module, instance, attribute or layer name. Equality is a key compare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    pub fn new(text: &'static str) -> Self {
        Self::lookup_or(text, |names| names.get_or_intern_static(text))
    }

    /// For names read from input, such as a circuit's modules.
    pub fn from_dynamic(text: &str) -> Self {
        Self::lookup_or(text, |names| names.get_or_intern(text))
    }

    fn lookup_or(text: &str, intern: impl FnOnce(&mut Rodeo) -> Spur) -> Self {
        let names = NAMES.upgradable_read();
        match names.get(text) {
            Some(key) => Symbol(key),
            None => Symbol(intern(&mut RwLockUpgradableReadGuard::upgrade(names))),
        }
    }

    /// Runs `f` on the name under a recursive read lock, so `f` may itself
    /// format or compare symbols.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        f(NAMES.read_recursive().resolve(&self.0))
    }
}

impl From<&'static str> for Symbol {
    fn from(text: &'static str) -> Self {
        Symbol::new(text)
    }
}

impl From<Cow<'_, str>> for Symbol {
    fn from(text: Cow<'_, str>) -> Self {
        Symbol::from_dynamic(&text)
    }
}

/// Declares one accessor function per well-known name.
///
/// # Example
/// ```
/// use ferrite_ir::symbols;
///
/// symbols! {
///     ATTR_TOP => "top",
///     #[allow(dead_code)]
///     ATTR_UNUSED => "unused",
/// }
///
/// assert_eq!(ATTR_TOP(), "top");
/// ```
#[macro_export]
macro_rules! symbols {
    ($($(#[$attr:meta])* $name:ident => $text:literal),* $(,)?) => {
        $(
            $(#[$attr])*
            #[allow(non_snake_case)]
            #[inline]
            pub fn $name() -> $crate::Symbol {
                $crate::Symbol::new($text)
            }
        )*
    };
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|s| s == other)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.with_str(|s| s == *other)
    }
}

impl PartialEq<Symbol> for &str {
    fn eq(&self, other: &Symbol) -> bool {
        other.with_str(|s| s == *self)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_str(|s| f.write_str(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        let a = Symbol::new("Top");
        let b = Symbol::from_dynamic(&String::from("Top"));
        assert_eq!(a, b);
        assert_ne!(a, Symbol::new("Other"));
    }

    #[test]
    fn compares_with_str() {
        let s = Symbol::new("EICG_wrapper");
        assert!(s == "EICG_wrapper");
        assert_eq!(s.to_string(), "EICG_wrapper");
    }
}
