//! Where in the IR hierarchy a pass runs.
//!
//! A scope is a nesting path from the program root: optionally into every
//! circuit, then optionally into every module matching a filter. All four
//! combinations are meaningful:
//!
//! | scope                     | runs                                  |
//! |---------------------------|---------------------------------------|
//! | `program`                 | once over the whole program           |
//! | `circuit`                 | once per circuit                      |
//! | `circuit(module<design>)` | once per design module, per circuit   |
//! | `module<hardware>`        | once per hardware module, any circuit |

use std::fmt;

use ferrite_ir::ModuleKind;
use serde::{Deserialize, Serialize};

/// Which modules a module-level scope selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFilter {
    Any,
    Kind(ModuleKind),
}

impl ModuleFilter {
    pub fn matches(self, kind: ModuleKind) -> bool {
        match self {
            ModuleFilter::Any => true,
            ModuleFilter::Kind(k) => k == kind,
        }
    }
}

impl fmt::Display for ModuleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFilter::Any => f.write_str("any"),
            ModuleFilter::Kind(kind) => write!(f, "module<{kind}>"),
        }
    }
}

/// How many times, and on what, a pass body is invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Granularity {
    Program,
    Circuit,
    Module(ModuleFilter),
}

/// Nesting path of a pipeline entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    within_circuit: bool,
    module: Option<ModuleFilter>,
}

impl Scope {
    pub const PROGRAM: Scope = Scope {
        within_circuit: false,
        module: None,
    };

    pub const CIRCUIT: Scope = Scope {
        within_circuit: true,
        module: None,
    };

    /// `circuit(module<kind>)`
    pub const fn circuit_modules(kind: ModuleKind) -> Scope {
        Scope::CIRCUIT.nest_module(ModuleFilter::Kind(kind))
    }

    /// `circuit(any)`
    pub const fn circuit_any() -> Scope {
        Scope::CIRCUIT.nest_module(ModuleFilter::Any)
    }

    /// `module<kind>`, across every circuit.
    pub const fn modules(kind: ModuleKind) -> Scope {
        Scope::PROGRAM.nest_module(ModuleFilter::Kind(kind))
    }

    /// `any`, across every circuit.
    pub const fn any_module() -> Scope {
        Scope::PROGRAM.nest_module(ModuleFilter::Any)
    }

    /// Descend into every circuit.
    ///
    /// # Panics
    ///
    /// Panics if the scope already selects modules or circuits.
    pub const fn nest_circuit(self) -> Scope {
        assert!(
            !self.within_circuit && self.module.is_none(),
            "circuits only nest directly under the program"
        );
        Scope {
            within_circuit: true,
            module: None,
        }
    }

    /// Descend into the modules matching `filter`.
    ///
    /// # Panics
    ///
    /// Panics if the scope already selects modules.
    pub const fn nest_module(self, filter: ModuleFilter) -> Scope {
        assert!(self.module.is_none(), "modules do not nest");
        Scope {
            within_circuit: self.within_circuit,
            module: Some(filter),
        }
    }

    pub fn granularity(self) -> Granularity {
        match (self.within_circuit, self.module) {
            (_, Some(filter)) => Granularity::Module(filter),
            (true, None) => Granularity::Circuit,
            (false, None) => Granularity::Program,
        }
    }

    pub fn module_filter(self) -> Option<ModuleFilter> {
        self.module
    }

    /// Render `pass` nested inside this scope, e.g. `circuit(module<design>(cse))`.
    pub fn wrap(self, pass: &impl fmt::Display) -> String {
        let mut text = pass.to_string();
        if let Some(filter) = self.module {
            text = format!("{filter}({text})");
        }
        if self.within_circuit {
            text = format!("circuit({text})");
        }
        text
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.within_circuit, self.module) {
            (false, None) => f.write_str("program"),
            (true, None) => f.write_str("circuit"),
            (true, Some(filter)) => write!(f, "circuit({filter})"),
            (false, Some(filter)) => write!(f, "{filter}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_composes() {
        let scope = Scope::PROGRAM
            .nest_circuit()
            .nest_module(ModuleFilter::Kind(ModuleKind::Design));
        assert_eq!(scope, Scope::circuit_modules(ModuleKind::Design));
        assert_eq!(scope.to_string(), "circuit(module<design>)");
        assert_eq!(scope.wrap(&"cse"), "circuit(module<design>(cse))");
        assert_eq!(
            scope.granularity(),
            Granularity::Module(ModuleFilter::Kind(ModuleKind::Design))
        );
    }

    #[test]
    fn top_level_scopes() {
        assert_eq!(Scope::PROGRAM.wrap(&"symbol-dce"), "symbol-dce");
        assert_eq!(Scope::CIRCUIT.granularity(), Granularity::Circuit);
        assert_eq!(Scope::any_module().wrap(&"strip-contracts"), "any(strip-contracts)");
        assert_eq!(Scope::circuit_any().to_string(), "circuit(any)");
        assert_eq!(
            Scope::modules(ModuleKind::Hardware).to_string(),
            "module<hardware>"
        );
    }

    #[test]
    fn filter_matching() {
        assert!(ModuleFilter::Any.matches(ModuleKind::Class));
        assert!(ModuleFilter::Kind(ModuleKind::External).matches(ModuleKind::External));
        assert!(!ModuleFilter::Kind(ModuleKind::Design).matches(ModuleKind::Class));
    }

    #[test]
    #[should_panic(expected = "modules do not nest")]
    fn modules_do_not_nest() {
        let _ = Scope::any_module().nest_module(ModuleFilter::Any);
    }
}
