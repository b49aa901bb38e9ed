//! Ferrite pass pipeline.
//!
//! Turns a [`Configuration`] into an ordered, staged [`Pipeline`] of passes,
//! checks it against the declared ordering rules, and runs it over a
//! [`ferrite_ir::Program`].

// === Pipeline description ===
pub mod config;
pub mod pass;
pub mod pipeline;
pub mod scope;

// === Checking and execution ===
pub mod constraints;
pub mod diagnostic;
pub mod error;
pub mod runner;

// === Built-in pass bodies ===
pub mod canonicalize;
pub mod check_recursive_instantiation;
pub mod cse;

pub use config::{
    BuildMode, ClockGateOptions, CompanionMode, Configuration, DebugInfoFilter, EmitTarget,
    PreserveAggregate, PreserveValues, RandomKind, ReadEnableMode, SymbolicValueLowering,
    VerificationFlavor,
};
pub use constraints::verify_pipeline;
pub use diagnostic::{Diagnostic, DiagnosticSeverity};
pub use error::{ConfigError, ConfigErrorKind, OrderingViolation, PipelineFailure};
pub use pass::{Pass, PassId, PassInfo};
pub use pipeline::{Pipeline, PipelineEntry, PipelineInputs, Stage, StageName, build_pipeline};
pub use runner::{
    MissingBodyPolicy, PassBody, PassContext, PassRegistry, PassRunner, PassTarget, RunReport,
};
pub use scope::{Granularity, ModuleFilter, Scope};
