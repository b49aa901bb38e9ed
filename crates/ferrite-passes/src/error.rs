//! Error types for configuration, pipeline verification and execution.

use std::fmt;

use derive_more::{Display, Error};

use crate::diagnostic::Diagnostic;
use crate::pass::PassId;
use crate::pipeline::StageName;

// ============================================================================
// Configuration
// ============================================================================

/// An invalid or contradictory configuration, reported before any pipeline is built.
#[derive(Clone, Display, Debug, PartialEq, Eq)]
#[display("{kind}")]
pub struct ConfigError {
    kind: Box<ConfigErrorKind>,
}

impl<E> From<E> for ConfigError
where
    ConfigErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        ConfigError {
            kind: Box::new(ConfigErrorKind::from(error)),
        }
    }
}

impl ConfigError {
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }

    pub fn unknown_value(option: &'static str, value: impl Into<String>) -> Self {
        ConfigErrorKind::UnknownValue {
            option,
            value: value.into(),
        }
        .into()
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Display, Debug, PartialEq, Eq)]
pub enum ConfigErrorKind {
    #[display("--repl-seq-mem requires --repl-seq-mem-file")]
    MissingReplSeqMemFile,

    #[display("split Verilog output needs an output directory, not `-`")]
    SplitOutputToStdout,

    #[display("clock gate {_0} name must not be empty")]
    EmptyClockGateName(&'static str),

    #[display("unknown value `{value}` for {option}")]
    UnknownValue { option: &'static str, value: String },
}

// ============================================================================
// Ordering
// ============================================================================

/// A built pipeline breaks one of the declared pass ordering rules.
#[derive(Clone, Debug, PartialEq, Eq, Display, Error)]
pub enum OrderingViolation {
    #[display(
        "`{before}` must run before `{after}`, but `{after}` at #{after_at} precedes `{before}` at #{before_at}"
    )]
    OutOfOrder {
        before: PassId,
        after: PassId,
        before_at: usize,
        after_at: usize,
    },

    #[display("non-idempotent pass `{pass}` must be scheduled exactly once, found {count}")]
    NonIdempotentCount { pass: PassId, count: usize },

    #[display("`{pass}` emits diagnostics after `specialize-layers` in stage `{stage}`")]
    DiagnosticsAfterLayerSpecialization { stage: StageName, pass: PassId },
}

// ============================================================================
// Execution
// ============================================================================

/// The first pass failure of a pipeline run.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub struct PipelineFailure {
    pub stage: StageName,
    pub pass: PassId,
    pub diagnostic: Diagnostic,
    /// Warnings gathered before the failure.
    pub warnings: Vec<Diagnostic>,
}

impl fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pass `{}` failed in stage `{}`: {}",
            self.pass, self.stage, self.diagnostic
        )
    }
}
