//! Diagnostic messages emitted while running the pipeline.

use std::fmt;

use ferrite_ir::{Location, PathInterner};

use crate::pass::PassId;
use crate::pipeline::StageName;

/// A diagnostic message (error, warning, or note) with an optional IR location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub location: Option<Location>,
    pub severity: DiagnosticSeverity,
    pub stage: Option<StageName>,
    pub pass: Option<PassId>,
}

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "ERROR"),
            DiagnosticSeverity::Warning => write!(f, "WARNING"),
            DiagnosticSeverity::Note => write!(f, "NOTE"),
        }
    }
}

impl Diagnostic {
    fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            severity,
            stage: None,
            pass: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Note, message)
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Fill in the stage and pass unless the emitter already set them.
    pub(crate) fn attribute_to(mut self, stage: StageName, pass: PassId) -> Self {
        self.stage.get_or_insert(stage);
        self.pass.get_or_insert(pass);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// Render with the source path resolved, e.g. `top.fir:12: ERROR: ...`.
    pub fn render(&self, paths: &PathInterner) -> String {
        match self.location {
            Some(loc) => format!(
                "{}:{}: {}: {}",
                paths.get(loc.path),
                loc.span.start,
                self.severity,
                self.message
            ),
            None => format!("{}: {}", self.severity, self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(loc) = self.location {
            write!(f, " (at {}..{})", loc.span.start, loc.span.end)?;
        }
        Ok(())
    }
}
