//! Pipeline execution.
//!
//! Stages and their entries run strictly in order on a single thread. A
//! module-scoped entry invokes its pass body once per matching module, in
//! circuit then module order. The first failing pass aborts the run; later
//! entries never execute.

use std::collections::HashMap;

use ferrite_ir::{Circuit, IrContext, Location, Module, Program, validate_program};
use tracing::{debug, info_span, warn};

use crate::diagnostic::Diagnostic;
use crate::error::PipelineFailure;
use crate::pass::{Pass, PassId};
use crate::pipeline::{Pipeline, StageName};
use crate::scope::{Granularity, Scope};
use crate::{canonicalize, check_recursive_instantiation, cse};

/// What a single invocation of a pass body operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    Program,
    Circuit(Circuit),
    Module(Module),
}

impl PassTarget {
    /// Circuits covered by the target.
    pub fn circuits(self, program: &Program) -> Vec<Circuit> {
        match self {
            PassTarget::Program => program.circuits().to_vec(),
            PassTarget::Circuit(circuit) => vec![circuit],
            PassTarget::Module(module) => module.circuit(&program.ctx).into_iter().collect(),
        }
    }

    /// Modules covered by the target.
    pub fn modules(self, program: &Program) -> Vec<Module> {
        match self {
            PassTarget::Program => program.modules(),
            PassTarget::Circuit(circuit) => circuit.modules(&program.ctx),
            PassTarget::Module(module) => vec![module],
        }
    }

    /// Location of the first circuit or module the target covers.
    pub fn location(self, program: &Program) -> Option<Location> {
        let op = match self {
            PassTarget::Program => program.circuits().first()?.op(),
            PassTarget::Circuit(circuit) => circuit.op(),
            PassTarget::Module(module) => module.op(),
        };
        Some(program.ctx.op(op).location)
    }
}

/// State handed to a pass body.
pub struct PassContext<'a> {
    pub program: &'a mut Program,
    /// The scheduled pass, with its parameters.
    pub pass: &'a Pass,
    stage: StageName,
    warnings: &'a mut Vec<Diagnostic>,
}

impl PassContext<'_> {
    pub fn ctx(&mut self) -> &mut IrContext {
        &mut self.program.ctx
    }

    /// Record a non-fatal diagnostic.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        warn!(pass = %self.pass.id(), "{diagnostic}");
        self.warnings
            .push(diagnostic.attribute_to(self.stage, self.pass.id()));
    }
}

/// A pass body. Failure must leave the IR well-formed.
pub type PassBody = fn(&mut PassContext<'_>, PassTarget) -> Result<(), Diagnostic>;

/// Maps pass identifiers to their bodies.
#[derive(Clone, Default)]
pub struct PassRegistry {
    bodies: HashMap<PassId, PassBody>,
}

impl PassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in pass body.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            PassId::CheckRecursiveInstantiation,
            check_recursive_instantiation::run,
        );
        registry.register(PassId::Cse, cse::run);
        registry.register(PassId::Canonicalize, canonicalize::run);
        registry
    }

    /// Register `body` for `id`, returning the body it replaces.
    pub fn register(&mut self, id: PassId, body: PassBody) -> Option<PassBody> {
        self.bodies.insert(id, body)
    }

    pub fn get(&self, id: PassId) -> Option<PassBody> {
        self.bodies.get(&id).copied()
    }

    pub fn contains(&self, id: PassId) -> bool {
        self.bodies.contains_key(&id)
    }
}

/// What to do with a scheduled pass that has no registered body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingBodyPolicy {
    /// Warn and move on.
    #[default]
    Skip,
    /// Fail the pipeline at that pass.
    Fail,
}

/// Summary of a successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Entries whose body ran on every target.
    pub executed: usize,
    /// Entries skipped for lack of a body.
    pub skipped: Vec<PassId>,
    pub warnings: Vec<Diagnostic>,
}

pub struct PassRunner {
    registry: PassRegistry,
    missing_body: MissingBodyPolicy,
    verify_each: bool,
}

impl Default for PassRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PassRunner {
    /// Built-in bodies, skip missing ones, verify after every pass.
    pub fn new() -> Self {
        Self {
            registry: PassRegistry::with_builtins(),
            missing_body: MissingBodyPolicy::Skip,
            verify_each: true,
        }
    }

    pub fn with_registry(mut self, registry: PassRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_missing_body_policy(mut self, policy: MissingBodyPolicy) -> Self {
        self.missing_body = policy;
        self
    }

    /// Whether to validate the IR after every successful pass.
    pub fn with_verify_each(mut self, verify_each: bool) -> Self {
        self.verify_each = verify_each;
        self
    }

    pub fn registry(&self) -> &PassRegistry {
        &self.registry
    }

    /// Run every entry of `pipeline` against `program`.
    pub fn run(
        &self,
        pipeline: &Pipeline,
        program: &mut Program,
    ) -> Result<RunReport, PipelineFailure> {
        let mut report = RunReport::default();
        let mut warnings = Vec::new();

        for stage in &pipeline.stages {
            let _stage_span = info_span!("stage", name = %stage.name).entered();
            for entry in &stage.entries {
                let id = entry.pass.id();
                let _pass_span = info_span!("pass", pass = %id, scope = %entry.scope).entered();

                let scoped = targets(program, entry.scope);
                let Some(body) = self.registry.get(id) else {
                    match self.missing_body {
                        MissingBodyPolicy::Skip => {
                            warn!(pass = %id, "no body registered, skipping");
                            report.skipped.push(id);
                            continue;
                        }
                        MissingBodyPolicy::Fail => {
                            let mut diagnostic =
                                Diagnostic::error(format!("no body registered for pass `{id}`"));
                            let first = scoped.first().copied().unwrap_or(PassTarget::Program);
                            if let Some(location) = first.location(program) {
                                diagnostic = diagnostic.at(location);
                            }
                            return Err(failure(stage.name, id, diagnostic, warnings));
                        }
                    }
                };

                for target in scoped {
                    let mut pctx = PassContext {
                        program: &mut *program,
                        pass: &entry.pass,
                        stage: stage.name,
                        warnings: &mut warnings,
                    };
                    if let Err(mut diagnostic) = body(&mut pctx, target) {
                        if diagnostic.location.is_none() {
                            diagnostic.location = target.location(program);
                        }
                        return Err(failure(stage.name, id, diagnostic, warnings));
                    }
                }

                if self.verify_each {
                    let result = validate_program(program);
                    if let Some(first) = result.errors.first() {
                        let diagnostic = Diagnostic::error(format!(
                            "IR verification failed after `{id}` ({} error(s)): {first}",
                            result.errors.len()
                        ))
                        .at(first.location());
                        return Err(failure(stage.name, id, diagnostic, warnings));
                    }
                }

                debug!(pass = %id, "pass complete");
                report.executed += 1;
            }
        }

        report.warnings = warnings;
        Ok(report)
    }
}

fn failure(
    stage: StageName,
    pass: PassId,
    diagnostic: Diagnostic,
    warnings: Vec<Diagnostic>,
) -> PipelineFailure {
    PipelineFailure {
        stage,
        pass,
        diagnostic: diagnostic.attribute_to(stage, pass),
        warnings,
    }
}

fn targets(program: &Program, scope: Scope) -> Vec<PassTarget> {
    match scope.granularity() {
        Granularity::Program => vec![PassTarget::Program],
        Granularity::Circuit => program
            .circuits()
            .iter()
            .map(|&c| PassTarget::Circuit(c))
            .collect(),
        Granularity::Module(filter) => program
            .modules()
            .into_iter()
            .filter(|m| filter.matches(m.kind(&program.ctx)))
            .map(PassTarget::Module)
            .collect(),
    }
}
