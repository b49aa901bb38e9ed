//! Pipeline construction.
//!
//! The pipeline is a plain value: an ordered list of named stages, each an
//! ordered list of `(scope, pass)` entries. Stage functions append to it and
//! never fail; the only build-time failure is an invalid [`Configuration`].
//!
//! ## Stages
//!
//! ```text
//! Preprocess ─► HighToMid ─► MidToHw ─┬─► HwToStructural ─► PrepareForExport ─► Finalize ─► Export (Verilog | split Verilog)
//!                                     ├─► HwToStructural ─► Finalize                                  (IR only)
//!                                     └─► Finalize ─► Export (BTOR2)
//! ```
//!
//! ## Ordering
//!
//! Constraints between passes are declared on [`PassId::info`] and checked
//! by [`verify_pipeline`](crate::constraints::verify_pipeline). The ones the
//! stage functions below rely on:
//!
//! - `inject-dut-hierarchy` is not idempotent and must precede
//!   `extract-instances`; both are slated for removal.
//! - `lower-matches` precedes `infer-widths`.
//! - `specialize-layers` follows every diagnostic-emitting pass of its stage.
//! - `randomize-register-init` runs after inlining and dedup, and before any
//!   pass that can remove a register.
//! - `symbol-dce` precedes `inner-symbol-dce`, which precedes `im-dead-code-elim`.
//! - `layer-sink` precedes `lower-xmr`.
//! - `assign-output-dirs` precedes `grand-central`, which precedes
//!   `black-box-reader`.

use std::fmt;

use ferrite_ir::ModuleKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Configuration, DebugInfoFilter, EmitTarget, PreserveAggregate, RandomKind};
use crate::error::ConfigError;
use crate::pass::{Pass, PassId};
use crate::scope::Scope;

// =============================================================================
// Pipeline description
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    Preprocess,
    HighToMid,
    MidToHw,
    HwToStructural,
    PrepareForExport,
    Finalize,
    Export,
}

impl StageName {
    pub fn as_str(self) -> &'static str {
        match self {
            StageName::Preprocess => "preprocess",
            StageName::HighToMid => "high-to-mid",
            StageName::MidToHw => "mid-to-hw",
            StageName::HwToStructural => "hw-to-structural",
            StageName::PrepareForExport => "prepare-for-export",
            StageName::Finalize => "finalize",
            StageName::Export => "export",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub scope: Scope,
    pub pass: Pass,
    /// Included only because optimizations are enabled.
    pub optimization: bool,
}

impl fmt::Display for PipelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scope.wrap(&self.pass))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: StageName,
    pub entries: Vec<PipelineEntry>,
}

impl Stage {
    pub fn new(name: StageName) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, scope: Scope, pass: Pass) {
        self.entries.push(PipelineEntry {
            scope,
            pass,
            optimization: false,
        });
    }

    /// Add an entry that is only present when optimizing.
    pub fn add_optimization(&mut self, scope: Scope, pass: Pass) {
        self.entries.push(PipelineEntry {
            scope,
            pass,
            optimization: true,
        });
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_stage(&mut self, stage: Stage) {
        debug!(stage = %stage.name, passes = stage.entries.len(), "stage populated");
        self.stages.push(stage);
    }

    /// Every entry with its stage, in execution order.
    pub fn entries(&self) -> impl Iterator<Item = (StageName, &PipelineEntry)> {
        self.stages
            .iter()
            .flat_map(|s| s.entries.iter().map(move |e| (s.name, e)))
    }

    /// Pass identifiers in execution order.
    pub fn passes(&self) -> Vec<PassId> {
        self.entries().map(|(_, e)| e.pass.id()).collect()
    }

    /// Position of the first occurrence of `id`.
    pub fn position_of(&self, id: PassId) -> Option<usize> {
        self.entries().position(|(_, e)| e.pass.id() == id)
    }

    pub fn count_of(&self, id: PassId) -> usize {
        self.entries().filter(|(_, e)| e.pass.id() == id).count()
    }

    pub fn stage(&self, name: StageName) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.stages.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "{}:", stage.name)?;
            for entry in &stage.entries {
                writeln!(f, "  {entry}")?;
            }
        }
        Ok(())
    }
}

/// Facts about the compilation that are not options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineInputs {
    /// Path of the input file; its directory is the default black-box root.
    pub input_filename: String,
}

impl PipelineInputs {
    pub fn new(input_filename: impl Into<String>) -> Self {
        Self {
            input_filename: input_filename.into(),
        }
    }
}

// =============================================================================
// Stages
// =============================================================================

const DESIGN: Scope = Scope::circuit_modules(ModuleKind::Design);
const HARDWARE: Scope = Scope::modules(ModuleKind::Hardware);

/// Structural legalization of freshly parsed input.
pub fn populate_preprocess(mut pipeline: Pipeline, config: &Configuration) -> Pipeline {
    let mut stage = Stage::new(StageName::Preprocess);
    stage.add(Scope::CIRCUIT, Pass::CheckRecursiveInstantiation);
    stage.add(Scope::CIRCUIT, Pass::CheckLayers);
    stage.add(Scope::CIRCUIT, Pass::LowerOpenAggs);
    stage.add(Scope::CIRCUIT, Pass::ResolvePaths);
    stage.add(
        Scope::CIRCUIT,
        Pass::LowerAnnotations {
            disable_unknown: config.disable_annotations_unknown,
            disable_classless: config.disable_annotations_classless,
            no_ref_type_ports: config.lower_annotations_no_ref_type_ports,
            allow_adding_ports_on_public: config.allow_adding_ports_on_public,
        },
    );
    if config.should_enable_debug_info() {
        stage.add(DESIGN, Pass::MaterializeDebugInfo);
    }
    stage.add(
        Scope::CIRCUIT,
        Pass::LowerIntmodules {
            fixup_eicg_wrapper: config.fixup_eicg_wrapper,
        },
    );
    stage.add(DESIGN, Pass::LowerIntrinsics);

    pipeline.push_stage(stage);
    pipeline
}

/// From the high-level form down to the mid-level form.
///
/// `inject-dut-hierarchy` is scheduled exactly once: it keeps the annotation
/// that `extract-instances` consumes later in this stage.
pub fn populate_high_to_mid(mut pipeline: Pipeline, config: &Configuration) -> Pipeline {
    let optimize = !config.should_disable_optimization();
    let mut stage = Stage::new(StageName::HighToMid);

    // TODO: move after the diagnostic passes once instance graphs understand instance choice.
    stage.add(
        Scope::CIRCUIT,
        Pass::SpecializeOption {
            select_default_instance_choice: config.select_default_instance_choice,
        },
    );
    stage.add(Scope::CIRCUIT, Pass::LowerSignatures);
    stage.add(Scope::CIRCUIT, Pass::InjectDutHierarchy);

    if optimize {
        let scope = if config.disable_cse_in_classes {
            DESIGN
        } else {
            Scope::circuit_any()
        };
        stage.add_optimization(scope, Pass::Cse);
    }

    stage.add(DESIGN, Pass::PassiveWires);
    stage.add(
        DESIGN,
        Pass::DropNames {
            preserve: config.effective_preserve_mode(),
        },
    );
    stage.add(DESIGN, Pass::LowerChirrtl);
    stage.add(DESIGN, Pass::LowerMatches);
    stage.add(Scope::CIRCUIT, Pass::InferWidths);
    stage.add(
        Scope::CIRCUIT,
        Pass::MemToRegOfVec {
            repl_seq_mem: config.repl_seq_mem,
            ignore_read_enable: config.ignore_read_enable_mem,
        },
    );
    stage.add(Scope::CIRCUIT, Pass::InferResets);

    if config.export_chisel_interface {
        let outdir = &config.chisel_interface_out_dir;
        if config.is_default_output_filename() && outdir.is_empty() {
            stage.add(Scope::CIRCUIT, Pass::ExportChiselInterface);
        } else {
            let directory = if outdir.is_empty() {
                config.output_filename.clone()
            } else {
                outdir.clone()
            };
            stage.add(Scope::CIRCUIT, Pass::ExportSplitChiselInterface { directory });
        }
    }

    stage.add(Scope::CIRCUIT, Pass::DropConst);
    if config.should_dedup() {
        stage.add(Scope::CIRCUIT, Pass::Dedup);
    }
    if config.vb_to_bv {
        stage.add(
            Scope::CIRCUIT,
            Pass::LowerTypes {
                preserve_aggregate: PreserveAggregate::All,
                preserve_memories: PreserveAggregate::All,
            },
        );
        stage.add(Scope::CIRCUIT, Pass::VbToBv);
    }
    if !config.lower_memories {
        stage.add(DESIGN, Pass::FlattenMemory);
    }
    stage.add(
        Scope::CIRCUIT,
        Pass::LowerTypes {
            preserve_aggregate: config.preserve_aggregate,
            preserve_memories: PreserveAggregate::None,
        },
    );
    stage.add(DESIGN, Pass::ExpandWhens);
    stage.add(DESIGN, Pass::SfcCompat);
    stage.add(Scope::CIRCUIT, Pass::CheckCombLoops);
    // Runs after every diagnostic pass so it cannot hide errors.
    stage.add(Scope::CIRCUIT, Pass::SpecializeLayers);

    if config.probes_to_signals {
        stage.add(Scope::CIRCUIT, Pass::ProbesToSignals);
    }
    stage.add(Scope::CIRCUIT, Pass::Inliner);
    stage.add(DESIGN, Pass::LayerMerge);

    if config.is_random_enabled(RandomKind::Reg) {
        stage.add(DESIGN, Pass::RandomizeRegisterInit);
    }
    if optimize {
        stage.add_optimization(DESIGN, Pass::Canonicalize);
        stage.add_optimization(DESIGN, Pass::InferReadWrite);
    }
    if config.repl_seq_mem {
        stage.add(Scope::CIRCUIT, Pass::LowerMemory);
    }
    if config.add_companion_assume {
        stage.add(DESIGN, Pass::CreateCompanionAssume);
    }
    if optimize {
        stage.add_optimization(Scope::CIRCUIT, Pass::ImConstProp);
    }

    stage.add(Scope::CIRCUIT, Pass::AddSeqMemPorts);
    stage.add(
        Scope::PROGRAM,
        Pass::CreateMetadata {
            repl_seq_mem: config.repl_seq_mem,
            repl_seq_mem_file: config.repl_seq_mem_file.clone(),
        },
    );
    stage.add(Scope::CIRCUIT, Pass::ExtractInstances);
    stage.add(Scope::CIRCUIT, Pass::SymbolDce);
    stage.add(Scope::PROGRAM, Pass::InnerSymbolDce);

    if optimize {
        if !config.disable_wire_elimination {
            stage.add_optimization(DESIGN, Pass::EliminateWires);
        }
        stage.add_optimization(DESIGN, Pass::Canonicalize);
        stage.add_optimization(DESIGN, Pass::RegisterOptimizer);
        // Again, for constants exposed by register optimization.
        stage.add_optimization(Scope::CIRCUIT, Pass::ImConstProp);
        stage.add_optimization(DESIGN, Pass::Canonicalize);
        stage.add_optimization(Scope::PROGRAM, Pass::ImDeadCodeElim);
    }

    stage.add(
        DESIGN,
        Pass::MergeConnections {
            aggressive: !config.disable_aggressive_merge_connections,
        },
    );
    if optimize {
        stage.add_optimization(DESIGN, Pass::Vectorization);
    }

    pipeline.push_stage(stage);
    pipeline
}

/// From the mid-level form to hardware modules.
pub fn populate_mid_to_hw(
    mut pipeline: Pipeline,
    config: &Configuration,
    inputs: &PipelineInputs,
) -> Pipeline {
    let optimize = !config.should_disable_optimization();
    let mut stage = Stage::new(StageName::MidToHw);

    if optimize && !config.disable_layer_sink {
        stage.add_optimization(Scope::CIRCUIT, Pass::LayerSink);
    }
    stage.add(Scope::CIRCUIT, Pass::LowerXmr);
    stage.add(Scope::CIRCUIT, Pass::LowerLayers);
    if optimize {
        stage.add_optimization(DESIGN, Pass::Canonicalize);
    }

    stage.add(
        Scope::CIRCUIT,
        Pass::AssignOutputDirs {
            output_dir: config.output_directory().to_string(),
        },
    );
    stage.add(
        Scope::CIRCUIT,
        Pass::GrandCentral {
            companion_mode: config.companion_mode,
        },
    );
    stage.add(
        Scope::CIRCUIT,
        Pass::BlackBoxReader {
            root: config.black_box_root(&inputs.input_filename),
        },
    );
    stage.add(
        Scope::CIRCUIT,
        Pass::ResolveTraces {
            output_annotation_file: config.output_annotation_filename.clone(),
        },
    );
    stage.add(Scope::CIRCUIT, Pass::LowerDpi);
    stage.add(Scope::CIRCUIT, Pass::LowerClasses);
    stage.add(Scope::CIRCUIT, Pass::VerifyObjectFields);
    stage.add(
        Scope::CIRCUIT,
        Pass::Lint {
            static_asserts: config.lint_static_asserts,
            xmrs_in_design: config.lint_xmrs_in_design,
        },
    );
    stage.add(
        Scope::PROGRAM,
        Pass::LowerFirrtlToHw {
            annotation_warning: config.enable_annotation_warning,
            verification_flavor: config.verification_flavor,
        },
    );

    if optimize {
        stage.add_optimization(HARDWARE, Pass::Cse);
        stage.add_optimization(HARDWARE, Pass::Canonicalize);
    }
    stage.add(Scope::PROGRAM, Pass::VerifyInnerRefNamespace);
    stage.add(Scope::PROGRAM, Pass::VerifyObjectFields);
    stage.add(HARDWARE, Pass::VerifyClockedAssertLike);

    pipeline.push_stage(stage);
    pipeline
}

/// From hardware modules to structural, emission-ready constructs.
pub fn populate_hw_to_structural(mut pipeline: Pipeline, config: &Configuration) -> Pipeline {
    let optimize = !config.should_disable_optimization();
    let disable_reg_randomization = !config.is_random_enabled(RandomKind::Reg);
    let disable_mem_randomization = !config.is_random_enabled(RandomKind::Mem);
    let mut stage = Stage::new(StageName::HwToStructural);

    stage.add(Scope::any_module(), Pass::StripContracts);
    stage.add(Scope::PROGRAM, Pass::LowerFormalToHw);
    stage.add(
        Scope::PROGRAM,
        Pass::LowerSymbolicValues {
            mode: config.symbolic_value_lowering,
        },
    );
    if config.extract_test_code {
        stage.add(
            Scope::PROGRAM,
            Pass::ExtractTestCode {
                disable_instance_extraction: config.etc_disable_instance_extraction,
                disable_register_extraction: config.etc_disable_register_extraction,
                disable_module_inlining: config.etc_disable_module_inlining,
            },
        );
    }
    stage.add(
        Scope::PROGRAM,
        Pass::ExternalizeClockGate {
            options: config.clock_gate.clone(),
        },
    );
    stage.add(Scope::PROGRAM, Pass::LowerSimToSv);
    stage.add(
        Scope::PROGRAM,
        Pass::LowerSeqToSv {
            disable_reg_randomization,
            disable_mem_randomization,
            emit_separate_always_blocks: config.emit_separate_always_blocks,
        },
    );
    stage.add(HARDWARE, Pass::LowerVerifToSv);
    stage.add(
        Scope::PROGRAM,
        Pass::HwMemSimImpl {
            disable_mem_randomization,
            disable_reg_randomization,
            repl_seq_mem: config.repl_seq_mem,
            read_enable: config.read_enable_mode(),
            add_mux_pragmas: config.add_mux_pragmas,
            vivado_ram_workaround: config
                .add_vivado_ram_address_conflict_synthesis_bug_workaround,
        },
    );

    if optimize {
        stage.add_optimization(HARDWARE, Pass::Cse);
        stage.add_optimization(HARDWARE, Pass::Canonicalize);
        stage.add_optimization(HARDWARE, Pass::Cse);
        stage.add_optimization(
            HARDWARE,
            Pass::HwCleanup {
                merge_always_blocks: !config.emit_separate_always_blocks,
            },
        );
    }
    stage.add(Scope::PROGRAM, Pass::VerifyInnerRefNamespace);
    stage.add(Scope::PROGRAM, Pass::VerifyObjectFields);

    pipeline.push_stage(stage);
    pipeline
}

/// Last legalization and cleanup before text emission.
pub fn populate_prepare_for_export(mut pipeline: Pipeline, config: &Configuration) -> Pipeline {
    let mut stage = Stage::new(StageName::PrepareForExport);

    stage.add(HARDWARE, Pass::VerifyClockedAssertLike);
    stage.add(HARDWARE, Pass::HwLegalizeModules);
    if !config.should_disable_optimization() {
        stage.add_optimization(HARDWARE, Pass::PrettifyVerilog);
    }
    if config.strip_fir_debug_info {
        stage.add(
            Scope::PROGRAM,
            Pass::StripDebugInfo {
                filter: DebugInfoFilter::FirSource,
            },
        );
    }
    if config.strip_debug_info {
        stage.add(
            Scope::PROGRAM,
            Pass::StripDebugInfo {
                filter: DebugInfoFilter::All,
            },
        );
    }
    if config.export_module_hierarchy {
        stage.add(Scope::PROGRAM, Pass::ExportModuleHierarchy);
    }
    stage.add(Scope::PROGRAM, Pass::VerifyInnerRefNamespace);
    stage.add(Scope::PROGRAM, Pass::VerifyObjectFields);

    pipeline.push_stage(stage);
    pipeline
}

pub fn populate_finalize(mut pipeline: Pipeline, _config: &Configuration) -> Pipeline {
    let mut stage = Stage::new(StageName::Finalize);
    stage.add(Scope::PROGRAM, Pass::FinalizeIr);
    stage.add(Scope::PROGRAM, Pass::FreezePaths);
    pipeline.push_stage(stage);
    pipeline
}

/// The terminal emission stage for `target`; nothing for [`EmitTarget::Ir`].
pub fn populate_export(mut pipeline: Pipeline, config: &Configuration) -> Pipeline {
    let mut stage = Stage::new(StageName::Export);
    match config.emit_target {
        EmitTarget::Ir => return pipeline,
        EmitTarget::Verilog => stage.add(Scope::PROGRAM, Pass::ExportVerilog),
        EmitTarget::SplitVerilog => stage.add(
            Scope::PROGRAM,
            Pass::ExportSplitVerilog {
                directory: config.output_filename.clone(),
            },
        ),
        EmitTarget::Btor2 => {
            stage.add(HARDWARE, Pass::LowerLtlToCore);
            stage.add(HARDWARE, Pass::PrepareForFormal);
            stage.add(Scope::PROGRAM, Pass::FlattenModules);
            stage.add(Scope::PROGRAM, Pass::ExportBtor2);
        }
    }
    pipeline.push_stage(stage);
    pipeline
}

/// Validate `config` and assemble the full pipeline for its emit target.
pub fn build_pipeline(
    config: &Configuration,
    inputs: &PipelineInputs,
) -> Result<Pipeline, ConfigError> {
    config.validate()?;

    let mut pipeline = Pipeline::new();
    pipeline = populate_preprocess(pipeline, config);
    pipeline = populate_high_to_mid(pipeline, config);
    pipeline = populate_mid_to_hw(pipeline, config, inputs);
    match config.emit_target {
        EmitTarget::Ir => {
            pipeline = populate_hw_to_structural(pipeline, config);
            pipeline = populate_finalize(pipeline, config);
        }
        EmitTarget::Verilog | EmitTarget::SplitVerilog => {
            pipeline = populate_hw_to_structural(pipeline, config);
            pipeline = populate_prepare_for_export(pipeline, config);
            pipeline = populate_finalize(pipeline, config);
            pipeline = populate_export(pipeline, config);
        }
        EmitTarget::Btor2 => {
            pipeline = populate_finalize(pipeline, config);
            pipeline = populate_export(pipeline, config);
        }
    }

    debug!(
        target_kind = %config.emit_target,
        passes = pipeline.len(),
        "pipeline built"
    );
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_listing() {
        let pipeline = populate_preprocess(Pipeline::new(), &Configuration::default());
        insta::assert_snapshot!(pipeline, @r"
        preprocess:
          circuit(check-recursive-instantiation)
          circuit(check-layers)
          circuit(lower-open-aggs)
          circuit(resolve-paths)
          circuit(lower-annotations{disable_unknown=false disable_classless=false no_ref_type_ports=false allow_adding_ports_on_public=false})
          circuit(lower-intmodules{fixup_eicg_wrapper=false})
          circuit(module<design>(lower-intrinsics))
        ");
    }

    #[test]
    fn debug_build_materializes_debug_info() {
        let config = Configuration {
            build_mode: crate::config::BuildMode::Debug,
            ..Default::default()
        };
        let pipeline = populate_preprocess(Pipeline::new(), &config);
        assert_eq!(pipeline.position_of(PassId::MaterializeDebugInfo), Some(5));
        let pipeline = populate_high_to_mid(Pipeline::new(), &config);
        assert!(pipeline.entries().any(|(_, e)| e.pass
            == Pass::DropNames {
                preserve: crate::config::PreserveValues::Named
            }));
    }

    #[test]
    fn btor2_export_stage() {
        let config = Configuration {
            emit_target: EmitTarget::Btor2,
            ..Default::default()
        };
        let pipeline = build_pipeline(&config, &PipelineInputs::new("top.fir")).unwrap();
        let names: Vec<_> = pipeline.stages.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [
                StageName::Preprocess,
                StageName::HighToMid,
                StageName::MidToHw,
                StageName::Finalize,
                StageName::Export,
            ]
        );
        let export: Vec<String> = pipeline
            .stage(StageName::Export)
            .unwrap()
            .entries
            .iter()
            .map(|e| e.to_string())
            .collect();
        insta::assert_snapshot!(export.join("\n"), @r"
        module<hardware>(lower-ltl-to-core)
        module<hardware>(prepare-for-formal)
        flatten-modules
        export-btor2
        ");
    }

    #[test]
    fn ir_target_has_no_emission() {
        let config = Configuration {
            emit_target: EmitTarget::Ir,
            ..Default::default()
        };
        let pipeline = build_pipeline(&config, &PipelineInputs::default()).unwrap();
        assert!(pipeline.stage(StageName::Export).is_none());
        assert!(pipeline.stage(StageName::PrepareForExport).is_none());
        assert_eq!(
            pipeline.stages.last().map(|s| s.name),
            Some(StageName::Finalize)
        );
    }

    #[test]
    fn split_verilog_uses_output_directory() {
        let config = Configuration {
            emit_target: EmitTarget::SplitVerilog,
            output_filename: "build/rtl".to_string(),
            ..Default::default()
        };
        let pipeline = build_pipeline(&config, &PipelineInputs::default()).unwrap();
        let export = pipeline.stage(StageName::Export).unwrap();
        assert_eq!(
            export.entries[0].pass,
            Pass::ExportSplitVerilog {
                directory: "build/rtl".to_string()
            }
        );
        assert!(pipeline.entries().any(|(_, e)| e.pass
            == Pass::AssignOutputDirs {
                output_dir: "build/rtl".to_string()
            }));
    }

    #[test]
    fn invalid_configuration_builds_nothing() {
        let config = Configuration {
            repl_seq_mem: true,
            ..Default::default()
        };
        assert!(build_pipeline(&config, &PipelineInputs::default()).is_err());
    }
}
