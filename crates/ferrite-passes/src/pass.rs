//! Pass catalogue.
//!
//! [`PassId`] names every pass the pipeline builder can schedule; [`Pass`]
//! is the same list with each pass's parameters fixed at construction.
//! Ordering rules between passes are declared in [`PassId::info`] and
//! checked by [`verify_pipeline`](crate::constraints::verify_pipeline).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{
    ClockGateOptions, CompanionMode, DebugInfoFilter, PreserveAggregate, PreserveValues,
    ReadEnableMode, SymbolicValueLowering, VerificationFlavor,
};

fn write_params(f: &mut fmt::Formatter<'_>, params: &[(&str, &dyn fmt::Display)]) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{key}={value}")?;
    }
    f.write_str("}")
}

macro_rules! passes {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident $({ $($field:ident : $ty:ty),* $(,)? })? => $name:tt,
        )*
    ) => {
        /// Identifier of a pass, without parameters.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum PassId {
            $(#[serde(rename = $name)] $variant,)*
        }

        impl PassId {
            pub const ALL: &'static [PassId] = &[$(PassId::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(PassId::$variant => $name,)*
                }
            }
        }

        /// A pass with its parameters.
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "pass")]
        pub enum Pass {
            $(
                $(#[$meta])*
                #[serde(rename = $name)]
                $variant $({ $($field: $ty),* })?,
            )*
        }

        impl Pass {
            pub fn id(&self) -> PassId {
                match self {
                    $(Pass::$variant { .. } => PassId::$variant,)*
                }
            }
        }

        impl fmt::Display for Pass {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(
                        Pass::$variant $({ $($field),* })? => {
                            f.write_str($name)?;
                            $(write_params(f, &[$((stringify!($field), $field as &dyn fmt::Display)),*])?;)?
                            Ok(())
                        }
                    )*
                }
            }
        }
    };
}

passes! {
    // Preprocess
    CheckRecursiveInstantiation => "check-recursive-instantiation",
    CheckLayers => "check-layers",
    LowerOpenAggs => "lower-open-aggs",
    ResolvePaths => "resolve-paths",
    LowerAnnotations {
        disable_unknown: bool,
        disable_classless: bool,
        no_ref_type_ports: bool,
        allow_adding_ports_on_public: bool,
    } => "lower-annotations",
    MaterializeDebugInfo => "materialize-debug-info",
    LowerIntmodules { fixup_eicg_wrapper: bool } => "lower-intmodules",
    LowerIntrinsics => "lower-intrinsics",

    // High to mid
    SpecializeOption { select_default_instance_choice: bool } => "specialize-option",
    LowerSignatures => "lower-signatures",
    /// Keeps its controlling annotation for instance extraction, so a second
    /// run would inject the hierarchy twice.
    InjectDutHierarchy => "inject-dut-hierarchy",
    Cse => "cse",
    PassiveWires => "passive-wires",
    DropNames { preserve: PreserveValues } => "drop-names",
    LowerChirrtl => "lower-chirrtl",
    LowerMatches => "lower-matches",
    InferWidths => "infer-widths",
    MemToRegOfVec { repl_seq_mem: bool, ignore_read_enable: bool } => "mem-to-reg-of-vec",
    InferResets => "infer-resets",
    ExportChiselInterface => "export-chisel-interface",
    ExportSplitChiselInterface { directory: String } => "export-split-chisel-interface",
    DropConst => "drop-const",
    Dedup => "dedup",
    LowerTypes {
        preserve_aggregate: PreserveAggregate,
        preserve_memories: PreserveAggregate,
    } => "lower-types",
    VbToBv => "vb-to-bv",
    FlattenMemory => "flatten-memory",
    ExpandWhens => "expand-whens",
    SfcCompat => "sfc-compat",
    CheckCombLoops => "check-comb-loops",
    SpecializeLayers => "specialize-layers",
    ProbesToSignals => "probes-to-signals",
    Inliner => "inliner",
    LayerMerge => "layer-merge",
    RandomizeRegisterInit => "randomize-register-init",
    Canonicalize => "canonicalize",
    InferReadWrite => "infer-read-write",
    LowerMemory => "lower-memory",
    CreateCompanionAssume => "create-companion-assume",
    ImConstProp => "im-const-prop",
    AddSeqMemPorts => "add-seq-mem-ports",
    CreateMetadata { repl_seq_mem: bool, repl_seq_mem_file: String } => "create-metadata",
    ExtractInstances => "extract-instances",
    SymbolDce => "symbol-dce",
    InnerSymbolDce => "inner-symbol-dce",
    EliminateWires => "eliminate-wires",
    RegisterOptimizer => "register-optimizer",
    ImDeadCodeElim => "im-dead-code-elim",
    MergeConnections { aggressive: bool } => "merge-connections",
    Vectorization => "vectorization",

    // Mid to hardware
    LayerSink => "layer-sink",
    LowerXmr => "lower-xmr",
    LowerLayers => "lower-layers",
    AssignOutputDirs { output_dir: String } => "assign-output-dirs",
    GrandCentral { companion_mode: CompanionMode } => "grand-central",
    BlackBoxReader { root: String } => "black-box-reader",
    ResolveTraces { output_annotation_file: String } => "resolve-traces",
    LowerDpi => "lower-dpi",
    LowerClasses => "lower-classes",
    VerifyObjectFields => "verify-object-fields",
    Lint { static_asserts: bool, xmrs_in_design: bool } => "lint",
    LowerFirrtlToHw {
        annotation_warning: bool,
        verification_flavor: VerificationFlavor,
    } => "lower-firrtl-to-hw",
    VerifyInnerRefNamespace => "verify-inner-ref-namespace",
    VerifyClockedAssertLike => "verify-clocked-assert-like",

    // Hardware to structural
    StripContracts => "strip-contracts",
    LowerFormalToHw => "lower-formal-to-hw",
    LowerSymbolicValues { mode: SymbolicValueLowering } => "lower-symbolic-values",
    ExtractTestCode {
        disable_instance_extraction: bool,
        disable_register_extraction: bool,
        disable_module_inlining: bool,
    } => "extract-test-code",
    ExternalizeClockGate { options: ClockGateOptions } => "externalize-clock-gate",
    LowerSimToSv => "lower-sim-to-sv",
    LowerSeqToSv {
        disable_reg_randomization: bool,
        disable_mem_randomization: bool,
        emit_separate_always_blocks: bool,
    } => "lower-seq-to-sv",
    LowerVerifToSv => "lower-verif-to-sv",
    HwMemSimImpl {
        disable_mem_randomization: bool,
        disable_reg_randomization: bool,
        repl_seq_mem: bool,
        read_enable: ReadEnableMode,
        add_mux_pragmas: bool,
        vivado_ram_workaround: bool,
    } => "hw-mem-sim-impl",
    HwCleanup { merge_always_blocks: bool } => "hw-cleanup",

    // Prepare for export
    HwLegalizeModules => "hw-legalize-modules",
    PrettifyVerilog => "prettify-verilog",
    StripDebugInfo { filter: DebugInfoFilter } => "strip-debug-info",
    ExportModuleHierarchy => "export-module-hierarchy",

    // Finalize and export
    FinalizeIr => "finalize-ir",
    FreezePaths => "freeze-paths",
    ExportVerilog => "export-verilog",
    ExportSplitVerilog { directory: String } => "export-split-verilog",
    LowerLtlToCore => "lower-ltl-to-core",
    PrepareForFormal => "prepare-for-formal",
    FlattenModules => "flatten-modules",
    ExportBtor2 => "export-btor2",
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static facts about a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassInfo {
    pub id: PassId,
    /// Safe to schedule more than once.
    pub idempotent: bool,
    /// Checks or inference that can report user errors.
    pub emits_diagnostics: bool,
    /// Must be scheduled after every diagnostic-emitting pass of its stage.
    pub after_stage_diagnostics: bool,
    /// Every occurrence of this pass precedes every occurrence of these.
    pub runs_before: &'static [PassId],
    /// Every occurrence of these precedes every occurrence of this pass.
    pub runs_after: &'static [PassId],
}

impl PassId {
    pub fn info(self) -> PassInfo {
        use PassId::*;

        let mut info = PassInfo {
            id: self,
            idempotent: true,
            emits_diagnostics: false,
            after_stage_diagnostics: false,
            runs_before: &[],
            runs_after: &[],
        };
        match self {
            CheckRecursiveInstantiation | CheckLayers | LowerAnnotations | InferWidths
            | InferResets | ExpandWhens | CheckCombLoops | VerifyObjectFields | Lint
            | VerifyInnerRefNamespace | VerifyClockedAssertLike => {
                info.emits_diagnostics = true;
            }
            InjectDutHierarchy => info.idempotent = false,
            // Width inference does not understand match statements.
            LowerMatches => info.runs_before = &[InferWidths],
            ExtractInstances => info.runs_after = &[InjectDutHierarchy],
            SpecializeLayers => info.after_stage_diagnostics = true,
            // Registers must all exist in their final module and none may be removed yet.
            RandomizeRegisterInit => {
                info.runs_after = &[Inliner, Dedup];
                info.runs_before = &[
                    Canonicalize,
                    ImConstProp,
                    RegisterOptimizer,
                    ImDeadCodeElim,
                    LowerLayers,
                ];
            }
            SymbolDce => info.runs_before = &[InnerSymbolDce],
            InnerSymbolDce => info.runs_before = &[ImDeadCodeElim],
            // Reference lowering pins probed objects in place.
            LayerSink => info.runs_before = &[LowerXmr],
            GrandCentral => {
                info.runs_after = &[AssignOutputDirs];
                info.runs_before = &[BlackBoxReader];
            }
            _ => {}
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_match_serde() {
        let mut seen = HashSet::new();
        for &id in PassId::ALL {
            assert!(seen.insert(id.name()), "duplicate pass name {id}");
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{id}\""));
        }
    }

    #[test]
    fn display_shows_parameters() {
        let pass = Pass::LowerTypes {
            preserve_aggregate: PreserveAggregate::OneDimVec,
            preserve_memories: PreserveAggregate::None,
        };
        assert_eq!(pass.id(), PassId::LowerTypes);
        assert_eq!(
            pass.to_string(),
            "lower-types{preserve_aggregate=1d-vec preserve_memories=none}"
        );
        assert_eq!(Pass::Inliner.to_string(), "inliner");
    }

    #[test]
    fn parameterised_pass_serializes_with_tag() {
        let pass = Pass::MergeConnections { aggressive: true };
        let json = serde_json::to_value(&pass).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"pass": "merge-connections", "aggressive": true})
        );
        let back: Pass = serde_json::from_value(json).unwrap();
        assert_eq!(back, pass);
    }

    #[test]
    fn only_hierarchy_injection_is_non_idempotent() {
        let non_idempotent: Vec<_> = PassId::ALL
            .iter()
            .filter(|id| !id.info().idempotent)
            .collect();
        assert_eq!(non_idempotent, [&PassId::InjectDutHierarchy]);
    }
}
