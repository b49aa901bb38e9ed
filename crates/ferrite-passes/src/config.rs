//! Pipeline configuration.
//!
//! A [`Configuration`] is an explicit value threaded through the pipeline
//! builder; nothing here is global. `Default` reproduces the stock option
//! set of the command-line tool, and [`Configuration::validate`] rejects
//! contradictory combinations before any pipeline is assembled.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigErrorKind};

/// Declares a small keyword-valued option enum with `Display`, `FromStr`
/// and serde all agreeing on the same spelling.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $flag:literal {
            $($(#[$vmeta:meta])* $variant:ident = $text:tt),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),*
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$($text),*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)*
                    _ => Err(ConfigError::unknown_value($flag, s)),
                }
            }
        }
    };
}

option_enum! {
    /// Which aggregates survive type lowering.
    pub enum PreserveAggregate as "--preserve-aggregate" {
        #[default]
        None = "none",
        OneDimVec = "1d-vec",
        Vec = "vec",
        All = "all",
    }
}

option_enum! {
    /// Which values may be optimized away.
    pub enum PreserveValues as "--preserve-values" {
        Strip = "strip",
        #[default]
        None = "none",
        Named = "named",
        All = "all",
    }
}

option_enum! {
    pub enum BuildMode as "-O" {
        #[default]
        Default = "default",
        Debug = "debug",
        Release = "release",
    }
}

option_enum! {
    /// Handling of verification companion instances.
    pub enum CompanionMode as "--grand-central-companion-mode" {
        #[default]
        Bind = "bind",
        Instantiate = "instantiate",
        Drop = "drop",
    }
}

option_enum! {
    /// Randomization kinds that can be switched off.
    pub enum RandomKind as "--disable-randomization" {
        #[default]
        None = "none",
        Mem = "mem",
        Reg = "reg",
        All = "all",
    }
}

option_enum! {
    /// Verification statement style produced when lowering to hardware.
    pub enum VerificationFlavor as "--verification-flavor" {
        #[default]
        None = "none",
        IfElseFatal = "if-else-fatal",
        Immediate = "immediate",
        Sva = "sva",
    }
}

option_enum! {
    pub enum SymbolicValueLowering as "--symbolic-values" {
        #[default]
        ExtModule = "extmodule",
        Yosys = "yosys",
    }
}

option_enum! {
    /// How memories treat a deasserted read enable.
    pub enum ReadEnableMode as "--read-enable-mode" {
        Ignore = "ignore",
        #[default]
        Undefined = "undefined",
    }
}

option_enum! {
    /// Which locations debug-info stripping removes.
    pub enum DebugInfoFilter as "--strip-debug-info" {
        /// Only locations that point into `.fir` sources.
        #[default]
        FirSource = "fir-source",
        All = "all",
    }
}

option_enum! {
    /// What the pipeline ends in.
    pub enum EmitTarget as "--emit" {
        /// Stop after finalization; no emission.
        Ir = "ir",
        #[default]
        Verilog = "verilog",
        SplitVerilog = "split-verilog",
        Btor2 = "btor2",
    }
}

/// Naming of the external clock gate module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockGateOptions {
    pub module_name: String,
    pub input_name: String,
    pub output_name: String,
    pub enable_name: String,
    /// Empty when the gate has no test enable port.
    pub test_enable_name: String,
    pub instance_name: String,
}

impl Default for ClockGateOptions {
    fn default() -> Self {
        Self {
            module_name: "EICG_wrapper".to_string(),
            input_name: "in".to_string(),
            output_name: "out".to_string(),
            enable_name: "en".to_string(),
            test_enable_name: "test_en".to_string(),
            instance_name: "ckg".to_string(),
        }
    }
}

impl fmt::Display for ClockGateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, {}",
            self.module_name, self.input_name, self.output_name, self.enable_name
        )?;
        if !self.test_enable_name.is_empty() {
            write!(f, ", {}", self.test_enable_name)?;
        }
        f.write_str(")")
    }
}

/// Every option that shapes the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub output_filename: String,
    pub emit_target: EmitTarget,

    // Annotations
    pub disable_annotations_unknown: bool,
    pub disable_annotations_classless: bool,
    pub lower_annotations_no_ref_type_ports: bool,
    pub allow_adding_ports_on_public: bool,
    pub enable_annotation_warning: bool,
    pub output_annotation_filename: String,

    // Types and values
    pub probes_to_signals: bool,
    pub preserve_aggregate: PreserveAggregate,
    /// `None` defers to the build mode.
    pub preserve_values: Option<PreserveValues>,
    pub vb_to_bv: bool,

    // Optimization
    pub build_mode: BuildMode,
    pub enable_debug_info: bool,
    pub disable_optimization: bool,
    pub disable_layer_sink: bool,
    pub disable_cse_in_classes: bool,
    pub disable_wire_elimination: bool,
    pub disable_aggressive_merge_connections: bool,
    pub no_dedup: bool,

    // Interfaces and companions
    pub export_chisel_interface: bool,
    pub chisel_interface_out_dir: String,
    pub companion_mode: CompanionMode,
    pub add_companion_assume: bool,
    pub black_box_root_path: String,

    // Memories and randomization
    pub lower_memories: bool,
    pub repl_seq_mem: bool,
    pub repl_seq_mem_file: String,
    pub ignore_read_enable_mem: bool,
    pub disable_random: RandomKind,
    pub add_mux_pragmas: bool,
    pub add_vivado_ram_address_conflict_synthesis_bug_workaround: bool,

    // Test code extraction
    pub extract_test_code: bool,
    pub etc_disable_instance_extraction: bool,
    pub etc_disable_register_extraction: bool,
    pub etc_disable_module_inlining: bool,

    // Hardware lowering
    pub verification_flavor: VerificationFlavor,
    pub emit_separate_always_blocks: bool,
    pub clock_gate: ClockGateOptions,
    pub fixup_eicg_wrapper: bool,
    pub select_default_instance_choice: bool,
    pub symbolic_value_lowering: SymbolicValueLowering,

    // Export
    pub export_module_hierarchy: bool,
    pub strip_fir_debug_info: bool,
    pub strip_debug_info: bool,

    // Lint
    pub lint_static_asserts: bool,
    pub lint_xmrs_in_design: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            output_filename: "-".to_string(),
            emit_target: EmitTarget::default(),
            disable_annotations_unknown: false,
            disable_annotations_classless: false,
            lower_annotations_no_ref_type_ports: false,
            allow_adding_ports_on_public: false,
            enable_annotation_warning: false,
            output_annotation_filename: String::new(),
            probes_to_signals: false,
            preserve_aggregate: PreserveAggregate::None,
            preserve_values: None,
            vb_to_bv: false,
            build_mode: BuildMode::Default,
            enable_debug_info: false,
            disable_optimization: false,
            disable_layer_sink: false,
            disable_cse_in_classes: false,
            disable_wire_elimination: false,
            disable_aggressive_merge_connections: false,
            no_dedup: false,
            export_chisel_interface: false,
            chisel_interface_out_dir: String::new(),
            companion_mode: CompanionMode::Bind,
            add_companion_assume: false,
            black_box_root_path: String::new(),
            lower_memories: false,
            repl_seq_mem: false,
            repl_seq_mem_file: String::new(),
            ignore_read_enable_mem: false,
            disable_random: RandomKind::None,
            add_mux_pragmas: false,
            add_vivado_ram_address_conflict_synthesis_bug_workaround: false,
            extract_test_code: false,
            etc_disable_instance_extraction: false,
            etc_disable_register_extraction: false,
            etc_disable_module_inlining: false,
            verification_flavor: VerificationFlavor::None,
            emit_separate_always_blocks: false,
            clock_gate: ClockGateOptions::default(),
            fixup_eicg_wrapper: false,
            select_default_instance_choice: false,
            symbolic_value_lowering: SymbolicValueLowering::ExtModule,
            export_module_hierarchy: false,
            strip_fir_debug_info: true,
            strip_debug_info: false,
            lint_static_asserts: true,
            lint_xmrs_in_design: true,
        }
    }
}

impl Configuration {
    /// Reject contradictory option combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repl_seq_mem && self.repl_seq_mem_file.is_empty() {
            return Err(ConfigErrorKind::MissingReplSeqMemFile.into());
        }
        if self.emit_target == EmitTarget::SplitVerilog && self.is_default_output_filename() {
            return Err(ConfigErrorKind::SplitOutputToStdout.into());
        }
        let gate = &self.clock_gate;
        for (field, value) in [
            ("module", &gate.module_name),
            ("input", &gate.input_name),
            ("output", &gate.output_name),
            ("enable", &gate.enable_name),
        ] {
            if value.is_empty() {
                return Err(ConfigErrorKind::EmptyClockGateName(field).into());
            }
        }

        if !self.extract_test_code
            && (self.etc_disable_instance_extraction
                || self.etc_disable_register_extraction
                || self.etc_disable_module_inlining)
        {
            warn!("test code extraction options have no effect without --extract-test-code");
        }
        Ok(())
    }

    pub fn should_disable_optimization(&self) -> bool {
        self.disable_optimization
    }

    pub fn should_enable_debug_info(&self) -> bool {
        self.enable_debug_info || self.build_mode == BuildMode::Debug
    }

    pub fn should_dedup(&self) -> bool {
        !self.no_dedup
    }

    /// Name preservation policy, falling back to the build mode's default.
    pub fn effective_preserve_mode(&self) -> PreserveValues {
        self.preserve_values.unwrap_or(match self.build_mode {
            BuildMode::Debug => PreserveValues::Named,
            BuildMode::Default | BuildMode::Release => PreserveValues::None,
        })
    }

    /// Whether randomization of `kind` is still emitted.
    pub fn is_random_enabled(&self, kind: RandomKind) -> bool {
        self.disable_random != RandomKind::All && self.disable_random != kind
    }

    pub fn is_default_output_filename(&self) -> bool {
        self.output_filename == "-"
    }

    /// Output path with stdout mapped to the empty string.
    pub fn output_directory(&self) -> &str {
        if self.is_default_output_filename() {
            ""
        } else {
            &self.output_filename
        }
    }

    pub fn read_enable_mode(&self) -> ReadEnableMode {
        if self.ignore_read_enable_mem {
            ReadEnableMode::Ignore
        } else {
            ReadEnableMode::Undefined
        }
    }

    /// Root for black-box sources: the explicit path, or the input file's directory.
    pub fn black_box_root(&self, input_filename: &str) -> String {
        if !self.black_box_root_path.is_empty() {
            return self.black_box_root_path.clone();
        }
        Path::new(input_filename)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
