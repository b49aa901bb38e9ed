//! Command-line interface for the ferrite pipeline driver.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use ferrite_passes::{
    BuildMode, ClockGateOptions, CompanionMode, Configuration, EmitTarget, PreserveAggregate,
    PreserveValues, RandomKind, SymbolicValueLowering, VerificationFlavor,
};

#[derive(Parser)]
#[command(name = "ferrite")]
#[command(about = "Hardware compiler pipeline driver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the pass pipeline built from the given options
    Pipeline {
        #[command(flatten)]
        options: PipelineOptions,

        /// Input file; its directory is the default black-box root
        #[arg(long, value_name = "FILE", default_value = "-")]
        input: String,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Build the pipeline and check it against the pass ordering rules
    Check {
        #[command(flatten)]
        options: PipelineOptions,
    },
    /// Print the effective configuration as JSON
    Options {
        #[command(flatten)]
        options: PipelineOptions,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Flags that shape the pipeline, one per configuration field.
#[derive(Args, Debug)]
pub struct PipelineOptions {
    /// Output filename, or `-` for stdout
    #[arg(short = 'o', value_name = "FILENAME", default_value = "-")]
    pub output: String,

    #[arg(long = "emit", default_value_t = EmitTarget::Verilog)]
    pub emit_target: EmitTarget,

    // Annotations
    #[arg(long = "disable-annotation-unknown")]
    pub disable_annotations_unknown: bool,
    #[arg(long = "disable-annotation-classless")]
    pub disable_annotations_classless: bool,
    #[arg(long)]
    pub lower_annotations_no_ref_type_ports: bool,
    #[arg(long = "allow-adding-ports-on-public-modules")]
    pub allow_adding_ports_on_public: bool,
    #[arg(long = "warn-on-unprocessed-annotations")]
    pub enable_annotation_warning: bool,
    #[arg(long = "output-annotation-file", value_name = "FILENAME", default_value = "")]
    pub output_annotation_filename: String,

    // Types and values
    #[arg(long)]
    pub probes_to_signals: bool,
    #[arg(long, default_value_t = PreserveAggregate::None)]
    pub preserve_aggregate: PreserveAggregate,
    /// Defaults to `named` for debug builds and `none` otherwise
    #[arg(long)]
    pub preserve_values: Option<PreserveValues>,
    #[arg(long)]
    pub vb_to_bv: bool,

    // Optimization
    #[arg(short = 'O', value_name = "MODE", default_value_t = BuildMode::Default)]
    pub build_mode: BuildMode,
    #[arg(short = 'g')]
    pub enable_debug_info: bool,
    #[arg(long = "disable-opt")]
    pub disable_optimization: bool,
    #[arg(long)]
    pub disable_layer_sink: bool,
    #[arg(long)]
    pub disable_cse_in_classes: bool,
    #[arg(long)]
    pub disable_wire_elimination: bool,
    #[arg(long)]
    pub disable_aggressive_merge_connections: bool,
    #[arg(long)]
    pub no_dedup: bool,

    // Interfaces and companions
    #[arg(long)]
    pub export_chisel_interface: bool,
    #[arg(long = "chisel-interface-out-dir", value_name = "DIR", default_value = "")]
    pub chisel_interface_out_dir: String,
    #[arg(long = "grand-central-companion-mode", default_value_t = CompanionMode::Bind)]
    pub companion_mode: CompanionMode,
    #[arg(long)]
    pub add_companion_assume: bool,
    #[arg(long = "blackbox-path", value_name = "PATH", default_value = "")]
    pub black_box_root_path: String,

    // Memories and randomization
    #[arg(long)]
    pub lower_memories: bool,
    #[arg(long)]
    pub repl_seq_mem: bool,
    #[arg(long, value_name = "FILENAME", default_value = "")]
    pub repl_seq_mem_file: String,
    #[arg(long)]
    pub ignore_read_enable_mem: bool,
    #[arg(long)]
    pub disable_mem_randomization: bool,
    #[arg(long)]
    pub disable_reg_randomization: bool,
    #[arg(long)]
    pub disable_all_randomization: bool,
    #[arg(long)]
    pub add_mux_pragmas: bool,
    #[arg(long)]
    pub add_vivado_ram_address_conflict_synthesis_bug_workaround: bool,

    // Test code extraction
    #[arg(long)]
    pub extract_test_code: bool,
    #[arg(long)]
    pub etc_disable_instance_extraction: bool,
    #[arg(long)]
    pub etc_disable_register_extraction: bool,
    #[arg(long)]
    pub etc_disable_module_inlining: bool,

    // Hardware lowering
    #[arg(long, default_value_t = VerificationFlavor::None)]
    pub verification_flavor: VerificationFlavor,
    #[arg(long)]
    pub emit_separate_always_blocks: bool,
    #[arg(long = "ckg-name", default_value = "EICG_wrapper")]
    pub ckg_module_name: String,
    #[arg(long = "ckg-input", default_value = "in")]
    pub ckg_input_name: String,
    #[arg(long = "ckg-output", default_value = "out")]
    pub ckg_output_name: String,
    #[arg(long = "ckg-enable", default_value = "en")]
    pub ckg_enable_name: String,
    /// Empty for a gate without a test enable port
    #[arg(long = "ckg-test-enable", default_value = "test_en")]
    pub ckg_test_enable_name: String,
    #[arg(long = "ckg-instance", default_value = "ckg")]
    pub ckg_instance_name: String,
    #[arg(long = "fixup-eicg-wrapper")]
    pub fixup_eicg_wrapper: bool,
    #[arg(long = "select-default-for-unspecified-instance-choice")]
    pub select_default_instance_choice: bool,
    #[arg(long = "symbolic-values", default_value_t = SymbolicValueLowering::ExtModule)]
    pub symbolic_value_lowering: SymbolicValueLowering,

    // Export
    #[arg(long)]
    pub export_module_hierarchy: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub strip_fir_debug_info: bool,
    #[arg(long)]
    pub strip_debug_info: bool,

    // Lint
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub lint_static_asserts: bool,
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub lint_xmrs_in_design: bool,
}

impl PipelineOptions {
    fn disable_random(&self) -> RandomKind {
        match (
            self.disable_all_randomization,
            self.disable_mem_randomization,
            self.disable_reg_randomization,
        ) {
            (true, _, _) | (false, true, true) => RandomKind::All,
            (false, true, false) => RandomKind::Mem,
            (false, false, true) => RandomKind::Reg,
            (false, false, false) => RandomKind::None,
        }
    }

    pub fn into_configuration(self) -> Configuration {
        Configuration {
            disable_random: self.disable_random(),
            output_filename: self.output,
            emit_target: self.emit_target,
            disable_annotations_unknown: self.disable_annotations_unknown,
            disable_annotations_classless: self.disable_annotations_classless,
            lower_annotations_no_ref_type_ports: self.lower_annotations_no_ref_type_ports,
            allow_adding_ports_on_public: self.allow_adding_ports_on_public,
            enable_annotation_warning: self.enable_annotation_warning,
            output_annotation_filename: self.output_annotation_filename,
            probes_to_signals: self.probes_to_signals,
            preserve_aggregate: self.preserve_aggregate,
            preserve_values: self.preserve_values,
            vb_to_bv: self.vb_to_bv,
            build_mode: self.build_mode,
            enable_debug_info: self.enable_debug_info,
            disable_optimization: self.disable_optimization,
            disable_layer_sink: self.disable_layer_sink,
            disable_cse_in_classes: self.disable_cse_in_classes,
            disable_wire_elimination: self.disable_wire_elimination,
            disable_aggressive_merge_connections: self.disable_aggressive_merge_connections,
            no_dedup: self.no_dedup,
            export_chisel_interface: self.export_chisel_interface,
            chisel_interface_out_dir: self.chisel_interface_out_dir,
            companion_mode: self.companion_mode,
            add_companion_assume: self.add_companion_assume,
            black_box_root_path: self.black_box_root_path,
            lower_memories: self.lower_memories,
            repl_seq_mem: self.repl_seq_mem,
            repl_seq_mem_file: self.repl_seq_mem_file,
            ignore_read_enable_mem: self.ignore_read_enable_mem,
            add_mux_pragmas: self.add_mux_pragmas,
            add_vivado_ram_address_conflict_synthesis_bug_workaround: self
                .add_vivado_ram_address_conflict_synthesis_bug_workaround,
            extract_test_code: self.extract_test_code,
            etc_disable_instance_extraction: self.etc_disable_instance_extraction,
            etc_disable_register_extraction: self.etc_disable_register_extraction,
            etc_disable_module_inlining: self.etc_disable_module_inlining,
            verification_flavor: self.verification_flavor,
            emit_separate_always_blocks: self.emit_separate_always_blocks,
            clock_gate: ClockGateOptions {
                module_name: self.ckg_module_name,
                input_name: self.ckg_input_name,
                output_name: self.ckg_output_name,
                enable_name: self.ckg_enable_name,
                test_enable_name: self.ckg_test_enable_name,
                instance_name: self.ckg_instance_name,
            },
            fixup_eicg_wrapper: self.fixup_eicg_wrapper,
            select_default_instance_choice: self.select_default_instance_choice,
            symbolic_value_lowering: self.symbolic_value_lowering,
            export_module_hierarchy: self.export_module_hierarchy,
            strip_fir_debug_info: self.strip_fir_debug_info,
            strip_debug_info: self.strip_debug_info,
            lint_static_asserts: self.lint_static_asserts,
            lint_xmrs_in_design: self.lint_xmrs_in_design,
        }
    }
}
