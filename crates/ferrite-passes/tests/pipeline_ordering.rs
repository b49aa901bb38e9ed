use ferrite_passes::{
    BuildMode, Configuration, EmitTarget, Pass, PassId, Pipeline, PipelineInputs, RandomKind,
    StageName, build_pipeline, verify_pipeline,
};

fn build(config: &Configuration) -> Pipeline {
    build_pipeline(config, &PipelineInputs::new("design/top.fir")).unwrap()
}

fn configurations() -> Vec<(&'static str, Configuration)> {
    let base = Configuration::default();
    vec![
        ("default", base.clone()),
        (
            "no optimization",
            Configuration {
                disable_optimization: true,
                ..base.clone()
            },
        ),
        (
            "debug build",
            Configuration {
                build_mode: BuildMode::Debug,
                ..base.clone()
            },
        ),
        (
            "everything on",
            Configuration {
                export_chisel_interface: true,
                probes_to_signals: true,
                vb_to_bv: true,
                repl_seq_mem: true,
                repl_seq_mem_file: "mems.conf".to_string(),
                add_companion_assume: true,
                extract_test_code: true,
                export_module_hierarchy: true,
                strip_debug_info: true,
                ..base.clone()
            },
        ),
        (
            "randomization off",
            Configuration {
                disable_random: RandomKind::All,
                no_dedup: true,
                disable_layer_sink: true,
                ..base.clone()
            },
        ),
        (
            "split verilog",
            Configuration {
                emit_target: EmitTarget::SplitVerilog,
                output_filename: "build".to_string(),
                ..base.clone()
            },
        ),
        (
            "ir",
            Configuration {
                emit_target: EmitTarget::Ir,
                ..base.clone()
            },
        ),
        (
            "btor2",
            Configuration {
                emit_target: EmitTarget::Btor2,
                ..base
            },
        ),
    ]
}

#[test]
fn test_built_pipelines_satisfy_ordering_rules() {
    for (label, config) in configurations() {
        let pipeline = build(&config);
        if let Err(violations) = verify_pipeline(&pipeline) {
            let listed: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            panic!("{label}: {}", listed.join("; "));
        }
    }
}

#[test]
fn test_hierarchy_injection_scheduled_once() {
    for (label, config) in configurations() {
        let pipeline = build(&config);
        assert_eq!(
            pipeline.count_of(PassId::InjectDutHierarchy),
            1,
            "{label}"
        );
    }
}

#[test]
fn test_disabled_optimization_has_no_optimization_entries() {
    let config = Configuration {
        disable_optimization: true,
        ..Configuration::default()
    };
    let pipeline = build(&config);
    assert!(pipeline.entries().all(|(_, e)| !e.optimization));
    for id in [
        PassId::Cse,
        PassId::Canonicalize,
        PassId::ImConstProp,
        PassId::ImDeadCodeElim,
        PassId::LayerSink,
        PassId::PrettifyVerilog,
    ] {
        assert_eq!(pipeline.count_of(id), 0, "{id} still scheduled");
    }

    let optimized = build(&Configuration::default());
    assert!(optimized.len() > pipeline.len());
    assert!(optimized.count_of(PassId::Canonicalize) > 1);
}

#[test]
fn test_chisel_interface_destination() {
    let interface = |output: &str, dir: &str| {
        let config = Configuration {
            export_chisel_interface: true,
            output_filename: output.to_string(),
            chisel_interface_out_dir: dir.to_string(),
            ..Configuration::default()
        };
        build(&config)
            .entries()
            .map(|(_, e)| e.pass.clone())
            .find(|p| {
                matches!(
                    p.id(),
                    PassId::ExportChiselInterface | PassId::ExportSplitChiselInterface
                )
            })
            .unwrap()
    };

    assert_eq!(interface("-", ""), Pass::ExportChiselInterface);
    assert_eq!(
        interface("-", "iface"),
        Pass::ExportSplitChiselInterface {
            directory: "iface".to_string()
        }
    );
    assert_eq!(
        interface("out", ""),
        Pass::ExportSplitChiselInterface {
            directory: "out".to_string()
        }
    );
}

#[test]
fn test_layer_sink_precedes_reference_lowering() {
    let pipeline = build(&Configuration::default());
    let sink = pipeline.position_of(PassId::LayerSink).unwrap();
    let xmr = pipeline.position_of(PassId::LowerXmr).unwrap();
    assert!(sink < xmr);

    let without = build(&Configuration {
        disable_layer_sink: true,
        ..Configuration::default()
    });
    assert_eq!(without.position_of(PassId::LayerSink), None);
}

#[test]
fn test_black_box_root_defaults_to_input_directory() {
    let pipeline = build(&Configuration::default());
    let root = pipeline
        .entries()
        .find_map(|(_, e)| match &e.pass {
            Pass::BlackBoxReader { root } => Some(root.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(root, "design");
}

#[test]
fn test_stage_sequence_per_target() {
    let stages = |target| {
        let config = Configuration {
            emit_target: target,
            output_filename: "out".to_string(),
            ..Configuration::default()
        };
        build(&config)
            .stages
            .iter()
            .map(|s| s.name)
            .collect::<Vec<_>>()
    };
    use StageName::*;
    assert_eq!(
        stages(EmitTarget::Verilog),
        [
            Preprocess,
            HighToMid,
            MidToHw,
            HwToStructural,
            PrepareForExport,
            Finalize,
            Export
        ]
    );
    assert_eq!(
        stages(EmitTarget::Ir),
        [Preprocess, HighToMid, MidToHw, HwToStructural, Finalize]
    );
    assert_eq!(
        stages(EmitTarget::Btor2),
        [Preprocess, HighToMid, MidToHw, Finalize, Export]
    );
}

#[test]
fn test_pipeline_survives_json() {
    let config = Configuration {
        extract_test_code: true,
        ..Configuration::default()
    };
    let pipeline = build(&config);
    let json = serde_json::to_string(&pipeline).unwrap();
    let back: Pipeline = serde_json::from_str(&json).unwrap();
    assert_eq!(back, pipeline);
    assert_eq!(back.to_string(), pipeline.to_string());
}
