//! ferrite pipeline driver entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command, Format};
use ferrite_passes::{Configuration, Pipeline, PipelineInputs, build_pipeline, verify_pipeline};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Pipeline {
            options,
            input,
            format,
        } => {
            let pipeline = build_or_exit(&options.into_configuration(), &PipelineInputs::new(input));
            match format {
                Format::Text => print!("{pipeline}"),
                Format::Json => print_json(&pipeline),
            }
        }
        Command::Check { options } => {
            let pipeline = build_or_exit(&options.into_configuration(), &PipelineInputs::default());
            match verify_pipeline(&pipeline) {
                Ok(()) => println!(
                    "ok: {} passes in {} stages",
                    pipeline.len(),
                    pipeline.stages.len()
                ),
                Err(violations) => {
                    for violation in &violations {
                        eprintln!("ordering violation: {violation}");
                    }
                    std::process::exit(1);
                }
            }
        }
        Command::Options { options } => print_json(&options.into_configuration()),
    }
}

fn build_or_exit(config: &Configuration, inputs: &PipelineInputs) -> Pipeline {
    debug!(emit = %config.emit_target, output = %config.output_filename, "building pipeline");
    match build_pipeline(config, inputs) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
