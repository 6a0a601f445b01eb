//! morphkit CLI
//!
//! Command-line interface for generating sampler presets.

use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use morphkit::cli::{commands, Cli, Commands};
use morphkit::config::RunConfig;
use morphkit::{MorphError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    debug!("morphkit v{}", env!("CARGO_PKG_VERSION"));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("morphkit v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    let mut config = RunConfig::load(cli.config.as_deref())?;

    match command {
        Commands::Convert {
            input_dir,
            output_dir,
            transcoder,
        } => {
            if let Some(program) = transcoder {
                config.transcoder = program;
            }
            commands::convert(&config, &input_dir, output_dir.as_deref())
        }
        Commands::Presets { args, strategy } => {
            args.apply(&mut config);
            if let Some(strategy) = strategy {
                config.strategy = strategy;
            }
            commands::presets(&config)
        }
        Commands::Generate {
            args,
            prompt_influence,
            timeout,
        } => {
            args.apply(&mut config);
            if prompt_influence.is_some() {
                config.prompt_influence = prompt_influence;
            }
            if let Some(secs) = timeout {
                config.api_timeout_secs = secs;
            }
            commands::generate(&config)
        }
        Commands::Trim {
            input_dir,
            output_dir,
            threshold,
            chunk_ms,
        } => {
            if let Some(threshold) = threshold {
                config.silence.threshold_dbfs = threshold;
            }
            if let Some(chunk_ms) = chunk_ms {
                config.silence.chunk_ms = chunk_ms;
            }
            commands::trim(&config, &input_dir, &output_dir)
        }
        Commands::Inspect { path, json } => commands::inspect(&path, json),
        Commands::Template { template } => {
            commands::template(template.as_deref().or(config.template.as_deref()))
        }
    }
}

fn report_error(e: &MorphError) {
    error!("{} [{}]", e, e.error_code());
    let suggestions = e.recovery_suggestions();
    if !suggestions.is_empty() {
        eprintln!("Suggestions:");
        for suggestion in suggestions {
            eprintln!("  - {}", suggestion);
        }
    }
}
