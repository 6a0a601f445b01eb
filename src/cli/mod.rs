//! CLI Module
//!
//! Command-line interface for morphkit.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::bank::Strategy;
use crate::config::RunConfig;

/// morphkit - sampler preset generation toolkit
#[derive(Parser, Debug)]
#[command(name = "morphkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// YAML run configuration
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by the preset-writing commands
#[derive(Args, Debug, Default, Clone)]
pub struct PresetArgs {
    /// Directory holding the WAV samples
    #[arg(short, long)]
    pub samples_dir: Option<PathBuf>,

    /// Directory to write preset files into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Template preset file (built-in layout if omitted)
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Number of presets to write
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// RNG seed for reproducible assignment
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PresetArgs {
    /// Layer these flags over the loaded configuration
    pub fn apply(&self, config: &mut RunConfig) {
        if let Some(dir) = &self.samples_dir {
            config.samples_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(template) = &self.template {
            config.template = Some(template.clone());
        }
        if let Some(count) = self.count {
            config.presets = count;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every MP3 in a directory to WAV
    #[command(name = "convert")]
    Convert {
        /// Directory containing MP3 files
        input_dir: PathBuf,

        /// Output directory (defaults to the input directory)
        output_dir: Option<PathBuf>,

        /// Converter binary
        #[arg(long)]
        transcoder: Option<String>,
    },

    /// Write presets from existing samples
    #[command(name = "presets")]
    Presets {
        #[command(flatten)]
        args: PresetArgs,

        /// Sample selection strategy
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,
    },

    /// Synthesize samples from text prompts, then write presets
    #[command(name = "generate")]
    Generate {
        #[command(flatten)]
        args: PresetArgs,

        /// How strongly the API follows the prompt (0.0 - 1.0)
        #[arg(long)]
        prompt_influence: Option<f32>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Strip leading silence from every WAV in a directory
    #[command(name = "trim")]
    Trim {
        /// Directory containing WAV files
        input_dir: PathBuf,

        /// Output directory (must differ from the input)
        output_dir: PathBuf,

        /// Silence threshold in dBFS
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,

        /// Detection window in milliseconds
        #[arg(long)]
        chunk_ms: Option<u32>,
    },

    /// Show the sample layout of a preset file
    #[command(name = "inspect")]
    Inspect {
        /// Preset file
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the preset template in effect
    #[command(name = "template")]
    Template {
        /// Template file (built-in layout if omitted)
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
}
