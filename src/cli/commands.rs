//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::adapters::{convert_directory, ElevenLabsClient, FfmpegTranscoder};
use crate::audio::trim_directory;
use crate::bank::{BankAssigner, BankShape, Strategy};
use crate::config::{self, RunConfig};
use crate::error::{MorphError, Result};
use crate::generate::SynthesisPipeline;
use crate::inventory::Inventory;
use crate::preset::{read_preset, PresetTemplate, PresetWriter};
use crate::report::BatchReport;

/// Convert a directory of MP3 files to WAV.
pub fn convert(config: &RunConfig, input_dir: &Path, output_dir: Option<&Path>) -> Result<()> {
    let output_dir = output_dir.unwrap_or(input_dir);
    info!(
        "Converting MP3 files in {} -> {}",
        input_dir.display(),
        output_dir.display()
    );

    let transcoder = FfmpegTranscoder::new(config.transcoder.as_str());
    let report = convert_directory(&transcoder, input_dir, output_dir)?;
    print_report(&report, "converted");

    if let Some(reason) = report.aborted {
        return Err(MorphError::BatchAborted { reason });
    }
    Ok(())
}

/// Write presets from the samples already on disk.
pub fn presets(config: &RunConfig) -> Result<()> {
    config.validate()?;
    let template = PresetTemplate::load_or_builtin(config.template.as_deref())?;
    info!("Using template from {}", template.source().display());

    let mut inventory = Inventory::scan(&config.samples_dir, "wav")?;
    if inventory.is_empty() {
        return Err(MorphError::NoSamples {
            path: config.samples_dir.clone(),
        });
    }
    println!(
        "Found {} samples in {}",
        inventory.len(),
        inventory.dir().display()
    );

    let groups = match config.strategy {
        Strategy::SameLength => {
            inventory.probe_wav_headers();
            inventory.group_by_frames()
        }
        Strategy::Unique => BTreeMap::new(),
    };

    let mut assigner = BankAssigner::with_seed(BankShape::new(config.presets), config.seed);
    let banks = assigner.assign(config.strategy, &inventory.names(), &groups)?;

    let writer = PresetWriter::new(&template, &config.output_dir);
    let paths = writer.write_all(&banks)?;
    print_written(&paths, &config.output_dir);
    Ok(())
}

/// Synthesize samples from prompts, then write presets that use them.
pub fn generate(config: &RunConfig) -> Result<()> {
    config.validate()?;
    let template = PresetTemplate::load_or_builtin(config.template.as_deref())?;

    let api_key = config::api_key()?;
    let client = ElevenLabsClient::new(&api_key, &config.api_base_url, config.api_timeout())?;
    let transcoder = FfmpegTranscoder::new(config.transcoder.as_str());

    let prompts: Vec<String> = config
        .prompts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    info!(
        "Generating {} presets from {} prompts into {}",
        config.presets,
        prompts.len(),
        config.samples_dir.display()
    );

    let pipeline = SynthesisPipeline::new(&client, &transcoder, &config.samples_dir)
        .with_durations(config.durations.clone())
        .with_prompt_influence(config.prompt_influence);
    let mut assigner = BankAssigner::with_seed(BankShape::new(config.presets), config.seed);
    let (banks, report) = pipeline.run(&mut assigner, &prompts)?;

    print_report(&report.clips, "clips ready");
    if report.reused > 0 {
        println!("{} clips already existed and were reused", report.reused);
    }
    if report.backfilled > 0 {
        warn!("{} zones repeat another clip", report.backfilled);
    }

    let writer = PresetWriter::new(&template, &config.output_dir);
    let paths = writer.write_all(&banks)?;
    print_written(&paths, &config.output_dir);
    Ok(())
}

/// Strip leading silence from a directory of WAV files.
pub fn trim(config: &RunConfig, input_dir: &Path, output_dir: &Path) -> Result<()> {
    info!(
        "Trimming leading silence below {} dBFS ({} ms windows)",
        config.silence.threshold_dbfs, config.silence.chunk_ms
    );
    let report = trim_directory(input_dir, output_dir, &config.silence)?;
    print_report(&report, "trimmed");
    Ok(())
}

/// Print the sample layout of a preset file.
pub fn inspect(path: &Path, json: bool) -> Result<()> {
    info!("Inspecting preset: {}", path.display());
    let preset = read_preset(path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&preset)?);
        return Ok(());
    }

    println!(
        "{} ({})",
        preset.key,
        preset.name.as_deref().unwrap_or("unnamed")
    );
    println!("{:-<60}", "");
    for channel in &preset.channels {
        println!("Channel {}", channel.number);
        for (z, zone) in channel.zones.iter().enumerate() {
            let voltage = zone.min_voltage.as_deref().unwrap_or("-");
            println!("  Zone {} {:>6}  {}", z + 1, voltage, zone.sample);
        }
    }
    Ok(())
}

/// Print the template that preset commands would use.
pub fn template(path: Option<&Path>) -> Result<()> {
    let template = PresetTemplate::load_or_builtin(path)?;
    info!("Template source: {}", template.source().display());
    print!("{}", template.render());
    Ok(())
}

fn print_report(report: &BatchReport, verb: &str) {
    println!("{}", report.summary(verb));
    for (input, reason) in &report.failed {
        println!("  failed: {} ({})", input.display(), reason);
    }
}

fn print_written(paths: &[PathBuf], output_dir: &Path) {
    println!("Wrote {} presets to {}", paths.len(), output_dir.display());
    for path in paths {
        println!("  {}", path.display());
    }
}
