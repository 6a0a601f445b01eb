//! Integration Tests
//!
//! End-to-end tests for the morphkit preset pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

use morphkit::adapters::{convert_directory, FfmpegTranscoder, MockGenerator, MockTranscoder};
use morphkit::audio::{read_wav, trim_directory, SilenceParams};
use morphkit::bank::{BankAssigner, BankShape, Strategy, CHANNELS_PER_PRESET, ZONES_PER_CHANNEL};
use morphkit::generate::{default_prompts, SynthesisPipeline};
use morphkit::inventory::Inventory;
use morphkit::preset::{read_preset, Preset, PresetTemplate, PresetWriter};

/// Helper to write a mono 16-bit WAV of `frames` frames
fn write_wav(path: &Path, frames: u32, level: i16) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let sample = if i % 2 == 0 { level } else { -level };
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// Helper to create a samples directory with `count` clips
fn samples_dir(count: usize) -> TempDir {
    let dir = tempdir().unwrap();
    for i in 0..count {
        write_wav(&dir.path().join(format!("clip_{i:03}.wav")), 80, 1000);
    }
    dir
}

fn run_presets(
    inventory: &mut Inventory,
    strategy: Strategy,
    presets: usize,
    output_dir: &Path,
) -> Vec<PathBuf> {
    let template = PresetTemplate::builtin().unwrap();
    let groups = match strategy {
        Strategy::SameLength => {
            inventory.probe_wav_headers();
            inventory.group_by_frames()
        }
        Strategy::Unique => BTreeMap::new(),
    };
    let mut assigner = BankAssigner::with_seed(BankShape::new(presets), Some(42));
    let banks = assigner
        .assign(strategy, &inventory.names(), &groups)
        .unwrap();
    PresetWriter::new(&template, output_dir).write_all(&banks).unwrap()
}

fn assert_full_preset(preset: &Preset) {
    assert_eq!(preset.channels.len(), CHANNELS_PER_PRESET);
    for channel in &preset.channels {
        assert_eq!(channel.zones.len(), ZONES_PER_CHANNEL);
    }
}

// === Preset Pipeline Tests ===

#[test]
fn test_presets_have_full_shape_and_known_samples() {
    let samples = samples_dir(100);
    let out = tempdir().unwrap();
    let mut inventory = Inventory::scan(samples.path(), "wav").unwrap();

    let paths = run_presets(&mut inventory, Strategy::Unique, 3, out.path());

    assert_eq!(paths.len(), 3);
    for (i, path) in paths.iter().enumerate() {
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("prst{:03}.yml", i + 1)
        );
        let preset = read_preset(path).unwrap();
        assert_full_preset(&preset);
        assert_eq!(preset.number, Some(i as u32 + 1));
        assert_eq!(preset.name.as_deref(), Some(format!("Pre{}", i + 1).as_str()));
        assert!(preset.samples().all(|s| inventory.contains(s)));
    }
}

#[test]
fn test_preset_files_are_valid_yaml() {
    let samples = samples_dir(64);
    let out = tempdir().unwrap();
    let mut inventory = Inventory::scan(samples.path(), "wav").unwrap();

    let paths = run_presets(&mut inventory, Strategy::Unique, 1, out.path());
    let text = fs::read_to_string(&paths[0]).unwrap();
    let value: serde_yml::Value = serde_yml::from_str(&text).unwrap();

    let zone = &value["Preset 1"]["Channel 3"]["Zone 8"];
    assert!(zone["Sample"].as_str().unwrap().starts_with("clip_"));
    // voltages keep their template spelling
    assert!(text.contains("MinVoltage: +4.52"));
    assert!(text.contains("XfadeAWidth: 5.00"));
}

#[test]
fn test_first_preset_is_unique_with_enough_samples() {
    let samples = samples_dir(64);
    let out = tempdir().unwrap();
    let mut inventory = Inventory::scan(samples.path(), "wav").unwrap();

    let paths = run_presets(&mut inventory, Strategy::Unique, 1, out.path());
    let preset = read_preset(&paths[0]).unwrap();

    let mut names: Vec<&str> = preset.samples().collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 64);
}

#[test]
fn test_few_samples_still_fill_every_zone() {
    let samples = samples_dir(3);
    let out = tempdir().unwrap();
    let mut inventory = Inventory::scan(samples.path(), "wav").unwrap();

    let paths = run_presets(&mut inventory, Strategy::Unique, 2, out.path());

    for path in &paths {
        let preset = read_preset(path).unwrap();
        assert_full_preset(&preset);
        assert!(preset.samples().all(|s| inventory.contains(s)));
    }
}

#[test]
fn test_same_length_channels_share_frame_count() {
    let samples = tempdir().unwrap();
    for group in 0..8u32 {
        for i in 0..8 {
            write_wav(
                &samples.path().join(format!("g{group}_{i}.wav")),
                100 + group * 10,
                1000,
            );
        }
    }
    let out = tempdir().unwrap();
    let mut inventory = Inventory::scan(samples.path(), "wav").unwrap();

    let paths = run_presets(&mut inventory, Strategy::SameLength, 1, out.path());
    let preset = read_preset(&paths[0]).unwrap();

    for channel in &preset.channels {
        let prefix = &channel.zones[0].sample[..2];
        assert!(channel.samples().iter().all(|s| s.starts_with(prefix)));
    }
}

#[test]
fn test_template_loads_identically_twice() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prst015.yml");
    fs::write(&path, PresetTemplate::builtin().unwrap().render()).unwrap();

    let first = PresetTemplate::load(&path).unwrap();
    let second = PresetTemplate::load(&path).unwrap();
    assert_eq!(first, second);
}

// === Conversion Tests ===

#[test]
fn test_missing_converter_halts_batch() {
    let dir = tempdir().unwrap();
    for name in ["a.mp3", "b.mp3", "c.mp3"] {
        fs::write(dir.path().join(name), b"ID3").unwrap();
    }

    let transcoder = FfmpegTranscoder::new("morphkit-no-such-transcoder");
    let report = convert_directory(&transcoder, dir.path(), dir.path()).unwrap();

    assert!(report.processed.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(report.aborted.is_some());
}

// === Synthesis Tests ===

#[test]
fn test_generated_clips_feed_presets() {
    let samples = tempdir().unwrap();
    let out = tempdir().unwrap();
    let generator = MockGenerator::new();
    let transcoder = MockTranscoder::new();

    let pipeline = SynthesisPipeline::new(&generator, &transcoder, samples.path());
    let mut assigner = BankAssigner::with_seed(BankShape::new(2), Some(3));
    let (banks, report) = pipeline.run(&mut assigner, &default_prompts()).unwrap();
    assert!(report.clips.is_clean());

    let template = PresetTemplate::builtin().unwrap();
    let paths = PresetWriter::new(&template, out.path()).write_all(&banks).unwrap();

    let inventory = Inventory::scan(samples.path(), "wav").unwrap();
    assert_eq!(inventory.len(), 128);
    for path in &paths {
        let preset = read_preset(path).unwrap();
        assert_full_preset(&preset);
        assert!(preset.samples().all(|s| inventory.contains(s)));
    }
}

// === Silence Trimming Tests ===

#[test]
fn test_trim_directory_end_to_end() {
    let input = tempdir().unwrap();
    let output = tempdir().unwrap();

    // 400 ms of silence then 200 ms of signal at 8 kHz
    let path = input.path().join("late.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for _ in 0..3200 {
        writer.write_sample(0i16).unwrap();
    }
    for i in 0..1600 {
        writer.write_sample(if i % 2 == 0 { 8000i16 } else { -8000 }).unwrap();
    }
    writer.finalize().unwrap();
    write_wav(&input.path().join("loud.wav"), 800, 8000);

    let report = trim_directory(input.path(), output.path(), &SilenceParams::default()).unwrap();

    assert!(report.is_clean());
    assert_eq!(read_wav(&output.path().join("late.wav")).unwrap().frames(), 1600);
    assert_eq!(read_wav(&output.path().join("loud.wav")).unwrap().frames(), 800);
}
