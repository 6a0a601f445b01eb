//! Sample synthesis pipeline
//!
//! Prompts are assigned to (preset, channel, zone) slots the same way
//! samples are, each slot is rendered to a WAV clip, and the resulting clip
//! names come back as banks ready for the preset writer.

pub mod prompts;

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::Rng;
use serde::Serialize;

use crate::adapters::{synthesize_clip, ClipOutcome, SoundGenerator, SoundRequest, Transcoder};
use crate::bank::{fill_bank, BankAssigner, PresetBanks};
use crate::error::{MorphError, Result};
use crate::report::BatchReport;

pub use prompts::{default_durations, default_prompts, DEFAULT_DURATIONS, DEFAULT_PROMPTS};

/// File name of one clip; all indices are 1-based
pub fn clip_file_name(preset: usize, channel: usize, zone: usize) -> String {
    format!("sound_p{preset}_c{channel}_{zone}.wav")
}

/// Outcome of a synthesis run
#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    /// Clips on disk after the run, plus per-clip failures
    pub clips: BatchReport,
    /// Clips that already existed and were not requested again
    pub reused: usize,
    /// Zones filled by repeating another clip
    pub backfilled: usize,
}

/// Renders prompt banks into WAV clips
pub struct SynthesisPipeline<'a> {
    generator: &'a dyn SoundGenerator,
    transcoder: &'a dyn Transcoder,
    samples_dir: PathBuf,
    durations: Vec<f32>,
    prompt_influence: Option<f32>,
}

impl<'a> SynthesisPipeline<'a> {
    pub fn new(
        generator: &'a dyn SoundGenerator,
        transcoder: &'a dyn Transcoder,
        samples_dir: &Path,
    ) -> Self {
        Self {
            generator,
            transcoder,
            samples_dir: samples_dir.to_path_buf(),
            durations: default_durations(),
            prompt_influence: None,
        }
    }

    pub fn with_durations(mut self, durations: Vec<f32>) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_prompt_influence(mut self, influence: Option<f32>) -> Self {
        self.prompt_influence = influence;
        self
    }

    pub fn samples_dir(&self) -> &Path {
        &self.samples_dir
    }

    /// Duration for a 0-based zone index
    pub fn duration_for(&self, zone: usize) -> f32 {
        self.durations[zone % self.durations.len()]
    }

    /// Generate clips for every slot and return their file names as banks.
    ///
    /// Per-clip failures are collected and the affected zones backfilled
    /// from the bank's other clips, or from the whole run when the bank has
    /// none. A missing transcoder stops the run with an error.
    pub fn run<R: Rng>(
        &self,
        assigner: &mut BankAssigner<R>,
        prompts: &[String],
    ) -> Result<(Vec<PresetBanks>, GenerationReport)> {
        if self.durations.is_empty() || self.durations.iter().any(|d| *d <= 0.0) {
            return Err(MorphError::InvalidConfig {
                reason: "durations must be a non-empty list of positive seconds".to_string(),
            });
        }

        let prompt_banks = assigner.assign_unique(prompts)?;
        fs::create_dir_all(&self.samples_dir).map_err(|e| MorphError::FileWriteError {
            path: self.samples_dir.clone(),
            source: e,
        })?;

        let mut report = GenerationReport::default();
        let mut clip_banks: Vec<PresetBanks> = Vec::with_capacity(prompt_banks.len());

        for (p, preset) in prompt_banks.iter().enumerate() {
            let mut banks = Vec::with_capacity(preset.len());
            for (c, bank) in preset.iter().enumerate() {
                let mut clips = Vec::with_capacity(bank.len());
                for (z, prompt) in bank.iter().enumerate() {
                    let name = clip_file_name(p + 1, c + 1, z + 1);
                    let wav_path = self.samples_dir.join(&name);
                    let request = SoundRequest::new(prompt.as_str(), self.duration_for(z))
                        .with_prompt_influence(self.prompt_influence);

                    match synthesize_clip(self.generator, self.transcoder, &request, &wav_path) {
                        Ok(outcome) => {
                            if outcome == ClipOutcome::Reused {
                                report.reused += 1;
                            }
                            report.clips.processed.push(wav_path);
                            clips.push(name);
                        }
                        Err(e) => {
                            if report.clips.record_failure(&wav_path, &e) {
                                return Err(e);
                            }
                        }
                    }
                }
                banks.push(clips);
            }
            clip_banks.push(banks);
        }

        report.backfilled = self.backfill(&mut clip_banks, assigner.shape().zones)?;
        info!(
            "Synthesis finished: {} clips ({} reused), {} failed, {} zones backfilled",
            report.clips.processed.len(),
            report.reused,
            report.clips.failed.len(),
            report.backfilled
        );
        Ok((clip_banks, report))
    }

    fn backfill(&self, clip_banks: &mut [PresetBanks], zones: usize) -> Result<usize> {
        let all_clips: Vec<String> = clip_banks.iter().flatten().flatten().cloned().collect();
        if all_clips.is_empty() {
            return Err(MorphError::NoSamples {
                path: self.samples_dir.clone(),
            });
        }

        let mut backfilled = 0;
        for bank in clip_banks.iter_mut().flatten() {
            if bank.len() >= zones {
                continue;
            }
            let missing = zones - bank.len();
            let source = if bank.is_empty() {
                warn!("Bank has no clips, filling from the whole run");
                all_clips.clone()
            } else {
                bank.clone()
            };
            bank.extend(fill_bank(&source, missing));
            backfilled += missing;
        }
        Ok(backfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockGenerator, MockTranscoder};
    use crate::bank::{BankShape, CHANNELS_PER_PRESET, ZONES_PER_CHANNEL};
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn assigner(presets: usize) -> BankAssigner<StdRng> {
        BankAssigner::with_seed(BankShape::new(presets), Some(11))
    }

    fn prompts(count: usize) -> Vec<String> {
        default_prompts().into_iter().take(count).collect()
    }

    fn assert_full_shape(banks: &[PresetBanks]) {
        for preset in banks {
            assert_eq!(preset.len(), CHANNELS_PER_PRESET);
            for bank in preset {
                assert_eq!(bank.len(), ZONES_PER_CHANNEL);
            }
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_PROMPTS.len(), 64);
        assert_eq!(default_durations(), vec![10.0, 8.0, 12.0, 6.0, 10.0, 8.0, 12.0, 6.0]);
        assert_eq!(clip_file_name(2, 3, 8), "sound_p2_c3_8.wav");
    }

    #[test]
    fn test_generates_every_slot() {
        let dir = tempdir().unwrap();
        let generator = MockGenerator::new();
        let transcoder = MockTranscoder::new();
        let pipeline = SynthesisPipeline::new(&generator, &transcoder, dir.path());

        let (banks, report) = pipeline.run(&mut assigner(1), &default_prompts()).unwrap();

        assert_full_shape(&banks);
        assert_eq!(report.clips.processed.len(), 64);
        assert!(report.clips.is_clean());
        assert_eq!(report.backfilled, 0);
        assert!(dir.path().join("sound_p1_c8_8.wav").exists());

        // 64 prompts for 64 slots: every prompt used once
        let requests = generator.requests();
        let texts: HashSet<_> = requests.iter().map(|r| r.text.clone()).collect();
        assert_eq!(texts.len(), 64);
        assert!(requests.iter().all(|r| r.prompt_influence.is_none()));
    }

    #[test]
    fn test_durations_follow_zone_index() {
        let dir = tempdir().unwrap();
        let generator = MockGenerator::new();
        let transcoder = MockTranscoder::new();
        let pipeline = SynthesisPipeline::new(&generator, &transcoder, dir.path())
            .with_durations(vec![3.0, 5.0])
            .with_prompt_influence(Some(0.4));

        pipeline.run(&mut assigner(1), &prompts(8)).unwrap();

        let requests = generator.requests();
        assert_eq!(requests[0].duration_seconds, 3.0);
        assert_eq!(requests[1].duration_seconds, 5.0);
        assert_eq!(requests[2].duration_seconds, 3.0);
        assert_eq!(requests[0].prompt_influence, Some(0.4));
    }

    #[test]
    fn test_second_run_reuses_clips() {
        let dir = tempdir().unwrap();
        let transcoder = MockTranscoder::new();
        let first = MockGenerator::new();
        SynthesisPipeline::new(&first, &transcoder, dir.path())
            .run(&mut assigner(1), &default_prompts())
            .unwrap();

        let second = MockGenerator::new();
        let (_, report) = SynthesisPipeline::new(&second, &transcoder, dir.path())
            .run(&mut assigner(1), &default_prompts())
            .unwrap();

        assert_eq!(report.reused, 64);
        assert!(second.requests().is_empty());
    }

    #[test]
    fn test_failed_clips_are_backfilled_within_bank() {
        let dir = tempdir().unwrap();
        let pool = prompts(8);
        let generator = MockGenerator::new().failing_on(&pool[0]);
        let transcoder = MockTranscoder::new();
        let pipeline = SynthesisPipeline::new(&generator, &transcoder, dir.path());

        let (banks, report) = pipeline.run(&mut assigner(1), &pool).unwrap();

        assert_full_shape(&banks);
        // each channel draws the same 8 prompts, so each loses one clip
        assert_eq!(report.clips.failed.len(), 8);
        assert_eq!(report.backfilled, 8);
        for (c, bank) in banks[0].iter().enumerate() {
            let own = format!("sound_p1_c{}_", c + 1);
            assert!(bank.iter().all(|name| name.starts_with(&own)));
        }
    }

    #[test]
    fn test_empty_bank_filled_from_run() {
        let dir = tempdir().unwrap();
        let transcoder = MockTranscoder::new();
        let pipeline_gen = MockGenerator::new();
        let pipeline = SynthesisPipeline::new(&pipeline_gen, &transcoder, dir.path());

        let mut banks: Vec<PresetBanks> = vec![vec![vec!["a.wav".to_string()], Vec::new()]];
        let filled = pipeline.backfill(&mut banks, 4).unwrap();

        assert_eq!(filled, 7);
        assert_eq!(banks[0][0], vec!["a.wav"; 4]);
        assert_eq!(banks[0][1], vec!["a.wav"; 4]);
    }

    #[test]
    fn test_all_failed_is_no_samples() {
        let dir = tempdir().unwrap();
        let pool = prompts(1);
        let generator = MockGenerator::new().failing_on(&pool[0]);
        let transcoder = MockTranscoder::new();

        let err = SynthesisPipeline::new(&generator, &transcoder, dir.path())
            .run(&mut assigner(1), &pool)
            .unwrap_err();

        assert_eq!(err.error_code(), "NO_SAMPLES");
    }

    #[test]
    fn test_missing_transcoder_stops_run() {
        let dir = tempdir().unwrap();
        let generator = MockGenerator::new();
        let transcoder = MockTranscoder::missing();

        let err = SynthesisPipeline::new(&generator, &transcoder, dir.path())
            .run(&mut assigner(2), &default_prompts())
            .unwrap_err();

        assert_eq!(err.error_code(), "TOOL_NOT_FOUND");
        assert_eq!(generator.requests().len(), 1);
    }

    #[test]
    fn test_rejects_bad_durations() {
        let dir = tempdir().unwrap();
        let generator = MockGenerator::new();
        let transcoder = MockTranscoder::new();
        let err = SynthesisPipeline::new(&generator, &transcoder, dir.path())
            .with_durations(Vec::new())
            .run(&mut assigner(1), &prompts(8))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
