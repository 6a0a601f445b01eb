//! Leading silence removal
//!
//! Audio is walked from the start in fixed windows; the first window whose
//! level reaches the threshold marks the cut point.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::io::{read_wav, write_wav, WavData};
use crate::error::{MorphError, Result};
use crate::inventory::list_files;
use crate::report::BatchReport;

pub const DEFAULT_THRESHOLD_DBFS: f64 = -35.0;
pub const DEFAULT_CHUNK_MS: u32 = 100;

/// Detection settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilenceParams {
    /// Windows quieter than this (dBFS) count as silence
    pub threshold_dbfs: f64,
    /// Window size in milliseconds
    pub chunk_ms: u32,
}

impl Default for SilenceParams {
    fn default() -> Self {
        Self {
            threshold_dbfs: DEFAULT_THRESHOLD_DBFS,
            chunk_ms: DEFAULT_CHUNK_MS,
        }
    }
}

impl SilenceParams {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_ms == 0 {
            return Err(MorphError::InvalidConfig {
                reason: "silence chunk size must be at least 1 ms".to_string(),
            });
        }
        if self.threshold_dbfs.is_nan() || self.threshold_dbfs > 0.0 {
            return Err(MorphError::InvalidConfig {
                reason: format!(
                    "silence threshold must be a dBFS value <= 0, got {}",
                    self.threshold_dbfs
                ),
            });
        }
        Ok(())
    }
}

/// RMS level of normalized samples in dBFS; `-inf` for digital silence
pub fn rms_dbfs(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let sum_sq: f64 = samples.iter().map(|&x| f64::from(x) * f64::from(x)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms == 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * rms.log10()
    }
}

/// Milliseconds of leading silence, capped at the audio length
pub fn detect_leading_silence(audio: &WavData, params: &SilenceParams) -> u64 {
    let rate = u64::from(audio.spec.sample_rate);
    let length_ms = audio.duration_ms();
    if rate == 0 {
        return 0;
    }

    let channels = audio.channels();
    let frames = audio.frames();
    let normalized = audio.normalized();
    let chunk = u64::from(params.chunk_ms.max(1));
    let frame_at = |ms: u64| ((ms * rate / 1000) as usize).min(frames);

    let mut trim_ms = 0;
    while trim_ms < length_ms {
        let window = &normalized[frame_at(trim_ms) * channels..frame_at(trim_ms + chunk) * channels];
        if rms_dbfs(window) >= params.threshold_dbfs {
            break;
        }
        trim_ms += chunk;
    }
    trim_ms.min(length_ms)
}

/// Result of trimming one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimOutcome {
    pub trimmed_ms: u64,
    pub remaining_frames: usize,
}

/// Write `input` minus its leading silence to `output`
pub fn strip_leading_silence(
    input: &Path,
    output: &Path,
    params: &SilenceParams,
) -> Result<TrimOutcome> {
    if same_file(input, output) {
        return Err(MorphError::InPlaceOverwrite {
            path: input.to_path_buf(),
        });
    }

    let audio = read_wav(input)?;
    let trimmed_ms = detect_leading_silence(&audio, params);
    let start = (trimmed_ms * u64::from(audio.spec.sample_rate) / 1000) as usize;
    let trimmed = audio.from_frame(start);

    if trimmed.samples.is_empty() && !audio.samples.is_empty() {
        warn!("{} is silent throughout; writing empty audio", input.display());
    }

    write_wav(output, &trimmed)?;

    Ok(TrimOutcome {
        trimmed_ms,
        remaining_frames: trimmed.frames(),
    })
}

/// Trim every `.wav` in `input_dir` into `output_dir`
pub fn trim_directory(
    input_dir: &Path,
    output_dir: &Path,
    params: &SilenceParams,
) -> Result<BatchReport> {
    params.validate()?;
    if same_file(input_dir, output_dir) {
        return Err(MorphError::InPlaceOverwrite {
            path: input_dir.to_path_buf(),
        });
    }

    let inputs = list_files(input_dir, "wav")?;
    fs::create_dir_all(output_dir).map_err(|e| MorphError::FileWriteError {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = BatchReport::default();
    for input in inputs {
        let output = output_dir.join(input.file_name().unwrap_or_default());
        match strip_leading_silence(&input, &output, params) {
            Ok(outcome) => {
                info!(
                    "Trimmed {} ms from {}",
                    outcome.trimmed_ms,
                    input.file_name().unwrap_or_default().to_string_lossy()
                );
                report.processed.push(output);
            }
            Err(e) => {
                if report.record_failure(&input, &e) {
                    break;
                }
            }
        }
    }
    Ok(report)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
