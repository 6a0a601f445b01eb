//! External audio transcoder
//!
//! One process per file. A converter that cannot be started (missing, not
//! executable) aborts the whole batch; a file the converter rejects is
//! logged and skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::info;

use crate::error::{MorphError, Result};
use crate::inventory::list_files;
use crate::report::BatchReport;

/// Default converter binary
pub const DEFAULT_TRANSCODER: &str = "ffmpeg";

/// Converts one audio file into another format
pub trait Transcoder {
    /// Convert `input` into `output`; the target format follows the
    /// output extension.
    fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Transcoder backed by an ffmpeg-compatible command line tool
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: String,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCODER)
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        let result = Command::new(&self.program)
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MorphError::ToolNotFound {
                    program: self.program.clone(),
                })
            }
            Err(e) => {
                return Err(MorphError::ToolFailed {
                    program: self.program.clone(),
                    source: e,
                })
            }
        };

        if !out.status.success() {
            return Err(MorphError::ConversionFailed {
                input: input.to_path_buf(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Output path for converting `input` into `output_dir` as `.wav`
pub fn wav_target(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".wav");
    output_dir.join(name)
}

/// Convert every `.mp3` in `input_dir` to `.wav` in `output_dir`
pub fn convert_directory(
    transcoder: &dyn Transcoder,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<BatchReport> {
    let inputs = list_files(input_dir, "mp3")?;
    fs::create_dir_all(output_dir).map_err(|e| MorphError::FileWriteError {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = BatchReport::default();
    for input in inputs {
        let output = wav_target(&input, output_dir);
        match transcoder.transcode(&input, &output) {
            Ok(()) => {
                info!(
                    "Converted: {} -> {}",
                    input.file_name().unwrap_or_default().to_string_lossy(),
                    output.file_name().unwrap_or_default().to_string_lossy()
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
