//! Mock adapters for testing
//!
//! Stand-ins for the external transcoder and the sound API, so batch and
//! pipeline behavior can be exercised offline. Both record their calls.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::synth::{SoundGenerator, SoundRequest};
use super::transcoder::Transcoder;
use crate::error::{MorphError, Result};

/// Frames written into each mock WAV
const MOCK_FRAMES: u32 = 441;

/// Transcoder that writes a short silent WAV instead of converting
#[derive(Debug, Default)]
pub struct MockTranscoder {
    fail_on: Vec<String>,
    missing: bool,
    calls: RefCell<Vec<PathBuf>>,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave as if the converter binary is not installed
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    /// Fail (non-zero exit) for inputs with this file name
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.fail_on.push(file_name.to_string());
        self
    }

    /// Inputs seen so far, in call order
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl Transcoder for MockTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        self.calls.borrow_mut().push(input.to_path_buf());

        if self.missing {
            return Err(MorphError::ToolNotFound {
                program: "mock-transcoder".to_string(),
            });
        }

        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_on.contains(&name) {
            return Err(MorphError::ConversionFailed {
                input: input.to_path_buf(),
                stderr: "mock conversion failure".to_string(),
            });
        }

        write_silent_wav(output, MOCK_FRAMES)
    }
}

/// Sound generator that returns a fixed payload
#[derive(Debug, Default)]
pub struct MockGenerator {
    fail_on: Vec<String>,
    requests: RefCell<Vec<SoundRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request for this prompt text
    pub fn failing_on(mut self, prompt: &str) -> Self {
        self.fail_on.push(prompt.to_string());
        self
    }

    pub fn requests(&self) -> Vec<SoundRequest> {
        self.requests.borrow().clone()
    }
}

impl SoundGenerator for MockGenerator {
    fn generate(&self, request: &SoundRequest) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail_on.contains(&request.text) {
            return Err(MorphError::SynthesisFailed {
                prompt: request.text.clone(),
                reason: "mock API error".to_string(),
            });
        }
        Ok(b"ID3\x04\x00mock".to_vec())
    }
}

fn write_silent_wav(path: &Path, frames: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for _ in 0..frames {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}
