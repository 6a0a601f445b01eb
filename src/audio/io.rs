//! WAV file I/O
//!
//! Samples are kept in the file's own format so a rewritten file has the
//! same spec and bit depth as the source.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{MorphError, Result};

/// Interleaved sample data in the file's native representation
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::Int(s) => s.len(),
            Samples::Float(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct WavData {
    pub spec: WavSpec,
    pub samples: Samples,
}

impl WavData {
    pub fn channels(&self) -> usize {
        usize::from(self.spec.channels.max(1))
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels()
    }

    /// Length in whole milliseconds
    pub fn duration_ms(&self) -> u64 {
        if self.spec.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / u64::from(self.spec.sample_rate)
    }

    /// Samples scaled to [-1.0, 1.0] relative to full scale
    pub fn normalized(&self) -> Vec<f32> {
        match &self.samples {
            Samples::Float(s) => s.clone(),
            Samples::Int(s) => {
                let full_scale = (1u64 << (self.spec.bits_per_sample.max(1) - 1)) as f32;
                s.iter().map(|&x| x as f32 / full_scale).collect()
            }
        }
    }

    /// Copy of this audio starting at `frame`
    pub fn from_frame(&self, frame: usize) -> WavData {
        let start = frame.min(self.frames()) * self.channels();
        let samples = match &self.samples {
            Samples::Int(s) => Samples::Int(s[start..].to_vec()),
            Samples::Float(s) => Samples::Float(s[start..].to_vec()),
        };
        WavData {
            spec: self.spec,
            samples,
        }
    }
}

/// Read a WAV file
pub fn read_wav(path: &Path) -> Result<WavData> {
    if !path.exists() {
        return Err(MorphError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let invalid = |e: hound::Error| MorphError::InvalidAudio {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let reader = WavReader::open(path).map_err(invalid)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Int => Samples::Int(
            reader
                .into_samples::<i32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(invalid)?,
        ),
        SampleFormat::Float => Samples::Float(
            reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(invalid)?,
        ),
    };

    Ok(WavData { spec, samples })
}

/// Write a WAV file with the data's own spec
pub fn write_wav(path: &Path, data: &WavData) -> Result<()> {
    let mut writer = WavWriter::create(path, data.spec)?;
    match &data.samples {
        Samples::Int(s) => {
            for &sample in s {
                writer.write_sample(sample)?;
            }
        }
        Samples::Float(s) => {
            for &sample in s {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}
