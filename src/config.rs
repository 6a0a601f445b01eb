//! Run configuration
//!
//! Settings come from an optional YAML file, then `MORPHKIT_*` environment
//! variables, then command-line flags (applied by the CLI layer).

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::adapters::synth::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use crate::adapters::transcoder::DEFAULT_TRANSCODER;
use crate::audio::SilenceParams;
use crate::bank::Strategy;
use crate::error::{MorphError, Result};
use crate::generate::{default_durations, default_prompts};

/// Environment variable holding the sound API key
pub const API_KEY_VAR: &str = "MORPHKIT_API_KEY";

/// Fallback API key variable
pub const LEGACY_API_KEY_VAR: &str = "API_KEY";

const DEFAULT_PRESETS: usize = 10;

/// Everything a run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Directory holding the WAV samples
    pub samples_dir: PathBuf,
    /// Directory the preset files are written to
    pub output_dir: PathBuf,
    /// Template file; the built-in layout when unset
    pub template: Option<PathBuf>,
    /// Number of presets to generate
    pub presets: usize,
    pub strategy: Strategy,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Converter binary
    pub transcoder: String,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub prompt_influence: Option<f32>,
    pub prompts: Vec<String>,
    /// Clip durations in seconds, indexed by zone
    pub durations: Vec<f32>,
    pub silence: SilenceParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            samples_dir: PathBuf::from("samples"),
            output_dir: PathBuf::from("presets"),
            template: None,
            presets: DEFAULT_PRESETS,
            strategy: Strategy::default(),
            seed: None,
            transcoder: DEFAULT_TRANSCODER.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            api_timeout_secs: DEFAULT_TIMEOUT_SECS,
            prompt_influence: None,
            prompts: default_prompts(),
            durations: default_durations(),
            silence: SilenceParams::default(),
        }
    }
}

impl RunConfig {
    /// Load the file (if any) and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MorphError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text).map_err(|e| MorphError::InvalidConfig {
            reason: format!("{}: {}", path.display(), e),
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(text)?)
    }

    /// Apply `MORPHKIT_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MORPHKIT_SAMPLES_DIR") {
            self.samples_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MORPHKIT_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MORPHKIT_TEMPLATE") {
            self.template = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("MORPHKIT_PRESETS") {
            self.presets = parse_var("MORPHKIT_PRESETS", &v)?;
        }
        if let Some(v) = lookup("MORPHKIT_STRATEGY") {
            self.strategy = <Strategy as ValueEnum>::from_str(&v, true).map_err(|e| {
                MorphError::InvalidConfig {
                    reason: format!("MORPHKIT_STRATEGY: {e}"),
                }
            })?;
        }
        if let Some(v) = lookup("MORPHKIT_SEED") {
            self.seed = Some(parse_var("MORPHKIT_SEED", &v)?);
        }
        if let Some(v) = lookup("MORPHKIT_TRANSCODER") {
            self.transcoder = v;
        }
        if let Some(v) = lookup("MORPHKIT_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("MORPHKIT_API_TIMEOUT_SECS") {
            self.api_timeout_secs = parse_var("MORPHKIT_API_TIMEOUT_SECS", &v)?;
        }
        Ok(())
    }

    /// Check ranges once all layers are applied
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(MorphError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.presets == 0 {
            return invalid("presets must be at least 1");
        }
        if self.api_timeout_secs == 0 {
            return invalid("api_timeout_secs must be at least 1");
        }
        if self.prompts.iter().all(|p| p.trim().is_empty()) {
            return invalid("prompts must contain at least one non-empty prompt");
        }
        if self.durations.is_empty() || self.durations.iter().any(|d| *d <= 0.0) {
            return invalid("durations must be a non-empty list of positive seconds");
        }
        if let Some(influence) = self.prompt_influence {
            if !(0.0..=1.0).contains(&influence) {
                return invalid("prompt_influence must be between 0.0 and 1.0");
            }
        }
        self.silence.validate()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

/// Sound API key from the environment
pub fn api_key() -> Result<String> {
    api_key_from(|key| std::env::var(key).ok())
}

pub fn api_key_from<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    [API_KEY_VAR, LEGACY_API_KEY_VAR]
        .iter()
        .filter_map(|var| lookup(*var))
        .find(|key| !key.trim().is_empty())
        .ok_or(MorphError::MissingApiKey)
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| MorphError::InvalidConfig {
        reason: format!("{name}={value}: {e}"),
    })
}
