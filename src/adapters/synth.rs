//! Cloud sound-effect generation
//!
//! Sends one text prompt per request to the sound-generation endpoint and
//! turns the returned MP3 payload into a WAV clip through the transcoder.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use tempfile::Builder;

use super::transcoder::Transcoder;
use crate::error::{MorphError, Result};

/// Default API host
pub const DEFAULT_API_BASE: &str = "https://api.elevenlabs.io";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// One clip to generate
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SoundRequest {
    pub text: String,
    pub duration_seconds: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_influence: Option<f32>,
}

impl SoundRequest {
    pub fn new(text: impl Into<String>, duration_seconds: f32) -> Self {
        Self {
            text: text.into(),
            duration_seconds,
            prompt_influence: None,
        }
    }

    pub fn with_prompt_influence(mut self, influence: Option<f32>) -> Self {
        self.prompt_influence = influence;
        self
    }
}

/// Produces encoded audio (MP3) for a text prompt
pub trait SoundGenerator {
    fn generate(&self, request: &SoundRequest) -> Result<Vec<u8>>;
}

/// Client for the ElevenLabs sound-generation API
pub struct ElevenLabsClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    #[cfg(feature = "synth")]
    client: reqwest::blocking::Client,
}

impl ElevenLabsClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(MorphError::MissingApiKey);
        }

        #[cfg(feature = "synth")]
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MorphError::InvalidConfig {
                reason: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            #[cfg(feature = "synth")]
            client,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/v1/sound-generation", self.base_url)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for ElevenLabsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl SoundGenerator for ElevenLabsClient {
    #[cfg(feature = "synth")]
    fn generate(&self, request: &SoundRequest) -> Result<Vec<u8>> {
        let failed = |reason: String| MorphError::SynthesisFailed {
            prompt: request.text.clone(),
            reason,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", self.api_key.as_str())
            .json(request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    failed(format!("timed out after {:?}", self.timeout))
                } else if e.is_connect() {
                    failed(format!("cannot connect to {}: {}", self.base_url, e))
                } else {
                    failed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(failed(format!("API returned {status}: {}", body.trim())));
        }

        let bytes = response.bytes().map_err(|e| failed(e.to_string()))?;
        if bytes.is_empty() {
            return Err(failed("API returned an empty payload".to_string()));
        }
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "synth"))]
    fn generate(&self, request: &SoundRequest) -> Result<Vec<u8>> {
        Err(MorphError::SynthesisFailed {
            prompt: request.text.clone(),
            reason: "sound generation not compiled. Build with --features synth".to_string(),
        })
    }
}

/// What happened to one clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    Generated,
    /// The WAV already existed and no request was made
    Reused,
}

/// Generate one clip into `wav_path`.
///
/// The MP3 payload goes to a temporary file next to the target, is
/// converted, and the temporary file is removed.
pub fn synthesize_clip(
    generator: &dyn SoundGenerator,
    transcoder: &dyn Transcoder,
    request: &SoundRequest,
    wav_path: &Path,
) -> Result<ClipOutcome> {
    if wav_path.exists() {
        debug!("{} already exists, skipping generation", wav_path.display());
        return Ok(ClipOutcome::Reused);
    }

    info!(
        "Generating: {} ({}s) -> {}",
        request.text,
        request.duration_seconds,
        wav_path.display()
    );
    let audio = generator.generate(request)?;

    let dir = wav_path.parent().unwrap_or_else(|| Path::new("."));
    let mut mp3 = Builder::new()
        .prefix(".morphkit-")
        .suffix(".mp3")
        .tempfile_in(dir)?;
    mp3.write_all(&audio)?;
    mp3.flush()?;

    transcoder.transcode(mp3.path(), wav_path)?;
    mp3.close()?;

    Ok(ClipOutcome::Generated)
}
