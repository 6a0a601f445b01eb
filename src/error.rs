//! Error handling for morphkit
//!
//! Batch loops use [`MorphError::is_fatal`] to decide whether a failure
//! aborts the remaining items or is logged and skipped.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for morphkit operations
pub type Result<T> = std::result::Result<T, MorphError>;

/// Main error type for morphkit operations
#[derive(Error, Debug)]
pub enum MorphError {
    // File Errors
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid audio file {}: {reason}", path.display())]
    InvalidAudio { path: PathBuf, reason: String },

    // Template / config errors
    #[error("Malformed template {}: {reason}", path.display())]
    MalformedTemplate { path: PathBuf, reason: String },

    #[error("Preset document parse error at line {line}: {reason}")]
    DocumentParse { line: usize, reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Missing API key: set MORPHKIT_API_KEY or API_KEY")]
    MissingApiKey,

    // Inventory errors
    #[error("No samples available in {}", path.display())]
    NoSamples { path: PathBuf },

    #[error("Sample pool is empty; no zones can be filled")]
    EmptyPool,

    #[error("Bank shape mismatch: {reason}")]
    ShapeMismatch { reason: String },

    // External tool errors
    #[error("External tool not found: {program}")]
    ToolNotFound { program: String },

    #[error("Could not run {program}: {source}")]
    ToolFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Batch aborted: {reason}")]
    BatchAborted { reason: String },

    #[error("Conversion of {} failed: {stderr}", input.display())]
    ConversionFailed { input: PathBuf, stderr: String },

    #[error("Sound generation failed for '{prompt}': {reason}")]
    SynthesisFailed { prompt: String, reason: String },

    #[error("Refusing to overwrite input file in place: {}", path.display())]
    InPlaceOverwrite { path: PathBuf },

    // Wrapped errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MorphError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MorphError::FileNotFound { .. } => "FILE_NOT_FOUND",
            MorphError::DirectoryNotFound { .. } => "DIRECTORY_NOT_FOUND",
            MorphError::FileWriteError { .. } => "FILE_WRITE_ERROR",
            MorphError::InvalidAudio { .. } => "INVALID_AUDIO",
            MorphError::MalformedTemplate { .. } => "MALFORMED_TEMPLATE",
            MorphError::DocumentParse { .. } => "DOCUMENT_PARSE",
            MorphError::InvalidConfig { .. } => "INVALID_CONFIG",
            MorphError::MissingApiKey => "MISSING_API_KEY",
            MorphError::NoSamples { .. } => "NO_SAMPLES",
            MorphError::EmptyPool => "EMPTY_POOL",
            MorphError::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            MorphError::ToolNotFound { .. } => "TOOL_NOT_FOUND",
            MorphError::ToolFailed { .. } => "TOOL_FAILED",
            MorphError::BatchAborted { .. } => "BATCH_ABORTED",
            MorphError::ConversionFailed { .. } => "CONVERSION_FAILED",
            MorphError::SynthesisFailed { .. } => "SYNTHESIS_FAILED",
            MorphError::InPlaceOverwrite { .. } => "IN_PLACE_OVERWRITE",
            MorphError::Io(_) => "IO_ERROR",
            MorphError::Wav(_) => "WAV_ERROR",
            MorphError::Yaml(_) => "YAML_ERROR",
            MorphError::Json(_) => "JSON_ERROR",
        }
    }

    /// Whether this error must stop a batch instead of skipping the item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MorphError::ToolNotFound { .. }
                | MorphError::ToolFailed { .. }
                | MorphError::MissingApiKey
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MorphError::ToolNotFound { .. } => vec![
                "Install ffmpeg and make sure it is on your PATH",
                "Or point --transcoder at the converter binary",
            ],
            MorphError::ToolFailed { .. } => vec![
                "Check that the transcoder path is an executable binary",
                "Check file permissions on the converter and its directory",
            ],
            MorphError::MissingApiKey => vec![
                "Export MORPHKIT_API_KEY (or API_KEY) before running",
            ],
            MorphError::MalformedTemplate { .. } => vec![
                "The template needs one top-level preset key",
                "Each of Channel 1..8 needs Zone 1..8 with a Sample entry",
                "Run 'morphkit template' to print a known-good layout",
            ],
            MorphError::NoSamples { .. } | MorphError::EmptyPool => vec![
                "Check the samples directory and extension filter",
                "Convert MP3 files first with 'morphkit convert'",
            ],
            MorphError::InPlaceOverwrite { .. } => vec![
                "Choose an output directory different from the input directory",
            ],
            _ => vec![],
        }
    }
}
