//! External tool adapters
//!
//! This module provides:
//! - `Transcoder` trait with the ffmpeg-backed implementation
//! - `SoundGenerator` trait with the cloud API client
//! - Mock implementations for testing

pub mod mock;
pub mod synth;
pub mod transcoder;

pub use mock::{MockGenerator, MockTranscoder};
pub use synth::{synthesize_clip, ClipOutcome, ElevenLabsClient, SoundGenerator, SoundRequest};
pub use transcoder::{convert_directory, FfmpegTranscoder, Transcoder};
