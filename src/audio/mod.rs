//! Audio file handling
//!
//! This module provides:
//! - WAV read/write that preserves the source format
//! - Leading silence detection and removal

pub mod io;
pub mod silence;

pub use io::{read_wav, write_wav, Samples, WavData};
pub use silence::{
    detect_leading_silence, strip_leading_silence, trim_directory, SilenceParams, TrimOutcome,
};
