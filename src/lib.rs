//! morphkit - sampler preset generation toolkit
//!
//! Builds multi-channel sampler presets from a directory of audio clips:
//! - Inventory scanning and same-length grouping
//! - Randomized bank assignment (8 channels x 8 zones per preset)
//! - Template-driven preset files that keep the template's exact text
//! - MP3 to WAV conversion through an external transcoder
//! - Clip synthesis from text prompts through a cloud sound API
//! - Leading silence trimming

pub mod adapters;
pub mod audio;
pub mod bank;
pub mod cli;
pub mod config;
pub mod error;
pub mod generate;
pub mod inventory;
pub mod preset;
pub mod report;

pub use error::{MorphError, Result};
