//! Preset templates, documents and output
//!
//! - [`document`]: ordered tree with raw scalar text, parse and emit
//! - [`model`]: typed 8x8 view used for validation and inspection
//! - [`template`]: loading the prototype preset
//! - [`writer`]: cloning the prototype per preset and saving it

pub mod document;
pub mod model;
pub mod template;
pub mod writer;

use std::fs;
use std::path::Path;

use crate::error::{MorphError, Result};

pub use document::{Mapping, Node};
pub use model::{Channel, Preset, Zone};
pub use template::PresetTemplate;
pub use writer::{preset_file_name, PresetWriter};

/// Read a written preset file back into its typed view
pub fn read_preset(path: &Path) -> Result<Preset> {
    if !path.exists() {
        return Err(MorphError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let doc = document::parse(&fs::read_to_string(path)?)?;
    Preset::from_document(&doc).map_err(|reason| MorphError::MalformedTemplate {
        path: path.to_path_buf(),
        reason,
    })
}
