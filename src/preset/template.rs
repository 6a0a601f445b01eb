//! Preset template loading
//!
//! A template is a complete, known-good preset file. Generation clones it
//! and only rewrites the preset key, the name and the zone samples.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::document::{self, Mapping};
use super::model::Preset;
use crate::error::{MorphError, Result};

/// The known-good preset layout used when no template file is given
pub const BUILTIN_TEMPLATE: &str = include_str!("default_template.yml");

/// Label used in errors for the built-in template
const BUILTIN_SOURCE: &str = "<builtin>";

/// A validated preset template
#[derive(Debug, Clone, PartialEq)]
pub struct PresetTemplate {
    source: PathBuf,
    document: Mapping,
    preset: Preset,
}

impl PresetTemplate {
    /// Load and validate a template file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MorphError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let template = Self::from_text(&text, path)?;
        debug!("Loaded template '{}' from {}", template.preset.key, path.display());
        Ok(template)
    }

    /// The built-in layout
    pub fn builtin() -> Result<Self> {
        Self::from_text(BUILTIN_TEMPLATE, Path::new(BUILTIN_SOURCE))
    }

    /// Load `path` if given, the built-in layout otherwise
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    fn from_text(text: &str, source: &Path) -> Result<Self> {
        let malformed = |reason: String| MorphError::MalformedTemplate {
            path: source.to_path_buf(),
            reason,
        };

        let document = document::parse(text).map_err(|e| malformed(e.to_string()))?;
        let preset = Preset::from_document(&document).map_err(malformed)?;

        Ok(Self {
            source: source.to_path_buf(),
            document,
            preset,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The template's parsed document
    pub fn document(&self) -> &Mapping {
        &self.document
    }

    /// Typed view of the template
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// The top-level key exactly as the template spells it
    pub fn stored_key(&self) -> &str {
        self.document.first().map(|(k, _)| k).unwrap_or_default()
    }

    /// Key for preset `number`, following the template's spelling
    /// (some hardware exports carry a trailing space on every key).
    pub fn preset_key(&self, number: usize) -> String {
        let suffix = if self.stored_key().ends_with(char::is_whitespace) {
            " "
        } else {
            ""
        };
        format!("Preset {number}{suffix}")
    }

    /// Render the template unchanged
    pub fn render(&self) -> String {
        document::emit(&self.document)
    }
}
