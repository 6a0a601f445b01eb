//! Sample inventory scanning
//!
//! Lists the audio files available for bank assignment. Directory order is
//! replaced with file-name order so runs over the same directory see the
//! same inventory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hound::WavReader;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::{MorphError, Result};

/// A named audio file in the inventory
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// File name, as written into preset zones
    pub name: String,
    /// Full path to the file
    pub path: PathBuf,
    /// Frame count from the WAV header, if it was readable
    pub frames: Option<u32>,
    /// Sample rate from the WAV header, if it was readable
    pub sample_rate: Option<u32>,
}

impl Sample {
    fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            frames: None,
            sample_rate: None,
        }
    }

    /// Duration in seconds, when the header has been probed
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.frames, self.sample_rate) {
            (Some(frames), Some(rate)) if rate > 0 => Some(frames as f64 / rate as f64),
            _ => None,
        }
    }
}

/// The set of samples found in one directory
#[derive(Debug, Clone)]
pub struct Inventory {
    dir: PathBuf,
    samples: Vec<Sample>,
}

impl Inventory {
    /// Scan `dir` for files with the given extension (case-insensitive)
    pub fn scan(dir: &Path, extension: &str) -> Result<Self> {
        let samples = list_files(dir, extension)?
            .into_iter()
            .map(Sample::new)
            .collect::<Vec<_>>();

        debug!("Found {} '.{}' files in {}", samples.len(), extension, dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            samples,
        })
    }

    /// Read WAV headers to fill in frame counts.
    ///
    /// Files that cannot be read are logged and keep `frames == None`; they
    /// stay in the inventory but take no part in length grouping.
    pub fn probe_wav_headers(&mut self) {
        for sample in &mut self.samples {
            match WavReader::open(&sample.path) {
                Ok(reader) => {
                    sample.frames = Some(reader.duration());
                    sample.sample_rate = Some(reader.spec().sample_rate);
                    debug!(
                        "{}: {} frames ({:.2}s)",
                        sample.name,
                        reader.duration(),
                        sample.duration_secs().unwrap_or_default()
                    );
                }
                Err(e) => warn!("Error reading {}: {}. Skipping.", sample.name, e),
            }
        }
    }

    /// Group sample names by frame count, for same-length assignment
    pub fn group_by_frames(&self) -> BTreeMap<u32, Vec<String>> {
        let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for sample in &self.samples {
            if let Some(frames) = sample.frames {
                groups.entry(frames).or_default().push(sample.name.clone());
            }
        }
        groups
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// All sample names, in inventory order
    pub fn names(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.samples.iter().any(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// List regular files directly inside `dir` whose extension matches,
/// sorted by file name.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MorphError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let wanted = extension.trim_start_matches('.');
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), wanted))
        .map(|entry| entry.path().to_path_buf())
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Case-insensitive extension check
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
