//! Preset generation and output
//!
//! Clones the template once per preset, writes one bank into each channel
//! and saves the result as `prstNNN.yml`.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use super::document::{self, Mapping};
use super::model::{channel_key, zone_key, NAME_KEY, SAMPLE_KEY};
use super::template::PresetTemplate;
use crate::bank::{PresetBanks, CHANNELS_PER_PRESET, ZONES_PER_CHANNEL};
use crate::error::{MorphError, Result};

/// File name for preset slot `number`
pub fn preset_file_name(number: usize) -> String {
    format!("prst{number:03}.yml")
}

/// Display name written into preset slot `number`
pub fn preset_name(number: usize) -> String {
    format!("Pre{number}")
}

/// Builds preset documents from a template and writes them out
pub struct PresetWriter<'a> {
    template: &'a PresetTemplate,
    output_dir: PathBuf,
}

impl<'a> PresetWriter<'a> {
    pub fn new(template: &'a PresetTemplate, output_dir: &Path) -> Self {
        Self {
            template,
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build the document for preset `number` from its channel banks
    pub fn build(&self, number: usize, banks: &PresetBanks) -> Result<Mapping> {
        check_shape(banks)?;

        let key = self.template.preset_key(number);
        let mut doc = self.template.document().clone();
        doc.rename(self.template.stored_key(), key.as_str());

        let body = doc
            .get_map_mut(&key)
            .ok_or_else(|| MorphError::MalformedTemplate {
                path: self.template.source().to_path_buf(),
                reason: "top-level preset is not a mapping".to_string(),
            })?;
        body.insert(NAME_KEY, preset_name(number));

        for (c, bank) in banks.iter().enumerate() {
            for (z, sample) in bank.iter().enumerate() {
                let zone = body
                    .get_map_mut(&channel_key(c + 1))
                    .and_then(|channel| channel.get_map_mut(&zone_key(z + 1)))
                    .ok_or_else(|| MorphError::MalformedTemplate {
                        path: self.template.source().to_path_buf(),
                        reason: format!("missing {} / {}", channel_key(c + 1), zone_key(z + 1)),
                    })?;
                zone.insert(SAMPLE_KEY, sample.as_str());
            }
        }

        Ok(doc)
    }

    /// Build and save preset `number`, returning the written path
    pub fn write(&self, number: usize, banks: &PresetBanks) -> Result<PathBuf> {
        let doc = self.build(number, banks)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| MorphError::FileWriteError {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let path = self.output_dir.join(preset_file_name(number));
        fs::write(&path, document::emit(&doc)).map_err(|e| MorphError::FileWriteError {
            path: path.clone(),
            source: e,
        })?;

        info!("Preset {} saved to {}", number, path.display());
        Ok(path)
    }

    /// Write presets 1..=N for the given banks
    pub fn write_all(&self, presets: &[PresetBanks]) -> Result<Vec<PathBuf>> {
        presets
            .iter()
            .enumerate()
            .map(|(i, banks)| self.write(i + 1, banks))
            .collect()
    }
}

fn check_shape(banks: &PresetBanks) -> Result<()> {
    if banks.len() != CHANNELS_PER_PRESET {
        return Err(MorphError::ShapeMismatch {
            reason: format!(
                "expected {} channel banks, got {}",
                CHANNELS_PER_PRESET,
                banks.len()
            ),
        });
    }
    if let Some((c, bank)) = banks
        .iter()
        .enumerate()
        .find(|(_, bank)| bank.len() != ZONES_PER_CHANNEL)
    {
        return Err(MorphError::ShapeMismatch {
            reason: format!(
                "channel {} has {} samples, expected {}",
                c + 1,
                bank.len(),
                ZONES_PER_CHANNEL
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::document::parse;
    use crate::preset::model::Preset;
    use tempfile::tempdir;

    fn banks(tag: &str) -> PresetBanks {
        (1..=8)
            .map(|c| (1..=8).map(|z| format!("{tag}_c{c}_z{z}.wav")).collect())
            .collect()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(preset_file_name(1), "prst001.yml");
        assert_eq!(preset_file_name(42), "prst042.yml");
        assert_eq!(preset_name(7), "Pre7");
    }

    #[test]
    fn test_build_replaces_samples_only() {
        let template = PresetTemplate::builtin().unwrap();
        let writer = PresetWriter::new(&template, Path::new("unused"));

        let doc = writer.build(3, &banks("x")).unwrap();
        let preset = Preset::from_document(&doc).unwrap();

        assert_eq!(preset.key, "Preset 3");
        assert_eq!(preset.name.as_deref(), Some("Pre3"));
        assert_eq!(preset.channels[2].zones[5].sample, "x_c3_z6.wav");

        let original = template.preset();
        for (ours, theirs) in preset.channels.iter().zip(&original.channels) {
            assert_eq!(ours.params, theirs.params);
            for (a, b) in ours.zones.iter().zip(&theirs.zones) {
                assert_eq!(a.min_voltage, b.min_voltage);
                assert_eq!(a.side, b.side);
            }
        }

        // template itself is untouched
        assert_eq!(template.preset().key, "Preset 15");
    }

    #[test]
    fn test_write_and_reparse() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("presets");
        let template = PresetTemplate::builtin().unwrap();
        let writer = PresetWriter::new(&template, &out);

        let paths = writer.write_all(&[banks("a"), banks("b")]).unwrap();
        assert_eq!(paths, vec![out.join("prst001.yml"), out.join("prst002.yml")]);

        let text = fs::read_to_string(&paths[1]).unwrap();
        assert!(text.starts_with("Preset 2:\n  Name: Pre2\n"));
        assert!(text.contains("MinVoltage: +4.52\n"));
        assert!(!text.contains('\''));

        let preset = Preset::from_document(&parse(&text).unwrap()).unwrap();
        let expected = banks("b");
        for (channel, bank) in preset.channels.iter().zip(&expected) {
            let bank: Vec<&str> = bank.iter().map(String::as_str).collect();
            assert_eq!(channel.samples(), bank);
        }
    }

    #[test]
    fn test_awkward_sample_names_round_trip() {
        let dir = tempdir().unwrap();
        let template = PresetTemplate::builtin().unwrap();
        let writer = PresetWriter::new(&template, dir.path());

        let awkward = [
            "Kick #2.wav",
            "'quoted.wav",
            "- dash.wav",
            "-plain.wav",
            "  padded.wav ",
        ];
        let mut bank = banks("x");
        for (i, name) in awkward.iter().enumerate() {
            bank[i][i] = name.to_string();
        }

        let paths = writer.write_all(&[bank.clone()]).unwrap();
        let text = fs::read_to_string(&paths[0]).unwrap();
        assert!(text.contains("Sample: -plain.wav\n"));
        assert!(text.contains("Sample: 'Kick #2.wav'\n"));

        let preset = crate::preset::read_preset(&paths[0]).unwrap();
        let yaml: serde_yml::Value = serde_yml::from_str(&text).unwrap();
        for (i, name) in awkward.iter().enumerate() {
            assert_eq!(preset.channels[i].zones[i].sample, *name);
            let zone = &yaml["Preset 1"][channel_key(i + 1).as_str()][zone_key(i + 1).as_str()];
            assert_eq!(zone["Sample"].as_str(), Some(*name));
        }
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let template = PresetTemplate::builtin().unwrap();
        let writer = PresetWriter::new(&template, Path::new("unused"));

        let mut short = banks("x");
        short[4].pop();
        let err = writer.build(1, &short).unwrap_err();
        assert_eq!(err.error_code(), "SHAPE_MISMATCH");

        let err = writer.build(1, &banks("x")[..7].to_vec()).unwrap_err();
        assert!(err.to_string().contains("channel banks"));
    }
}
