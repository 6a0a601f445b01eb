//! Typed view of a preset document
//!
//! The document tree stays the source of truth for output; this view is
//! what validation and inspection read.

use serde::Serialize;

use super::document::{Mapping, Node};
use crate::bank::{CHANNELS_PER_PRESET, ZONES_PER_CHANNEL};

pub const NAME_KEY: &str = "Name";
pub const SAMPLE_KEY: &str = "Sample";
pub const MIN_VOLTAGE_KEY: &str = "MinVoltage";
pub const SIDE_KEY: &str = "Side";

pub fn channel_key(channel: usize) -> String {
    format!("Channel {channel}")
}

pub fn zone_key(zone: usize) -> String {
    format!("Zone {zone}")
}

/// One voltage-triggered sample slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub sample: String,
    pub min_voltage: Option<String>,
    pub side: Option<String>,
}

/// A channel parameter copied from the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub number: usize,
    pub params: Vec<Param>,
    pub zones: Vec<Zone>,
}

impl Channel {
    /// Sample names in zone order
    pub fn samples(&self) -> Vec<&str> {
        self.zones.iter().map(|z| z.sample.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Top-level key, trimmed (e.g. `Preset 3`)
    pub key: String,
    /// Slot number parsed from the key, if it has one
    pub number: Option<u32>,
    pub name: Option<String>,
    pub channels: Vec<Channel>,
}

impl Preset {
    /// Read the single preset in `doc`, checking the 8x8 shape.
    ///
    /// Errors are plain reasons; callers attach the file they came from.
    pub fn from_document(doc: &Mapping) -> Result<Self, String> {
        if doc.len() != 1 {
            return Err(format!(
                "expected exactly one top-level preset key, found {}",
                doc.len()
            ));
        }
        let (key, body) = doc.first().ok_or("empty document")?;
        let body = body
            .as_map()
            .ok_or_else(|| format!("'{}' is not a mapping", key.trim()))?;

        let channels = (1..=CHANNELS_PER_PRESET)
            .map(|c| read_channel(body, c))
            .collect::<Result<Vec<_>, _>>()?;

        let key = key.trim().to_string();
        let number = key
            .strip_prefix("Preset")
            .and_then(|n| n.trim().parse().ok());

        Ok(Self {
            number,
            name: body.get_scalar(NAME_KEY).map(str::to_string),
            key,
            channels,
        })
    }

    /// Every sample reference, preset-wide
    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.channels
            .iter()
            .flat_map(|c| c.zones.iter().map(|z| z.sample.as_str()))
    }
}

fn read_channel(body: &Mapping, number: usize) -> Result<Channel, String> {
    let key = channel_key(number);
    let channel = body
        .get_map(&key)
        .ok_or_else(|| format!("missing or invalid '{key}'"))?;

    let zones = (1..=ZONES_PER_CHANNEL)
        .map(|z| {
            let zkey = zone_key(z);
            let zone = channel
                .get_map(&zkey)
                .ok_or_else(|| format!("'{key}' is missing '{zkey}'"))?;
            let sample = zone
                .get_scalar(SAMPLE_KEY)
                .ok_or_else(|| format!("'{key}' / '{zkey}' has no Sample"))?;
            Ok(Zone {
                sample: sample.to_string(),
                min_voltage: zone.get_scalar(MIN_VOLTAGE_KEY).map(str::to_string),
                side: zone.get_scalar(SIDE_KEY).map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let params = channel
        .iter()
        .filter_map(|(k, v)| match v {
            Node::Scalar(value) => Some(Param {
                key: k.trim().to_string(),
                value: value.clone(),
            }),
            _ => None,
        })
        .collect();

    Ok(Channel {
        number,
        params,
        zones,
    })
}
