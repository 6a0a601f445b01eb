//! Bank assignment engine
//!
//! Draws sample names into (preset, channel, zone) slots. Each channel
//! receives a bank of distinct samples drawn from the not-yet-used pool;
//! when too few unused samples remain, the pool resets to the full
//! inventory and duplicates become possible.

use std::collections::{BTreeMap, HashSet};

use clap::ValueEnum;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{MorphError, Result};

/// Channels in one preset
pub const CHANNELS_PER_PRESET: usize = 8;

/// Zones in one channel
pub const ZONES_PER_CHANNEL: usize = 8;

/// The samples assigned to one channel, in zone order
pub type Bank = Vec<String>;

/// One bank per channel of a preset
pub type PresetBanks = Vec<Bank>;

/// Target shape of an assignment run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankShape {
    pub presets: usize,
    pub channels: usize,
    pub zones: usize,
}

impl BankShape {
    /// The hardware shape: 8 channels of 8 zones per preset
    pub fn new(presets: usize) -> Self {
        Self {
            presets,
            channels: CHANNELS_PER_PRESET,
            zones: ZONES_PER_CHANNEL,
        }
    }

    /// Slots in one preset
    pub fn slots_per_preset(&self) -> usize {
        self.channels * self.zones
    }

    /// Slots across the whole run
    pub fn total_slots(&self) -> usize {
        self.presets * self.slots_per_preset()
    }

    /// Whether a pool this size forces duplicates within a single preset
    pub fn is_short(&self, pool_len: usize) -> bool {
        pool_len < self.slots_per_preset()
    }
}

/// How samples are picked for a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Prefer samples not used earlier in the run
    #[default]
    Unique,
    /// Prefer channels whose samples all share one frame count
    SameLength,
}

/// Assigns samples to banks with a caller-supplied RNG
pub struct BankAssigner<R: Rng> {
    shape: BankShape,
    rng: R,
    used: HashSet<String>,
}

impl BankAssigner<StdRng> {
    /// Seeded assigner for reproducible runs, entropy-seeded otherwise
    pub fn with_seed(shape: BankShape, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(shape, rng)
    }
}

impl<R: Rng> BankAssigner<R> {
    pub fn new(shape: BankShape, rng: R) -> Self {
        Self {
            shape,
            rng,
            used: HashSet::new(),
        }
    }

    pub fn shape(&self) -> BankShape {
        self.shape
    }

    /// Assign every preset of the run from a flat pool.
    pub fn assign_unique(&mut self, pool: &[String]) -> Result<Vec<PresetBanks>> {
        self.check_pool(pool)?;
        Ok((0..self.shape.presets)
            .map(|_| self.unique_preset(pool))
            .collect())
    }

    /// Assign every preset, preferring same-length groups.
    ///
    /// A preset uses grouped assignment only when at least one group with a
    /// full bank's worth of samples exists per channel; otherwise that
    /// preset falls back to [`Self::assign_unique`] semantics.
    pub fn assign_grouped(
        &mut self,
        pool: &[String],
        groups: &BTreeMap<u32, Vec<String>>,
    ) -> Result<Vec<PresetBanks>> {
        self.check_pool(pool)?;

        let valid: Vec<&Vec<String>> = groups
            .values()
            .filter(|group| group.len() >= self.shape.zones)
            .collect();

        if valid.len() < self.shape.channels {
            warn!(
                "Only {} same-length groups of {}+ samples, need {}. Falling back to random selection.",
                valid.len(),
                self.shape.zones,
                self.shape.channels
            );
        }

        let mut presets = Vec::with_capacity(self.shape.presets);
        for _ in 0..self.shape.presets {
            if valid.len() >= self.shape.channels {
                let mut chosen = valid.clone();
                chosen.shuffle(&mut self.rng);
                let banks = chosen
                    .into_iter()
                    .take(self.shape.channels)
                    .map(|group| self.draw(group.clone()))
                    .collect();
                presets.push(banks);
            } else {
                presets.push(self.unique_preset(pool));
            }
        }
        Ok(presets)
    }

    /// Assign with the given strategy; `groups` is only consulted for
    /// [`Strategy::SameLength`].
    pub fn assign(
        &mut self,
        strategy: Strategy,
        pool: &[String],
        groups: &BTreeMap<u32, Vec<String>>,
    ) -> Result<Vec<PresetBanks>> {
        match strategy {
            Strategy::Unique => self.assign_unique(pool),
            Strategy::SameLength => self.assign_grouped(pool, groups),
        }
    }

    fn check_pool(&self, pool: &[String]) -> Result<()> {
        if pool.is_empty() {
            return Err(MorphError::EmptyPool);
        }
        if self.shape.is_short(pool.len()) {
            warn!(
                "Only {} samples available, need {}. Duplicates will occur.",
                pool.len(),
                self.shape.slots_per_preset()
            );
        }
        Ok(())
    }

    fn unique_preset(&mut self, pool: &[String]) -> PresetBanks {
        (0..self.shape.channels)
            .map(|_| {
                let mut available: Vec<String> = pool
                    .iter()
                    .filter(|name| !self.used.contains(*name))
                    .cloned()
                    .collect();

                if available.len() < self.shape.zones {
                    debug!(
                        "{} unused samples left, resetting pool to full inventory",
                        available.len()
                    );
                    available = pool.to_vec();
                }

                let bank = self.draw(available);
                self.used.extend(bank.iter().cloned());
                bank
            })
            .collect()
    }

    fn draw(&mut self, mut candidates: Vec<String>) -> Bank {
        candidates.shuffle(&mut self.rng);
        fill_bank(&candidates, self.shape.zones)
    }
}

/// Take the first `zones` candidates, cycling through them again when
/// there are fewer candidates than zones. Empty input gives an empty bank.
pub fn fill_bank(candidates: &[String], zones: usize) -> Bank {
    candidates.iter().cycle().take(zones).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (0..count).map(|i| format!("{prefix}{i:03}.wav")).collect()
    }

    fn assigner(presets: usize) -> BankAssigner<StdRng> {
        BankAssigner::with_seed(BankShape::new(presets), Some(7))
    }

    #[test_case(1, 63, true ; "one short of a preset")]
    #[test_case(1, 64, false ; "exactly one preset")]
    #[test_case(4, 64, false ; "enough for each preset but not the run")]
    fn test_shortage_is_per_preset(presets: usize, pool: usize, short: bool) {
        assert_eq!(BankShape::new(presets).is_short(pool), short);
    }

    #[test_case(1 ; "single sample")]
    #[test_case(5 ; "fewer than one bank")]
    #[test_case(8 ; "exactly one bank")]
    #[test_case(63 ; "just short of one preset")]
    #[test_case(200 ; "plenty")]
    fn test_every_channel_gets_eight_zones(count: usize) {
        let pool = names("s", count);
        let presets = assigner(3).assign_unique(&pool).unwrap();

        assert_eq!(presets.len(), 3);
        for banks in &presets {
            assert_eq!(banks.len(), CHANNELS_PER_PRESET);
            for bank in banks {
                assert_eq!(bank.len(), ZONES_PER_CHANNEL);
                assert!(bank.iter().all(|name| pool.contains(name)));
            }
        }
    }

    #[test]
    fn test_banks_are_distinct_within_channel_when_possible() {
        let pool = names("s", 20);
        let presets = assigner(4).assign_unique(&pool).unwrap();

        for bank in presets.iter().flatten() {
            let distinct: HashSet<_> = bank.iter().collect();
            assert_eq!(distinct.len(), ZONES_PER_CHANNEL);
        }
    }

    #[test]
    fn test_no_repeats_across_run_with_enough_samples() {
        let shape = BankShape::new(2);
        let pool = names("s", shape.total_slots());
        let presets = assigner(2).assign_unique(&pool).unwrap();

        let all: Vec<&String> = presets.iter().flatten().flatten().collect();
        let distinct: HashSet<_> = all.iter().collect();
        assert_eq!(distinct.len(), shape.total_slots());
    }

    #[test]
    fn test_small_pool_repeats_instead_of_failing() {
        let pool = names("s", 3);
        let presets = assigner(1).assign_unique(&pool).unwrap();
        let bank = &presets[0][0];
        assert_eq!(bank.len(), ZONES_PER_CHANNEL);
        let distinct: HashSet<_> = bank.iter().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let err = assigner(1).assign_unique(&[]).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_POOL");
    }

    #[test]
    fn test_same_seed_same_assignment() {
        let pool = names("s", 40);
        let a = assigner(2).assign_unique(&pool).unwrap();
        let b = assigner(2).assign_unique(&pool).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_grouped_channels_share_length() {
        let mut groups = BTreeMap::new();
        let mut pool = Vec::new();
        for length in 0..10u32 {
            let group = names(&format!("len{length}_"), 8);
            pool.extend(group.clone());
            groups.insert(1000 + length, group);
        }

        let presets = assigner(2).assign_grouped(&pool, &groups).unwrap();
        for bank in presets.iter().flatten() {
            assert_eq!(bank.len(), ZONES_PER_CHANNEL);
            let prefix = bank[0].split('_').next().unwrap();
            assert!(bank.iter().all(|name| name.starts_with(prefix)));
        }

        // distinct groups per channel within a preset
        let prefixes: HashSet<_> = presets[0]
            .iter()
            .map(|bank| bank[0].split('_').next().unwrap().to_string())
            .collect();
        assert_eq!(prefixes.len(), CHANNELS_PER_PRESET);
    }

    #[test]
    fn test_grouped_falls_back_without_enough_groups() {
        let pool = names("s", 30);
        let mut groups = BTreeMap::new();
        groups.insert(10, pool[..8].to_vec());

        let presets = assigner(1).assign_grouped(&pool, &groups).unwrap();
        assert_eq!(presets[0].len(), CHANNELS_PER_PRESET);
        assert!(presets[0].iter().all(|bank| bank.len() == ZONES_PER_CHANNEL));
    }

    #[test]
    fn test_fill_bank_cycles() {
        let candidates = vec!["a".to_string(), "b".to_string()];
        assert_eq!(fill_bank(&candidates, 5), vec!["a", "b", "a", "b", "a"]);
        assert!(fill_bank(&[], 8).is_empty());
    }
}
