//! Weighted reel model and outcome generation
//!
//! Each reel samples symbol `S` with probability `weight(S, reel) / Σ weight`.
//! A spin does not draw the three visible cells independently: it resamples a
//! throwaway strip from the weights, picks a stop on it and reads the stop and
//! its two neighbours. Vertically adjacent cells therefore come from the same
//! strip while reels stay independent of each other.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::spin::Grid;

/// Minimum length of a resampled strip
pub const MIN_STRIP_LEN: usize = 32;

/// Largest total weight a reel may carry; bounds the strip at twice this
pub const MAX_REEL_WEIGHT: u64 = 100_000;

/// An ephemeral strip, regenerated on every spin
#[derive(Debug, Clone)]
pub struct ReelStrip<'a> {
    /// Symbol names in order
    pub symbols: Vec<&'a str>,
    /// Reel index
    pub reel_index: u8,
}

impl<'a> ReelStrip<'a> {
    /// Create a new reel strip
    pub fn new(reel_index: u8, symbols: Vec<&'a str>) -> Self {
        Self { symbols, reel_index }
    }

    /// Get symbol at position (wraps around)
    pub fn symbol_at(&self, position: usize) -> &'a str {
        if self.symbols.is_empty() {
            return "";
        }
        self.symbols[position % self.symbols.len()]
    }

    /// Above, center and below around a stop position
    pub fn window(&self, stop: usize) -> [&'a str; 3] {
        let len = self.symbols.len().max(1);
        [
            self.symbol_at(stop + len - 1),
            self.symbol_at(stop),
            self.symbol_at(stop + 1),
        ]
    }

    /// Get total strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Sampling table for one reel
#[derive(Debug, Clone)]
pub struct WeightedReel {
    reel_index: u8,
    /// Symbols with a non-zero weight, catalog order
    names: Vec<String>,
    weights: Vec<u32>,
    total_weight: u32,
    dist: WeightedIndex<u32>,
}

impl WeightedReel {
    /// Build from resolved `(name, weight)` pairs; zero weights are dropped
    pub fn new(reel_index: u8, resolved: Vec<(String, u32)>) -> Result<Self, ConfigError> {
        let (names, weights): (Vec<String>, Vec<u32>) =
            resolved.into_iter().filter(|(_, w)| *w > 0).unzip();

        let total: u64 = weights.iter().map(|&w| w as u64).sum();
        if total == 0 {
            return Err(ConfigError::ZeroWeightReel {
                reel: reel_index as usize,
            });
        }
        if total > MAX_REEL_WEIGHT {
            return Err(ConfigError::ReelWeightTooLarge {
                reel: reel_index as usize,
                total,
                max: MAX_REEL_WEIGHT,
            });
        }
        let total_weight = total as u32;

        let dist = WeightedIndex::new(&weights).map_err(|_| ConfigError::ZeroWeightReel {
            reel: reel_index as usize,
        })?;

        Ok(Self {
            reel_index,
            names,
            weights,
            total_weight,
            dist,
        })
    }

    pub fn reel_index(&self) -> u8 {
        self.reel_index
    }

    /// Sum of resolved weights, i.e. the number of weighted slots
    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    /// Length of the strip resampled for every spin
    pub fn strip_len(&self) -> usize {
        MIN_STRIP_LEN.max(2 * self.total_weight as usize)
    }

    /// Probability of drawing `name` on this reel
    pub fn probability(&self, name: &str) -> f64 {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.weights[i] as f64 / self.total_weight as f64)
            .unwrap_or(0.0)
    }

    /// Names and weights of every symbol that can appear
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.names.iter().map(String::as_str).zip(self.weights.iter().copied())
    }

    /// Draw one symbol
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &str {
        &self.names[self.dist.sample(rng)]
    }

    /// Resample a fresh strip
    pub fn resample_strip<R: Rng>(&self, rng: &mut R) -> ReelStrip<'_> {
        let len = self.strip_len();
        let symbols = (0..len).map(|_| self.sample(rng)).collect();
        ReelStrip::new(self.reel_index, symbols)
    }

    /// Resample, stop, and read `[above, center, below]`
    pub fn spin<R: Rng>(&self, rng: &mut R) -> [String; 3] {
        let strip = self.resample_strip(rng);
        let stop = rng.random_range(0..strip.len());
        strip.window(stop).map(str::to_string)
    }
}

/// Per-reel sampling tables, built once per session
#[derive(Debug, Clone)]
pub struct ReelModel {
    reels: Vec<WeightedReel>,
}

impl ReelModel {
    /// Resolve weights (override, else base weight) for every reel
    ///
    /// Fails if any reel ends up with zero total weight.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        let reels = (0..config.reels_count as usize)
            .map(|reel| {
                let resolved = config
                    .symbols
                    .iter()
                    .map(|s| (s.name.clone(), config.resolved_weight(reel, s)))
                    .collect();
                WeightedReel::new(reel as u8, resolved)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { reels })
    }

    pub fn reels(&self) -> &[WeightedReel] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&WeightedReel> {
        self.reels.get(index)
    }

    pub fn reel_count(&self) -> usize {
        self.reels.len()
    }

    /// Generate a 3×N grid, one independent resampled strip per reel
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Grid {
        Grid::from_columns(self.reels.iter().map(|reel| reel.spin(rng)).collect())
    }
}
