//! Channel fault injection
//!
//! Degrades a batch of outgoing frames the way a lossy datagram channel
//! would. Stages run in a fixed order so corrupted frames can also be
//! duplicated or dropped, mirroring real channel behavior: corrupt →
//! duplicate → drop → reorder.

use rand::prelude::*;
use rand::rngs::SmallRng;

/// Fault rates, each in percent of frames affected
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultConfig {
    pub loss_pct: f64,
    pub reorder_pct: f64,
    pub duplicate_pct: f64,
    pub corrupt_pct: f64,
}

/// What the last `apply` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultStats {
    pub dropped: u32,
    pub reordered: u32,
    pub duplicated: u32,
    pub corrupted: u32,
}

/// Applies configured faults to frame batches
pub struct FaultInjector {
    config: FaultConfig,
    rng: SmallRng,
    last_stats: FaultStats,
}

impl FaultInjector {
    pub fn new(config: FaultConfig, seed: u64) -> Self {
        FaultInjector {
            config,
            rng: SmallRng::seed_from_u64(seed),
            last_stats: FaultStats::default(),
        }
    }

    pub fn last_stats(&self) -> FaultStats {
        self.last_stats
    }

    fn roll(&mut self, pct: f64) -> bool {
        pct > 0.0 && self.rng.gen_range(0.0..100.0) < pct
    }

    /// Degrade `frames` in place.
    pub fn apply(&mut self, frames: &mut Vec<Vec<u8>>) {
        self.last_stats = FaultStats::default();

        if frames.is_empty() {
            return;
        }

        // Corruption: flip one random byte.
        if self.config.corrupt_pct > 0.0 {
            for frame in frames.iter_mut() {
                if frame.is_empty() {
                    continue;
                }
                if self.roll(self.config.corrupt_pct) {
                    let idx = self.rng.gen_range(0..frame.len());
                    frame[idx] ^= 0xFF;
                    self.last_stats.corrupted += 1;
                }
            }
        }

        // Duplication: copies inserted at random positions.
        if self.config.duplicate_pct > 0.0 {
            let mut extras = Vec::new();
            for frame in frames.iter() {
                if self.roll(self.config.duplicate_pct) {
                    extras.push(frame.clone());
                    self.last_stats.duplicated += 1;
                }
            }
            for dup in extras {
                let pos = self.rng.gen_range(0..=frames.len());
                frames.insert(pos, dup);
            }
        }

        // Loss.
        if self.config.loss_pct > 0.0 {
            let mut kept = Vec::with_capacity(frames.len());
            for frame in frames.drain(..) {
                if self.roll(self.config.loss_pct) {
                    self.last_stats.dropped += 1;
                } else {
                    kept.push(frame);
                }
            }
            *frames = kept;
        }

        // Reorder: swap adjacent pairs, skipping past each swap.
        if self.config.reorder_pct > 0.0 && frames.len() >= 2 {
            let mut i = 0;
            while i + 1 < frames.len() {
                if self.roll(self.config.reorder_pct) {
                    frames.swap(i, i + 1);
                    self.last_stats.reordered += 1;
                    i += 1;
                }
                i += 1;
            }
        }
    }
}
