//! Counter aggregation and health rollup
//!
//! Global and per-source counters behind one reader-writer lock: every
//! mutation updates both levels under the write guard, so a reader always
//! sees a consistent whole-struct snapshot (no torn reads across fields).
//! Counters only move up between explicit resets. Gap counters accumulate
//! the number of *missing frames*, not the number of gap events.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Gateway-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalStats {
    pub rx_total: u64,
    pub malformed_total: u64,
    pub gap_total: u64,
    pub reorder_total: u64,
    pub duplicate_total: u64,
    pub crc_fail_total: u64,
}

/// Per-source counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub src_id: u16,
    pub rx_count: u64,
    pub malformed: u64,
    pub gaps: u64,
    pub reorders: u64,
    pub duplicates: u64,
    pub last_seq: u32,
    pub last_ts_ns: u64,
}

/// Three-valued health rollup derived from the global counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Ok,
    Degraded,
    Error,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Ok => "OK",
            HealthState::Degraded => "DEGRADED",
            HealthState::Error => "ERROR",
        }
    }
}

#[derive(Default)]
struct Inner {
    global: GlobalStats,
    sources: HashMap<u16, SourceStats>,
}

impl Inner {
    fn source_mut(&mut self, src_id: u16) -> &mut SourceStats {
        self.sources.entry(src_id).or_insert_with(|| SourceStats {
            src_id,
            ..Default::default()
        })
    }
}

/// Shared counter store; cheap to clone behind an `Arc`
#[derive(Default)]
pub struct StatsAggregator {
    inner: RwLock<Inner>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one received frame and note its sequence number and timestamp.
    pub fn record_rx(&self, src_id: u16, seq: u32, ts_ns: u64) {
        let mut inner = self.inner.write();
        inner.global.rx_total += 1;
        let src = inner.source_mut(src_id);
        src.rx_count += 1;
        src.last_seq = seq;
        src.last_ts_ns = ts_ns;
    }

    pub fn record_malformed(&self, src_id: u16) {
        let mut inner = self.inner.write();
        inner.global.malformed_total += 1;
        inner.source_mut(src_id).malformed += 1;
    }

    /// Accumulate `gap_size` missing frames.
    pub fn record_gap(&self, src_id: u16, gap_size: u32) {
        let mut inner = self.inner.write();
        inner.global.gap_total += gap_size as u64;
        inner.source_mut(src_id).gaps += gap_size as u64;
    }

    pub fn record_reorder(&self, src_id: u16) {
        let mut inner = self.inner.write();
        inner.global.reorder_total += 1;
        inner.source_mut(src_id).reorders += 1;
    }

    pub fn record_duplicate(&self, src_id: u16) {
        let mut inner = self.inner.write();
        inner.global.duplicate_total += 1;
        inner.source_mut(src_id).duplicates += 1;
    }

    /// CRC failures also count toward the per-source malformed tally.
    pub fn record_crc_fail(&self, src_id: u16) {
        let mut inner = self.inner.write();
        inner.global.crc_fail_total += 1;
        inner.source_mut(src_id).malformed += 1;
    }

    /// By-value snapshot of the global counters.
    pub fn global_snapshot(&self) -> GlobalStats {
        self.inner.read().global
    }

    /// By-value snapshot of one source; zeros if the source is unknown.
    pub fn source_snapshot(&self, src_id: u16) -> SourceStats {
        self.inner
            .read()
            .sources
            .get(&src_id)
            .copied()
            .unwrap_or_default()
    }

    /// Snapshots of every known source.
    pub fn all_sources(&self) -> Vec<SourceStats> {
        self.inner.read().sources.values().copied().collect()
    }

    pub fn source_count(&self) -> usize {
        self.inner.read().sources.len()
    }

    /// Rollup: any malformed/CRC failure is `Error`; any gap/reorder is
    /// `Degraded`; otherwise `Ok`.
    pub fn health(&self) -> HealthState {
        let inner = self.inner.read();
        if inner.global.malformed_total > 0 || inner.global.crc_fail_total > 0 {
            return HealthState::Error;
        }
        if inner.global.gap_total > 0 || inner.global.reorder_total > 0 {
            return HealthState::Degraded;
        }
        HealthState::Ok
    }

    /// Zero every counter and forget all sources.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.global = GlobalStats::default();
        inner.sources.clear();
    }
}
