//! Router statistics (§6): lock-free counters, readable from any task while
//! only ever incremented from the router task (or, for RX/TX counts, from a
//! transport's own task), per §5's "no locking, coarse eventual
//! consistency" requirement.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::router::transport::TransportId;

#[derive(Debug, Default)]
pub struct RouterStats {
    packets_routed: [[AtomicU64; 4]; 4],
    packets_dropped: [AtomicU64; 4],
    packets_filtered: [AtomicU64; 4],
    translations_1to2: AtomicU64,
    translations_2to1: AtomicU64,
    routing_errors: AtomicU64,
}

/// A point-in-time, serializable copy of [`RouterStats`], returned by
/// `get_stats()` (§6).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouterStatsSnapshot {
    pub packets_routed: [[u64; 4]; 4],
    pub packets_dropped: [u64; 4],
    pub packets_filtered: [u64; 4],
    pub translations_1to2: u64,
    pub translations_2to1: u64,
    pub routing_errors: u64,
}

impl RouterStats {
    pub fn record_routed(&self, source: TransportId, destination: TransportId) {
        self.packets_routed[source.index()][destination.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self, transport: TransportId) {
        self.packets_dropped[transport.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filtered(&self, transport: TransportId) {
        self.packets_filtered[transport.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_1to2(&self) {
        self.translations_1to2.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translation_2to1(&self) {
        self.translations_2to1.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_routing_error(&self) {
        self.routing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RouterStatsSnapshot {
        let mut packets_routed = [[0u64; 4]; 4];
        for (s, row) in self.packets_routed.iter().enumerate() {
            for (d, counter) in row.iter().enumerate() {
                packets_routed[s][d] = counter.load(Ordering::Relaxed);
            }
        }
        RouterStatsSnapshot {
            packets_routed,
            packets_dropped: std::array::from_fn(|i| self.packets_dropped[i].load(Ordering::Relaxed)),
            packets_filtered: std::array::from_fn(|i| self.packets_filtered[i].load(Ordering::Relaxed)),
            translations_1to2: self.translations_1to2.load(Ordering::Relaxed),
            translations_2to1: self.translations_2to1.load(Ordering::Relaxed),
            routing_errors: self.routing_errors.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        for row in &self.packets_routed {
            for counter in row {
                counter.store(0, Ordering::Relaxed);
            }
        }
        for counter in &self.packets_dropped {
            counter.store(0, Ordering::Relaxed);
        }
        for counter in &self.packets_filtered {
            counter.store(0, Ordering::Relaxed);
        }
        self.translations_1to2.store(0, Ordering::Relaxed);
        self.translations_2to1.store(0, Ordering::Relaxed);
        self.routing_errors.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_every_counter() {
        let stats = RouterStats::default();
        stats.record_routed(TransportId::Uart, TransportId::Usb);
        stats.record_dropped(TransportId::Wifi);
        stats.record_routing_error();
        stats.reset();
        let snap = stats.snapshot();
        assert_eq!(snap.packets_routed, [[0; 4]; 4]);
        assert_eq!(snap.packets_dropped, [0; 4]);
        assert_eq!(snap.routing_errors, 0);
    }
}
