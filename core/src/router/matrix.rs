//! The routing matrix, filter table and merge/auto-translate flags,
//! published as one immutable snapshot per the "atomic pointer swap" design
//! note (§9): administrative calls build a new `RoutingSnapshot` and publish
//! it, the router reads one snapshot per packet rather than locking the
//! matrix for the duration of a routing decision.

use crate::router::filter::Filter;
use crate::router::transport::TransportId;

#[derive(Debug, Clone)]
pub struct RoutingSnapshot {
    matrix: [[bool; 4]; 4],
    filters: [Filter; 4],
    pub merge_inputs: bool,
    pub auto_translate: bool,
}

impl Default for RoutingSnapshot {
    fn default() -> Self {
        RoutingSnapshot {
            matrix: [[false; 4]; 4],
            filters: [Filter::default(); 4],
            merge_inputs: false,
            auto_translate: true,
        }
    }
}

impl RoutingSnapshot {
    /// `M[source][destination]`. The diagonal is always treated as false by
    /// the router regardless of what's stored here (loop suppression is
    /// enforced unconditionally, §3).
    pub fn route_enabled(&self, source: TransportId, destination: TransportId) -> bool {
        self.matrix[source.index()][destination.index()]
    }

    pub fn filter(&self, input: TransportId) -> &Filter {
        &self.filters[input.index()]
    }

    /// Destinations a packet from `source` should be considered for, before
    /// per-input filtering and loop suppression (§4.6 step 2).
    pub fn candidates(&self, source: TransportId) -> Vec<TransportId> {
        TransportId::ALL
            .into_iter()
            .filter(|&d| d != source)
            .filter(|&d| self.merge_inputs || self.route_enabled(source, d))
            .collect()
    }

    pub fn with_route(mut self, source: TransportId, destination: TransportId, enabled: bool) -> Self {
        self.matrix[source.index()][destination.index()] = enabled;
        self
    }

    pub fn with_filter(mut self, input: TransportId, filter: Filter) -> Self {
        self.filters[input.index()] = filter;
        self
    }

    pub fn with_merge_inputs(mut self, merge_inputs: bool) -> Self {
        self.merge_inputs = merge_inputs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_suppression_excludes_source_even_when_merging() {
        let snapshot = RoutingSnapshot::default().with_merge_inputs(true);
        let candidates = snapshot.candidates(TransportId::Uart);
        assert!(!candidates.contains(&TransportId::Uart));
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn non_merge_mode_follows_matrix() {
        let snapshot = RoutingSnapshot::default().with_route(TransportId::Uart, TransportId::Usb, true);
        let candidates = snapshot.candidates(TransportId::Uart);
        assert_eq!(candidates, vec![TransportId::Usb]);
    }
}
