//! Ledger of packets sent but not yet acknowledged or declared lost.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::ack::PacketNumber;
use crate::logging::CONGESTION_TARGET;

/// A packet awaiting its fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentPacketEntry {
    pub packet_number: PacketNumber,
    /// Send time in [`TimeSource`](crate::simulation::TimeSource) nanoseconds.
    pub sent_nanos: u64,
    /// Bytes counted in flight; zero for ack-only packets.
    pub byte_size: usize,
}

/// Packets in flight keyed by packet number.
///
/// The ledger owns the bytes-in-flight counter so it always equals the sum of
/// `byte_size` over the tracked entries.
#[derive(Debug, Default)]
pub struct SentPacketLedger {
    packets: BTreeMap<PacketNumber, SentPacketEntry>,
    bytes_in_flight: usize,
}

impl SentPacketLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly sent packet.
    ///
    /// A second insert for the same packet number replaces the first one and
    /// corrects the in-flight count accordingly.
    pub fn insert(&mut self, entry: SentPacketEntry) {
        if let Some(previous) = self.packets.insert(entry.packet_number, entry) {
            tracing::warn!(
                target: CONGESTION_TARGET,
                packet_number = entry.packet_number,
                "Packet number sent twice, replacing ledger entry"
            );
            self.bytes_in_flight = self.bytes_in_flight.saturating_sub(previous.byte_size);
        }
        self.bytes_in_flight = self.bytes_in_flight.saturating_add(entry.byte_size);
    }

    pub fn get(&self, packet_number: PacketNumber) -> Option<&SentPacketEntry> {
        self.packets.get(&packet_number)
    }

    pub fn contains(&self, packet_number: PacketNumber) -> bool {
        self.packets.contains_key(&packet_number)
    }

    /// Remove a packet, returning its entry if it was still tracked.
    pub fn remove(&mut self, packet_number: PacketNumber) -> Option<SentPacketEntry> {
        let entry = self.packets.remove(&packet_number)?;
        self.bytes_in_flight = self.bytes_in_flight.saturating_sub(entry.byte_size);
        Some(entry)
    }

    /// Remove every tracked packet in `range`, highest first.
    pub fn remove_range(&mut self, range: RangeInclusive<PacketNumber>) -> Vec<SentPacketEntry> {
        let tracked: Vec<PacketNumber> = self.packets.range(range).rev().map(|(pn, _)| *pn).collect();
        tracked.into_iter().filter_map(|pn| self.remove(pn)).collect()
    }

    /// Remove every packet numbered strictly below `bound`, lowest first.
    pub fn drain_below(&mut self, bound: PacketNumber) -> Vec<SentPacketEntry> {
        let retained = self.packets.split_off(&bound);
        let drained = std::mem::replace(&mut self.packets, retained);
        let removed: usize = drained.values().map(|e| e.byte_size).sum();
        self.bytes_in_flight = self.bytes_in_flight.saturating_sub(removed);
        drained.into_values().collect()
    }

    pub fn bytes_in_flight(&self) -> usize {
        self.bytes_in_flight
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Tracked packets in ascending packet-number order.
    pub fn iter(&self) -> impl Iterator<Item = &SentPacketEntry> {
        self.packets.values()
    }

    #[cfg(test)]
    pub(crate) fn summed_bytes(&self) -> usize {
        self.packets.values().map(|e| e.byte_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(packet_number: PacketNumber, byte_size: usize) -> SentPacketEntry {
        SentPacketEntry {
            packet_number,
            sent_nanos: packet_number * 1_000,
            byte_size,
        }
    }

    #[test]
    fn test_insert_and_remove_track_bytes() {
        let mut ledger = SentPacketLedger::new();
        ledger.insert(entry(1, 1000));
        ledger.insert(entry(2, 500));
        assert_eq!(ledger.bytes_in_flight(), 1500);
        assert_eq!(ledger.len(), 2);

        let removed = ledger.remove(1).unwrap();
        assert_eq!(removed.byte_size, 1000);
        assert_eq!(ledger.bytes_in_flight(), 500);
        assert!(!ledger.contains(1));
    }

    #[test]
    fn test_ack_only_entries_carry_no_bytes() {
        let mut ledger = SentPacketLedger::new();
        ledger.insert(entry(7, 0));
        assert!(ledger.contains(7));
        assert_eq!(ledger.bytes_in_flight(), 0);
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut ledger = SentPacketLedger::new();
        ledger.insert(entry(3, 1200));
        assert!(ledger.remove(3).is_some());
        assert!(ledger.remove(3).is_none());
        assert_eq!(ledger.bytes_in_flight(), 0);
    }

    #[test]
    fn test_duplicate_insert_replaces() {
        let mut ledger = SentPacketLedger::new();
        ledger.insert(entry(4, 1000));
        ledger.insert(entry(4, 300));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.bytes_in_flight(), 300);
        assert_eq!(ledger.summed_bytes(), 300);
    }

    #[test]
    fn test_duplicate_insert_logs_on_congestion_target() {
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct TargetRecorder(Arc<Mutex<Vec<String>>>);

        impl<S: tracing::Subscriber> Layer<S> for TargetRecorder {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                self.0
                    .lock()
                    .unwrap()
                    .push(event.metadata().target().to_string());
            }
        }

        let targets = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(TargetRecorder(targets.clone()));
        tracing::subscriber::with_default(subscriber, || {
            let mut ledger = SentPacketLedger::new();
            ledger.insert(entry(4, 1000));
            ledger.insert(entry(4, 300));
        });

        assert_eq!(*targets.lock().unwrap(), vec![CONGESTION_TARGET.to_string()]);
    }

    #[test]
    fn test_drain_below() {
        let mut ledger = SentPacketLedger::new();
        for pn in 1..=6 {
            ledger.insert(entry(pn, 100));
        }
        let drained: Vec<_> = ledger.drain_below(3).iter().map(|e| e.packet_number).collect();
        assert_eq!(drained, vec![1, 2]);
        assert_eq!(ledger.bytes_in_flight(), 400);
        assert_eq!(ledger.iter().map(|e| e.packet_number).collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(ledger.summed_bytes(), ledger.bytes_in_flight());
    }

    #[test]
    fn test_remove_range_skips_untracked() {
        let mut ledger = SentPacketLedger::new();
        for pn in [2, 3, 5, 8] {
            ledger.insert(entry(pn, 10));
        }
        let removed: Vec<_> = ledger.remove_range(3..=8).iter().map(|e| e.packet_number).collect();
        assert_eq!(removed, vec![8, 5, 3]);
        assert_eq!(ledger.bytes_in_flight(), 10);
        assert!(ledger.remove_range(3..=8).is_empty());
    }

    #[test]
    fn test_drain_below_zero_is_empty() {
        let mut ledger = SentPacketLedger::new();
        ledger.insert(entry(0, 100));
        assert!(ledger.drain_below(0).is_empty());
        assert_eq!(ledger.len(), 1);
    }
}
