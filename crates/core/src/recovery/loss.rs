//! Shared acknowledgment processing, loss detection and probe alarm.
//!
//! Every window-tracking congestion controller owns one [`LossRecovery`]. It
//! keeps the sent-packet ledger and the RTT estimate, turns ack frames into
//! newly acknowledged and newly lost packets, and schedules the Tail Loss
//! Probe alarm. Controllers only decide what those events mean for the
//! congestion window.
//!
//! ## Loss rule
//!
//! After every ack event a still-tracked packet `p` is lost when
//! `largest_acked - p > reordering_threshold`. All packets meeting the rule
//! are reported together as one batch, lowest packet number first.
//!
//! ## Probe alarm
//!
//! While bytes are in flight the alarm is set to
//! `time_of_last_sent + max(tlp_rtt_multiplier * smoothed_rtt, min_tlp_timeout)`.
//! After it fires the next deadline is computed from the later of the last
//! send and the expired deadline, so one expiry fires exactly once.

use std::time::Duration;

use thiserror::Error;

use super::ack::{AckRanges, PacketNumber};
use super::rtt::RttEstimator;
use super::sent_packets::{SentPacketEntry, SentPacketLedger};
use super::stats::Statistic;
use crate::logging::CONGESTION_TARGET;
use crate::simulation::TimeSource;

/// Packets this far below the largest acknowledged one are declared lost.
pub const DEFAULT_REORDERING_THRESHOLD: u64 = 3;

/// Lower bound of the probe timeout.
pub const DEFAULT_MIN_TLP_TIMEOUT: Duration = Duration::from_millis(10);

/// Probe timeout as a multiple of the smoothed RTT.
pub const DEFAULT_TLP_RTT_MULTIPLIER: f64 = 1.5;

/// Loss detection tuning shared by all tracking controllers.
#[derive(Debug, Clone, PartialEq)]
pub struct LossDetectionConfig {
    pub reordering_threshold: u64,
    pub min_tlp_timeout: Duration,
    pub tlp_rtt_multiplier: f64,
}

impl Default for LossDetectionConfig {
    fn default() -> Self {
        Self {
            reordering_threshold: DEFAULT_REORDERING_THRESHOLD,
            min_tlp_timeout: DEFAULT_MIN_TLP_TIMEOUT,
            tlp_rtt_multiplier: DEFAULT_TLP_RTT_MULTIPLIER,
        }
    }
}

/// Errors raised while processing acknowledgments.
///
/// Raised before any recovery state is modified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("peer acknowledged packet {packet_number} which was never sent (largest sent: {largest_sent:?})")]
    UnsentPacketAcked {
        packet_number: PacketNumber,
        largest_sent: Option<PacketNumber>,
    },
}

/// Result of one ack event, as reported to the connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckOutcome {
    /// Packets acknowledged for the first time, in ack-frame order.
    pub acked: Vec<PacketNumber>,
    /// Packets declared lost by this event, ascending.
    pub lost: Vec<PacketNumber>,
    /// Raw RTT sample taken from the largest acknowledged packet.
    pub rtt_sample: Option<Duration>,
}

impl AckOutcome {
    pub fn has_losses(&self) -> bool {
        !self.lost.is_empty()
    }
}

/// Ledger entries resolved by one ack event.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPackets {
    pub acked: Vec<SentPacketEntry>,
    pub lost: Vec<SentPacketEntry>,
    pub rtt_sample: Option<Duration>,
}

impl ResolvedPackets {
    pub fn largest_lost(&self) -> Option<PacketNumber> {
        self.lost.last().map(|e| e.packet_number)
    }

    pub fn to_outcome(&self) -> AckOutcome {
        AckOutcome {
            acked: self.acked.iter().map(|e| e.packet_number).collect(),
            lost: self.lost.iter().map(|e| e.packet_number).collect(),
            rtt_sample: self.rtt_sample,
        }
    }
}

pub struct LossRecovery<T: TimeSource> {
    time_source: T,
    config: LossDetectionConfig,
    ledger: SentPacketLedger,
    rtt: RttEstimator,
    largest_sent: Option<PacketNumber>,
    largest_acked: Option<PacketNumber>,
    time_of_last_sent: Option<u64>,
    /// Probe deadline in time-source nanoseconds.
    alarm_deadline: Option<u64>,
    total_lost: u64,
    probes_fired: u64,
}

impl<T: TimeSource> LossRecovery<T> {
    pub fn new(config: LossDetectionConfig, time_source: T) -> Self {
        Self {
            time_source,
            config,
            ledger: SentPacketLedger::new(),
            rtt: RttEstimator::new(),
            largest_sent: None,
            largest_acked: None,
            time_of_last_sent: None,
            alarm_deadline: None,
            total_lost: 0,
            probes_fired: 0,
        }
    }

    /// Record a packet handed to the network.
    ///
    /// Ack-only packets are tracked with zero bytes so they can still be
    /// acknowledged or declared lost.
    pub fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        let now = self.time_source.now_nanos();
        self.time_of_last_sent = Some(now);
        self.largest_sent = Some(self.largest_sent.map_or(packet_number, |l| l.max(packet_number)));

        let byte_size = if is_ack_only { 0 } else { sent_bytes };
        self.ledger.insert(SentPacketEntry {
            packet_number,
            sent_nanos: now,
            byte_size,
        });

        tracing::trace!(
            target: CONGESTION_TARGET,
            packet_number,
            sent_bytes,
            is_ack_only,
            bytes_in_flight = self.ledger.bytes_in_flight(),
            "Packet sent"
        );
        if !is_ack_only {
            Statistic::BytesInFlight {
                bytes: self.ledger.bytes_in_flight(),
            }
            .emit();
        }
    }

    /// Resolve an ack frame into newly acknowledged and newly lost packets.
    pub fn process_ack(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<ResolvedPackets, RecoveryError> {
        let largest = acks.largest();
        match self.largest_sent {
            Some(sent) if largest <= sent => {}
            largest_sent => {
                return Err(RecoveryError::UnsentPacketAcked {
                    packet_number: largest,
                    largest_sent,
                })
            }
        }

        self.largest_acked = Some(self.largest_acked.map_or(largest, |l| l.max(largest)));

        let mut resolved = ResolvedPackets::default();

        if let Some(entry) = self.ledger.get(largest) {
            let sample = self.time_source.elapsed_since(entry.sent_nanos);
            self.rtt.update_from_sample(sample, ack_delay);
            resolved.rtt_sample = Some(sample);
        }

        for range in acks.ranges() {
            for entry in self.ledger.remove_range(range.first_packet()..=range.last_packet) {
                let rtt = self.time_source.elapsed_since(entry.sent_nanos);
                tracing::trace!(
                    target: CONGESTION_TARGET,
                    packet_number = entry.packet_number,
                    bytes = entry.byte_size,
                    "First ack for packet"
                );
                Statistic::AckDelay {
                    packet_number: entry.packet_number,
                    rtt,
                }
                .emit();
                resolved.acked.push(entry);
            }
        }

        resolved.lost = self.detect_lost_packets();

        Statistic::BytesInFlight {
            bytes: self.ledger.bytes_in_flight(),
        }
        .emit();

        Ok(resolved)
    }

    fn detect_lost_packets(&mut self) -> Vec<SentPacketEntry> {
        let Some(largest_acked) = self.largest_acked else {
            return Vec::new();
        };
        let bound = largest_acked.saturating_sub(self.config.reordering_threshold);
        let lost = self.ledger.drain_below(bound);

        for entry in &lost {
            tracing::debug!(
                target: CONGESTION_TARGET,
                packet_number = entry.packet_number,
                bytes = entry.byte_size,
                largest_acked,
                "Packet declared lost"
            );
            Statistic::LostPacket {
                packet_number: entry.packet_number,
            }
            .emit();
        }
        self.total_lost += lost.len() as u64;
        lost
    }

    /// Probe timeout for the current RTT estimate.
    pub fn tlp_timeout(&self) -> Duration {
        let scaled = Duration::try_from_secs_f64(
            self.rtt.smoothed_rtt().as_secs_f64() * self.config.tlp_rtt_multiplier,
        )
        .unwrap_or(Duration::MAX);
        scaled.max(self.config.min_tlp_timeout)
    }

    /// Recompute the probe deadline from the last send time.
    pub fn rearm_alarm(&mut self) {
        let base = self.time_of_last_sent;
        self.arm_alarm_from(base);
    }

    fn arm_alarm_from(&mut self, base: Option<u64>) {
        if self.ledger.bytes_in_flight() == 0 {
            self.alarm_deadline = None;
            return;
        }
        let Some(base) = base else {
            self.alarm_deadline = None;
            return;
        };
        let timeout = u64::try_from(self.tlp_timeout().as_nanos()).unwrap_or(u64::MAX);
        self.alarm_deadline = Some(base.saturating_add(timeout));
    }

    /// Fire the probe alarm once its deadline has strictly passed.
    ///
    /// Returns `true` when it fired; the alarm is re-armed before returning.
    pub fn poll_alarm(&mut self) -> bool {
        let Some(deadline) = self.alarm_deadline else {
            return false;
        };
        if self.time_source.now_nanos() <= deadline {
            return false;
        }

        self.probes_fired += 1;
        tracing::debug!(
            target: CONGESTION_TARGET,
            deadline_nanos = deadline,
            bytes_in_flight = self.ledger.bytes_in_flight(),
            probes_fired = self.probes_fired,
            "Loss detection alarm fired"
        );
        Statistic::LossDetectionAlarm.emit();

        let base = self.time_of_last_sent.map_or(deadline, |sent| sent.max(deadline));
        self.arm_alarm_from(Some(base));
        true
    }

    pub fn disarm_alarm(&mut self) {
        self.alarm_deadline = None;
    }

    pub fn alarm_deadline(&self) -> Option<u64> {
        self.alarm_deadline
    }

    pub fn bytes_in_flight(&self) -> usize {
        self.ledger.bytes_in_flight()
    }

    pub fn ledger(&self) -> &SentPacketLedger {
        &self.ledger
    }

    pub fn rtt(&self) -> &RttEstimator {
        &self.rtt
    }

    pub fn largest_sent(&self) -> Option<PacketNumber> {
        self.largest_sent
    }

    pub fn largest_acked(&self) -> Option<PacketNumber> {
        self.largest_acked
    }

    pub fn time_of_last_sent(&self) -> Option<u64> {
        self.time_of_last_sent
    }

    pub fn total_lost(&self) -> u64 {
        self.total_lost
    }

    pub fn probes_fired(&self) -> u64 {
        self.probes_fired
    }

    pub fn config(&self) -> &LossDetectionConfig {
        &self.config
    }

    pub fn time_source(&self) -> &T {
        &self.time_source
    }
}
