//! Adaptive congestion controller implementation.

use std::time::Duration;

use super::config::AdaptiveConfig;
use super::state::RecoveryPhase;
use super::stats::AdaptiveStats;
use crate::congestion_control::{CongestionControl, CongestionControlAlgorithm, CongestionControlStats};
use crate::logging::CONGESTION_TARGET;
use crate::recovery::{
    AckOutcome, AckRanges, LossRecovery, PacketNumber, RecoveryError, ResolvedPackets,
    SentPacketEntry, Statistic,
};
use crate::simulation::{RealTime, TimeSource};

/// Adaptive AIMD congestion controller.
pub struct AdaptiveController<T: TimeSource = RealTime> {
    mss: usize,
    min_cwnd: usize,
    loss_reduction_factor: f64,

    cwnd: usize,
    ssthresh: usize,
    /// Largest packet sent when the current epoch began.
    end_of_recovery: Option<PacketNumber>,
    bytes_tx_in_recovery: usize,
    bytes_rx_in_recovery: usize,

    peak_cwnd: usize,
    recovery_epochs: u64,
    recovery: LossRecovery<T>,
}

impl AdaptiveController<RealTime> {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self::new_with_time_source(config, RealTime::new())
    }
}

impl<T: TimeSource> AdaptiveController<T> {
    pub fn new_with_time_source(config: AdaptiveConfig, time_source: T) -> Self {
        Self {
            mss: config.mss,
            min_cwnd: config.min_cwnd,
            loss_reduction_factor: config.loss_reduction_factor,
            cwnd: config.initial_cwnd,
            ssthresh: usize::MAX,
            end_of_recovery: None,
            bytes_tx_in_recovery: 0,
            bytes_rx_in_recovery: 0,
            peak_cwnd: config.initial_cwnd,
            recovery_epochs: 0,
            recovery: LossRecovery::new(config.loss_detection, time_source),
        }
    }

    /// Whether a recovery epoch is active.
    pub fn in_recovery(&self) -> bool {
        match (self.end_of_recovery, self.recovery.largest_acked()) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(end), Some(largest_acked)) => largest_acked < end,
        }
    }

    pub fn phase(&self) -> RecoveryPhase {
        RecoveryPhase::derive(self.in_recovery(), self.cwnd, self.ssthresh)
    }

    pub fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        if !is_ack_only && self.in_recovery() {
            self.bytes_tx_in_recovery = self.bytes_tx_in_recovery.saturating_add(sent_bytes);
            tracing::trace!(
                target: CONGESTION_TARGET,
                sent_bytes,
                bytes_tx_in_recovery = self.bytes_tx_in_recovery,
                "Bytes transmitted while in recovery"
            );
        }
        self.recovery
            .on_packet_sent(packet_number, is_ack_only, sent_bytes);
        if !is_ack_only {
            self.recovery.rearm_alarm();
        }
    }

    pub fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        let resolved = self.recovery.process_ack(acks, ack_delay)?;

        for entry in &resolved.acked {
            self.on_packet_acked(entry);
        }
        if !resolved.lost.is_empty() {
            self.on_packets_lost(&resolved);
        }

        self.recovery.rearm_alarm();
        Ok(resolved.to_outcome())
    }

    fn on_packet_acked(&mut self, entry: &SentPacketEntry) {
        if self
            .end_of_recovery
            .is_some_and(|end| entry.packet_number < end)
        {
            self.bytes_rx_in_recovery = self.bytes_rx_in_recovery.saturating_add(entry.byte_size);
            tracing::trace!(
                target: CONGESTION_TARGET,
                packet_number = entry.packet_number,
                bytes_rx_in_recovery = self.bytes_rx_in_recovery,
                "Bytes received while in recovery"
            );
            return;
        }

        if self.cwnd < self.ssthresh {
            self.cwnd = self.cwnd.saturating_add(entry.byte_size);
            tracing::trace!(
                target: CONGESTION_TARGET,
                acked_bytes = entry.byte_size,
                cwnd = self.cwnd,
                "Slow start increase"
            );
        } else {
            let increase = self.mss.saturating_mul(entry.byte_size) / self.cwnd.max(1);
            self.cwnd = self.cwnd.saturating_add(increase);
            tracing::trace!(
                target: CONGESTION_TARGET,
                increase,
                cwnd = self.cwnd,
                "Congestion avoidance increase"
            );
        }
        self.peak_cwnd = self.peak_cwnd.max(self.cwnd);
        Statistic::CongestionWindow { bytes: self.cwnd }.emit();
    }

    fn on_packets_lost(&mut self, resolved: &ResolvedPackets) {
        let Some(largest_lost) = resolved.largest_lost() else {
            return;
        };
        if self.end_of_recovery.is_some_and(|end| largest_lost <= end) {
            tracing::debug!(
                target: CONGESTION_TARGET,
                lost = resolved.lost.len(),
                largest_lost,
                end_of_recovery = self.end_of_recovery,
                "Losses within current recovery epoch"
            );
            return;
        }

        let end = self.recovery.largest_sent().unwrap_or(largest_lost);
        self.end_of_recovery = Some(end);
        self.bytes_rx_in_recovery = 0;
        self.bytes_tx_in_recovery = 0;

        // float-to-int casts saturate
        let reduced = (self.cwnd as f64 * self.loss_reduction_factor) as usize;
        self.cwnd = reduced.max(self.min_cwnd);
        self.ssthresh = self.cwnd;
        self.recovery_epochs += 1;

        tracing::debug!(
            target: CONGESTION_TARGET,
            cwnd = self.cwnd,
            ssthresh = self.ssthresh,
            end_of_recovery = end,
            largest_lost,
            epochs = self.recovery_epochs,
            "Recovery epoch started"
        );
        Statistic::CongestionWindow { bytes: self.cwnd }.emit();
    }

    pub fn bytes_allowed_to_send(&self) -> usize {
        let in_flight = self.recovery.bytes_in_flight() as i128;
        let window_allowance = self.cwnd as i128 - in_flight;

        let allowance = if self.in_recovery() {
            let fast_recovery_allowance =
                self.bytes_rx_in_recovery as i128 / 2 - self.bytes_tx_in_recovery as i128;
            tracing::trace!(
                target: CONGESTION_TARGET,
                fast_recovery_allowance,
                window_allowance,
                "Recovery allowance"
            );
            fast_recovery_allowance.max(window_allowance)
        } else {
            window_allowance
        };

        let allowed = usize::try_from(allowance.max(0)).unwrap_or(usize::MAX);
        Statistic::BytesAllowedToSend { bytes: allowed }.emit();
        allowed
    }

    /// On expiry the window grows by one segment for the probe.
    pub fn check_loss_detection_alarm(&mut self) -> bool {
        if !self.recovery.poll_alarm() {
            return false;
        }
        self.cwnd = self.cwnd.saturating_add(self.mss);
        self.peak_cwnd = self.peak_cwnd.max(self.cwnd);
        Statistic::CongestionWindow { bytes: self.cwnd }.emit();
        true
    }

    pub fn current_cwnd(&self) -> usize {
        self.cwnd
    }

    pub fn ssthresh(&self) -> usize {
        self.ssthresh
    }

    pub fn end_of_recovery(&self) -> Option<PacketNumber> {
        self.end_of_recovery
    }

    pub fn flightsize(&self) -> usize {
        self.recovery.bytes_in_flight()
    }

    pub fn smoothed_rtt(&self) -> Duration {
        self.recovery.rtt().smoothed_rtt()
    }

    pub fn recovery(&self) -> &LossRecovery<T> {
        &self.recovery
    }

    pub fn adaptive_stats(&self) -> AdaptiveStats {
        AdaptiveStats {
            cwnd: self.cwnd,
            flightsize: self.flightsize(),
            ssthresh: self.ssthresh,
            phase: self.phase(),
            end_of_recovery: self.end_of_recovery,
            bytes_tx_in_recovery: self.bytes_tx_in_recovery,
            bytes_rx_in_recovery: self.bytes_rx_in_recovery,
            peak_cwnd: self.peak_cwnd,
            smoothed_rtt: self.smoothed_rtt(),
            total_losses: self.recovery.total_lost(),
            total_probes: self.recovery.probes_fired(),
            recovery_epochs: self.recovery_epochs,
        }
    }

    pub fn stats(&self) -> CongestionControlStats {
        let rtt = self.recovery.rtt();
        CongestionControlStats {
            algorithm: CongestionControlAlgorithm::Adaptive,
            cwnd: self.cwnd,
            flightsize: self.flightsize(),
            ssthresh: self.ssthresh,
            smoothed_rtt: rtt.smoothed_rtt(),
            rtt_variance: rtt.rtt_variance(),
            smoothed_rtt_tcp: rtt.smoothed_rtt_tcp(),
            total_losses: self.recovery.total_lost(),
            total_probes: self.recovery.probes_fired(),
            recovery_epochs: self.recovery_epochs,
            in_recovery: self.in_recovery(),
        }
    }
}

impl<T: TimeSource> CongestionControl for AdaptiveController<T> {
    fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        AdaptiveController::on_packet_sent(self, packet_number, is_ack_only, sent_bytes)
    }

    fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        AdaptiveController::on_ack_received(self, acks, ack_delay)
    }

    fn bytes_allowed_to_send(&self) -> usize {
        AdaptiveController::bytes_allowed_to_send(self)
    }

    fn check_loss_detection_alarm(&mut self) -> bool {
        AdaptiveController::check_loss_detection_alarm(self)
    }

    fn current_cwnd(&self) -> usize {
        AdaptiveController::current_cwnd(self)
    }

    fn flightsize(&self) -> usize {
        AdaptiveController::flightsize(self)
    }

    fn smoothed_rtt(&self) -> Duration {
        AdaptiveController::smoothed_rtt(self)
    }

    fn stats(&self) -> CongestionControlStats {
        AdaptiveController::stats(self)
    }

    fn algorithm(&self) -> CongestionControlAlgorithm {
        CongestionControlAlgorithm::Adaptive
    }
}
