//! Fixed-window congestion controller.
//!
//! Not really congestion control: the window is a constant that only the
//! probe alarm can temporarily widen. Each alarm adds one segment so a probe
//! can go out, and the next acknowledgment restores the configured window.

use std::time::Duration;

use super::{
    CongestionControl, CongestionControlAlgorithm, CongestionControlStats, DEFAULT_INITIAL_WINDOW,
    DEFAULT_MSS,
};
use crate::logging::CONGESTION_TARGET;
use crate::recovery::{
    AckOutcome, AckRanges, LossDetectionConfig, LossRecovery, PacketNumber, RecoveryError,
    Statistic,
};
use crate::simulation::{RealTime, TimeSource};

/// Configuration for the fixed-window controller.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWindowConfig {
    /// Window size in bytes.
    pub window: usize,
    /// Growth per probe alarm.
    pub mss: usize,
    pub loss_detection: LossDetectionConfig,
}

impl Default for FixedWindowConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_WINDOW)
    }
}

impl FixedWindowConfig {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            mss: DEFAULT_MSS,
            loss_detection: LossDetectionConfig::default(),
        }
    }
}

pub struct FixedWindowController<T: TimeSource = RealTime> {
    window: usize,
    cwnd: usize,
    mss: usize,
    recovery: LossRecovery<T>,
}

impl FixedWindowController<RealTime> {
    pub fn new(config: FixedWindowConfig) -> Self {
        Self::new_with_time_source(config, RealTime::new())
    }
}

impl<T: TimeSource> FixedWindowController<T> {
    pub fn new_with_time_source(config: FixedWindowConfig, time_source: T) -> Self {
        Self {
            window: config.window,
            cwnd: config.window,
            mss: config.mss,
            recovery: LossRecovery::new(config.loss_detection, time_source),
        }
    }

    pub fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
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

        if !resolved.acked.is_empty() && self.cwnd != self.window {
            self.cwnd = self.window;
            Statistic::CongestionWindow { bytes: self.cwnd }.emit();
        }
        if !resolved.lost.is_empty() {
            tracing::debug!(
                target: CONGESTION_TARGET,
                lost = resolved.lost.len(),
                cwnd = self.cwnd,
                "Losses detected, window unchanged"
            );
        }

        self.recovery.rearm_alarm();
        Ok(resolved.to_outcome())
    }

    pub fn bytes_allowed_to_send(&self) -> usize {
        let allowed = self.cwnd.saturating_sub(self.recovery.bytes_in_flight());
        Statistic::BytesAllowedToSend { bytes: allowed }.emit();
        allowed
    }

    /// On expiry the window grows by one segment for the probe.
    pub fn check_loss_detection_alarm(&mut self) -> bool {
        if !self.recovery.poll_alarm() {
            return false;
        }
        self.cwnd = self.cwnd.saturating_add(self.mss);
        Statistic::CongestionWindow { bytes: self.cwnd }.emit();
        true
    }

    pub fn current_cwnd(&self) -> usize {
        self.cwnd
    }

    /// The configured window.
    pub fn window(&self) -> usize {
        self.window
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

    pub fn stats(&self) -> CongestionControlStats {
        let rtt = self.recovery.rtt();
        CongestionControlStats {
            algorithm: CongestionControlAlgorithm::FixedWindow,
            cwnd: self.cwnd,
            flightsize: self.flightsize(),
            ssthresh: usize::MAX,
            smoothed_rtt: rtt.smoothed_rtt(),
            rtt_variance: rtt.rtt_variance(),
            smoothed_rtt_tcp: rtt.smoothed_rtt_tcp(),
            total_losses: self.recovery.total_lost(),
            total_probes: self.recovery.probes_fired(),
            recovery_epochs: 0,
            in_recovery: false,
        }
    }
}

impl<T: TimeSource> CongestionControl for FixedWindowController<T> {
    fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        FixedWindowController::on_packet_sent(self, packet_number, is_ack_only, sent_bytes)
    }

    fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        FixedWindowController::on_ack_received(self, acks, ack_delay)
    }

    fn bytes_allowed_to_send(&self) -> usize {
        FixedWindowController::bytes_allowed_to_send(self)
    }

    fn check_loss_detection_alarm(&mut self) -> bool {
        FixedWindowController::check_loss_detection_alarm(self)
    }

    fn current_cwnd(&self) -> usize {
        FixedWindowController::current_cwnd(self)
    }

    fn flightsize(&self) -> usize {
        FixedWindowController::flightsize(self)
    }

    fn smoothed_rtt(&self) -> Duration {
        FixedWindowController::smoothed_rtt(self)
    }

    fn stats(&self) -> CongestionControlStats {
        FixedWindowController::stats(self)
    }

    fn algorithm(&self) -> CongestionControlAlgorithm {
        CongestionControlAlgorithm::FixedWindow
    }
}
