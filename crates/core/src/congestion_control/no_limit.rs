//! Controller that imposes no limit at all.

use std::time::Duration;

use super::{CongestionControl, CongestionControlAlgorithm, CongestionControlStats};
use crate::recovery::{AckOutcome, AckRanges, PacketNumber, RecoveryError};

/// Allows every send and tracks nothing.
///
/// Acks are accepted without validation and produce an empty outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitController;

impl NoLimitController {
    pub fn on_packet_sent(&mut self, _packet_number: PacketNumber, _is_ack_only: bool, _sent_bytes: usize) {}

    pub fn on_ack_received(
        &mut self,
        _acks: &AckRanges,
        _ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        Ok(AckOutcome::default())
    }

    pub fn bytes_allowed_to_send(&self) -> usize {
        usize::MAX
    }

    pub fn check_loss_detection_alarm(&mut self) -> bool {
        false
    }

    pub fn current_cwnd(&self) -> usize {
        usize::MAX
    }

    pub fn flightsize(&self) -> usize {
        0
    }

    pub fn smoothed_rtt(&self) -> Duration {
        Duration::ZERO
    }

    pub fn stats(&self) -> CongestionControlStats {
        CongestionControlStats {
            algorithm: CongestionControlAlgorithm::NoLimit,
            cwnd: usize::MAX,
            flightsize: 0,
            ssthresh: usize::MAX,
            smoothed_rtt: Duration::ZERO,
            rtt_variance: Duration::ZERO,
            smoothed_rtt_tcp: Duration::ZERO,
            total_losses: 0,
            total_probes: 0,
            recovery_epochs: 0,
            in_recovery: false,
        }
    }
}

impl CongestionControl for NoLimitController {
    fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        NoLimitController::on_packet_sent(self, packet_number, is_ack_only, sent_bytes)
    }

    fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        NoLimitController::on_ack_received(self, acks, ack_delay)
    }

    fn bytes_allowed_to_send(&self) -> usize {
        NoLimitController::bytes_allowed_to_send(self)
    }

    fn check_loss_detection_alarm(&mut self) -> bool {
        NoLimitController::check_loss_detection_alarm(self)
    }

    fn current_cwnd(&self) -> usize {
        NoLimitController::current_cwnd(self)
    }

    fn flightsize(&self) -> usize {
        NoLimitController::flightsize(self)
    }

    fn smoothed_rtt(&self) -> Duration {
        NoLimitController::smoothed_rtt(self)
    }

    fn stats(&self) -> CongestionControlStats {
        NoLimitController::stats(self)
    }

    fn algorithm(&self) -> CongestionControlAlgorithm {
        CongestionControlAlgorithm::NoLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_allows_sending() {
        let mut controller = NoLimitController;
        for pn in 0..100 {
            controller.on_packet_sent(pn, false, 1_000_000);
        }
        assert_eq!(controller.bytes_allowed_to_send(), usize::MAX);
        assert_eq!(controller.flightsize(), 0);
    }

    #[test]
    fn test_ack_produces_empty_outcome() {
        let mut controller = NoLimitController;
        // Never validated against sends
        let outcome = controller
            .on_ack_received(&AckRanges::single(42, 3).unwrap(), Duration::ZERO)
            .unwrap();
        assert_eq!(outcome, AckOutcome::default());
        assert!(!controller.check_loss_detection_alarm());
    }
}
