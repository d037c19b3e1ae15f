//! Fixed-rate congestion controller implementation.

use std::time::Duration;

use crate::congestion_control::{
    CongestionControl, CongestionControlAlgorithm, CongestionControlStats, DEFAULT_INITIAL_WINDOW,
    DEFAULT_MSS,
};
use crate::logging::CONGESTION_TARGET;
use crate::recovery::{
    AckOutcome, AckRanges, LossDetectionConfig, LossRecovery, PacketNumber, RecoveryError,
    Statistic,
};
use crate::simulation::{RealTime, TimeSource};

/// Default rate: 100 Mbps in bytes/sec (100 * 1_000_000 / 8)
pub const DEFAULT_RATE_BYTES_PER_SEC: usize = 12_500_000;

/// Configuration for the fixed-rate controller.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRateConfig {
    /// Credit accrual in bytes per second.
    pub rate_bytes_per_sec: usize,
    /// Credit available before any time has passed.
    /// Default: one initial window (14,600 bytes)
    pub initial_credit: usize,
    /// Allowance is rounded down to a multiple of this.
    pub mss: usize,
    pub loss_detection: LossDetectionConfig,
}

impl Default for FixedRateConfig {
    fn default() -> Self {
        Self {
            rate_bytes_per_sec: DEFAULT_RATE_BYTES_PER_SEC,
            initial_credit: DEFAULT_INITIAL_WINDOW,
            mss: DEFAULT_MSS,
            loss_detection: LossDetectionConfig::default(),
        }
    }
}

impl FixedRateConfig {
    /// Create a config with the specified rate in bytes per second.
    pub fn new(rate_bytes_per_sec: usize) -> Self {
        Self {
            rate_bytes_per_sec,
            ..Default::default()
        }
    }

    /// Create a config with the specified rate in megabits per second.
    pub fn from_mbps(mbps: usize) -> Self {
        Self::new(mbps.saturating_mul(1_000_000) / 8)
    }

    pub fn with_initial_credit(mut self, initial_credit: usize) -> Self {
        self.initial_credit = initial_credit;
        self
    }
}

/// Fixed-rate congestion controller.
///
/// The allowance is computed from elapsed time and bytes transmitted only;
/// acknowledgments feed the RTT estimate and loss detection but never the
/// rate.
pub struct FixedRateController<T: TimeSource = RealTime> {
    /// Configured rate in bytes/sec.
    rate: usize,
    initial_credit: usize,
    mss: usize,
    /// Time-source nanoseconds at construction.
    start_nanos: u64,
    /// Non-ack-only bytes sent since construction.
    transmitted: usize,
    recovery: LossRecovery<T>,
}

impl FixedRateController<RealTime> {
    /// Create a new fixed-rate controller with real time.
    pub fn new(config: FixedRateConfig) -> Self {
        Self::new_with_time_source(config, RealTime::new())
    }
}

impl<T: TimeSource> FixedRateController<T> {
    /// Create a new fixed-rate controller with custom time source.
    pub fn new_with_time_source(config: FixedRateConfig, time_source: T) -> Self {
        let start_nanos = time_source.now_nanos();
        Self {
            rate: config.rate_bytes_per_sec,
            initial_credit: config.initial_credit,
            mss: config.mss,
            start_nanos,
            transmitted: 0,
            recovery: LossRecovery::new(config.loss_detection, time_source),
        }
    }

    pub fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        if !is_ack_only {
            self.transmitted = self.transmitted.saturating_add(sent_bytes);
        }
        self.recovery
            .on_packet_sent(packet_number, is_ack_only, sent_bytes);
    }

    pub fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        let resolved = self.recovery.process_ack(acks, ack_delay)?;
        if !resolved.lost.is_empty() {
            // Fixed rate doesn't respond to loss
            tracing::debug!(
                target: CONGESTION_TARGET,
                lost = resolved.lost.len(),
                rate = self.rate,
                "Losses detected, rate unchanged"
            );
        }
        Ok(resolved.to_outcome())
    }

    /// Remaining credit, rounded down to whole segments.
    pub fn bytes_allowed_to_send(&self) -> usize {
        let elapsed = self
            .recovery
            .time_source()
            .elapsed_since(self.start_nanos)
            .as_secs_f64();
        // float-to-int casts saturate
        let credit = (self.rate as f64 * elapsed) as i128 + self.initial_credit as i128;
        let mut allowance = credit - self.transmitted as i128;

        if allowance > 0 && self.mss > 0 {
            allowance -= allowance % self.mss as i128;
        }
        let allowed = usize::try_from(allowance.max(0)).unwrap_or(usize::MAX);

        Statistic::BytesAllowedToSend { bytes: allowed }.emit();
        allowed
    }

    /// No probe alarm: always `false`.
    pub fn check_loss_detection_alarm(&mut self) -> bool {
        false
    }

    /// Reports the initial credit; no window limits this controller.
    pub fn current_cwnd(&self) -> usize {
        self.initial_credit
    }

    /// Returns the configured rate.
    pub fn rate(&self) -> usize {
        self.rate
    }

    /// Bytes transmitted since construction.
    pub fn transmitted(&self) -> usize {
        self.transmitted
    }

    /// Returns current bytes in flight.
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
            algorithm: CongestionControlAlgorithm::FixedRate,
            cwnd: self.current_cwnd(),
            flightsize: self.flightsize(),
            // Use rate as ssthresh equivalent
            ssthresh: self.rate,
            smoothed_rtt: rtt.smoothed_rtt(),
            rtt_variance: rtt.rtt_variance(),
            smoothed_rtt_tcp: rtt.smoothed_rtt_tcp(),
            total_losses: self.recovery.total_lost(),
            total_probes: 0,
            recovery_epochs: 0,
            in_recovery: false,
        }
    }
}

/// Direct implementation of `CongestionControl` for `FixedRateController`.
impl<T: TimeSource> CongestionControl for FixedRateController<T> {
    fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        FixedRateController::on_packet_sent(self, packet_number, is_ack_only, sent_bytes)
    }

    fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        FixedRateController::on_ack_received(self, acks, ack_delay)
    }

    fn bytes_allowed_to_send(&self) -> usize {
        FixedRateController::bytes_allowed_to_send(self)
    }

    fn check_loss_detection_alarm(&mut self) -> bool {
        FixedRateController::check_loss_detection_alarm(self)
    }

    fn current_cwnd(&self) -> usize {
        FixedRateController::current_cwnd(self)
    }

    fn flightsize(&self) -> usize {
        FixedRateController::flightsize(self)
    }

    fn smoothed_rtt(&self) -> Duration {
        FixedRateController::smoothed_rtt(self)
    }

    fn stats(&self) -> CongestionControlStats {
        FixedRateController::stats(self)
    }

    fn algorithm(&self) -> CongestionControlAlgorithm {
        CongestionControlAlgorithm::FixedRate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::VirtualTime;

    fn controller(rate: usize, initial_credit: usize) -> (FixedRateController<VirtualTime>, VirtualTime) {
        let time = VirtualTime::new();
        let config = FixedRateConfig::new(rate).with_initial_credit(initial_credit);
        (FixedRateController::new_with_time_source(config, time.clone()), time)
    }

    #[test]
    fn test_default_config() {
        let config = FixedRateConfig::default();
        assert_eq!(config.rate_bytes_per_sec, 12_500_000); // 100 Mbps
        assert_eq!(config.initial_credit, 14_600);
    }

    #[test]
    fn test_from_mbps() {
        let config = FixedRateConfig::from_mbps(100);
        assert_eq!(config.rate_bytes_per_sec, 12_500_000);
    }

    #[test]
    fn test_initial_credit_rounded_to_mss() {
        let (controller, _time) = controller(1_000_000, 5_000);
        // 5000 rounded down to 3 * 1460
        assert_eq!(controller.bytes_allowed_to_send(), 4_380);
    }

    #[test]
    fn test_credit_grows_with_time() {
        let (mut controller, time) = controller(1_000_000, 0);
        assert_eq!(controller.bytes_allowed_to_send(), 0);

        time.advance(Duration::from_millis(10));
        // 10_000 bytes of credit -> 6 segments
        assert_eq!(controller.bytes_allowed_to_send(), 8_760);

        controller.on_packet_sent(0, false, 8_760);
        assert_eq!(controller.bytes_allowed_to_send(), 0);
        assert_eq!(controller.transmitted(), 8_760);
    }

    #[test]
    fn test_overdrawn_credit_clamped_to_zero() {
        let (mut controller, _time) = controller(1_000, 0);
        controller.on_packet_sent(0, false, 50_000);
        assert_eq!(controller.bytes_allowed_to_send(), 0);
    }

    #[test]
    fn test_ack_only_packets_do_not_consume_credit() {
        let (mut controller, _time) = controller(1_000, 2_920);
        controller.on_packet_sent(0, true, 60);
        assert_eq!(controller.transmitted(), 0);
        assert_eq!(controller.bytes_allowed_to_send(), 2_920);
    }

    #[test]
    fn test_losses_detected_but_rate_unchanged() {
        let (mut controller, time) = controller(1_000_000, 0);
        for pn in 1..=6 {
            controller.on_packet_sent(pn, false, 1000);
        }
        time.advance(Duration::from_millis(30));
        let outcome = controller
            .on_ack_received(&AckRanges::single(6, 1).unwrap(), Duration::ZERO)
            .unwrap();

        assert_eq!(outcome.lost, vec![1, 2]);
        assert_eq!(controller.rate(), 1_000_000);
        assert_eq!(controller.flightsize(), 3000);
        assert_eq!(controller.stats().total_losses, 2);
        assert_eq!(controller.smoothed_rtt(), Duration::from_millis(30));
    }

    #[test]
    fn test_no_probe_alarm() {
        let (mut controller, time) = controller(1_000, 0);
        controller.on_packet_sent(0, false, 1000);
        time.advance(Duration::from_secs(10));
        assert!(!controller.check_loss_detection_alarm());
        assert_eq!(controller.recovery().alarm_deadline(), None);
    }
}
