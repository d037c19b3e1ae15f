//! Round-trip time estimation.
//!
//! Two exponentially weighted filters run side by side on every sample:
//!
//! - the primary estimate, fed the sample minus the peer's reported ack delay,
//!   drives the loss detection alarm;
//! - the "TCP" estimate, fed the raw sample, is kept for comparison with
//!   classic TCP behaviour and only reported.
//!
//! Both share the smoothing rule `smoothed = 7/8 * smoothed + 1/8 * sample`.
//! They differ in how strongly the variance tracks the deviation.

use std::time::Duration;

use super::stats::Statistic;
use crate::logging::CONGESTION_TARGET;

/// One smoothed RTT / variance pair.
///
/// Variance update: `variance = variance * 3/4 + |smoothed - sample| * gain/4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothedRtt {
    smoothed: Duration,
    variance: Duration,
    /// Numerator of the deviation gain, in quarters.
    deviation_gain: u128,
    has_sample: bool,
}

impl SmoothedRtt {
    fn with_deviation_gain(deviation_gain: u128) -> Self {
        Self {
            smoothed: Duration::ZERO,
            variance: Duration::ZERO,
            deviation_gain,
            has_sample: false,
        }
    }

    /// Filter used for the ack-delay compensated estimate.
    pub fn primary() -> Self {
        Self::with_deviation_gain(1)
    }

    /// Filter used for the raw, TCP-style estimate.
    pub fn tcp() -> Self {
        Self::with_deviation_gain(3)
    }

    pub fn update(&mut self, sample: Duration) {
        if !self.has_sample {
            self.smoothed = sample;
            self.variance = sample / 2;
            self.has_sample = true;
            return;
        }

        let smoothed = self.smoothed.as_nanos();
        let variance = self.variance.as_nanos();
        let sample_nanos = sample.as_nanos();
        let deviation = smoothed.abs_diff(sample_nanos);

        self.variance = from_nanos(variance * 3 / 4 + deviation * self.deviation_gain / 4);
        self.smoothed = from_nanos(smoothed * 7 / 8 + sample_nanos / 8);
    }

    pub fn smoothed(&self) -> Duration {
        self.smoothed
    }

    pub fn variance(&self) -> Duration {
        self.variance
    }

    pub fn has_sample(&self) -> bool {
        self.has_sample
    }
}

fn from_nanos(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Dual RTT estimator fed from the largest newly acknowledged packet of each
/// ack event.
#[derive(Debug, Clone)]
pub struct RttEstimator {
    primary: SmoothedRtt,
    tcp: SmoothedRtt,
    latest: Option<Duration>,
}

impl Default for RttEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RttEstimator {
    pub fn new() -> Self {
        Self {
            primary: SmoothedRtt::primary(),
            tcp: SmoothedRtt::tcp(),
            latest: None,
        }
    }

    /// Feed one raw RTT sample and the peer's reported ack delay.
    ///
    /// The ack delay is subtracted for the primary estimate only when
    /// `sample > ack_delay > 0`.
    pub fn update_from_sample(&mut self, sample: Duration, ack_delay: Duration) {
        tracing::trace!(
            target: CONGESTION_TARGET,
            latest_rtt_us = sample.as_micros() as u64,
            ack_delay_us = ack_delay.as_micros() as u64,
            "RTT sample"
        );

        self.latest = Some(sample);

        self.tcp.update(sample);
        Statistic::RttTcp {
            smoothed: self.tcp.smoothed(),
            variance: self.tcp.variance(),
        }
        .emit();

        let adjusted = if sample > ack_delay && !ack_delay.is_zero() {
            sample - ack_delay
        } else {
            sample
        };
        self.primary.update(adjusted);

        tracing::debug!(
            target: CONGESTION_TARGET,
            srtt_us = self.primary.smoothed().as_micros() as u64,
            rttvar_us = self.primary.variance().as_micros() as u64,
            srtt_tcp_us = self.tcp.smoothed().as_micros() as u64,
            "RTT estimate updated"
        );
        Statistic::Rtt {
            smoothed: self.primary.smoothed(),
            variance: self.primary.variance(),
        }
        .emit();
    }

    /// Ack-delay compensated smoothed RTT, zero before the first sample.
    pub fn smoothed_rtt(&self) -> Duration {
        self.primary.smoothed()
    }

    pub fn rtt_variance(&self) -> Duration {
        self.primary.variance()
    }

    /// Raw smoothed RTT, zero before the first sample.
    pub fn smoothed_rtt_tcp(&self) -> Duration {
        self.tcp.smoothed()
    }

    pub fn rtt_variance_tcp(&self) -> Duration {
        self.tcp.variance()
    }

    /// Most recent raw sample.
    pub fn latest_rtt(&self) -> Option<Duration> {
        self.latest
    }

    pub fn has_samples(&self) -> bool {
        self.primary.has_sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_initial_state() {
        let est = RttEstimator::new();
        assert!(!est.has_samples());
        assert_eq!(est.smoothed_rtt(), Duration::ZERO);
        assert_eq!(est.latest_rtt(), None);
    }

    #[test]
    fn test_first_sample() {
        let mut est = RttEstimator::new();
        est.update_from_sample(ms(100), Duration::ZERO);

        assert_eq!(est.smoothed_rtt(), ms(100));
        assert_eq!(est.rtt_variance(), ms(50));
        assert_eq!(est.smoothed_rtt_tcp(), ms(100));
        assert_eq!(est.rtt_variance_tcp(), ms(50));
        assert_eq!(est.latest_rtt(), Some(ms(100)));
    }

    #[test]
    fn test_second_sample_moves_eighth_of_gap() {
        let mut est = RttEstimator::new();
        est.update_from_sample(ms(100), Duration::ZERO);
        est.update_from_sample(ms(180), Duration::ZERO);

        // 100 + (180 - 100) / 8
        assert_eq!(est.smoothed_rtt(), ms(110));
        // 50 * 3/4 + 80 * 1/4
        assert_eq!(est.rtt_variance(), ms(57) + Duration::from_micros(500));
    }

    #[test]
    fn test_tcp_variance_uses_larger_gain() {
        let mut est = RttEstimator::new();
        est.update_from_sample(ms(100), Duration::ZERO);
        est.update_from_sample(ms(180), Duration::ZERO);

        assert_eq!(est.smoothed_rtt_tcp(), ms(110));
        // 50 * 3/4 + 80 * 3/4
        assert_eq!(est.rtt_variance_tcp(), ms(97) + Duration::from_micros(500));
    }

    #[test]
    fn test_sample_below_smoothed() {
        let mut est = RttEstimator::new();
        est.update_from_sample(ms(80), Duration::ZERO);
        est.update_from_sample(ms(40), Duration::ZERO);

        assert_eq!(est.smoothed_rtt(), ms(75));
        assert_eq!(est.rtt_variance(), ms(40));
    }

    #[test]
    fn test_ack_delay_subtracted_from_primary_only() {
        let mut est = RttEstimator::new();
        est.update_from_sample(ms(100), ms(30));

        assert_eq!(est.smoothed_rtt(), ms(70));
        assert_eq!(est.smoothed_rtt_tcp(), ms(100));
    }

    #[test]
    fn test_ack_delay_ignored_when_not_smaller_than_sample() {
        let mut est = RttEstimator::new();
        est.update_from_sample(ms(20), ms(20));
        assert_eq!(est.smoothed_rtt(), ms(20));

        let mut est = RttEstimator::new();
        est.update_from_sample(ms(20), ms(500));
        assert_eq!(est.smoothed_rtt(), ms(20));
    }

    #[test]
    fn test_zero_sample_counts_as_first() {
        let mut est = RttEstimator::new();
        est.update_from_sample(Duration::ZERO, Duration::ZERO);
        assert!(est.has_samples());

        est.update_from_sample(ms(80), Duration::ZERO);
        assert_eq!(est.smoothed_rtt(), ms(10));
    }

    #[test]
    fn test_huge_samples_saturate() {
        let mut est = RttEstimator::new();
        est.update_from_sample(Duration::MAX, Duration::ZERO);
        est.update_from_sample(Duration::MAX, Duration::ZERO);
        assert!(est.smoothed_rtt() > Duration::from_secs(1_000_000));
    }
}
