//! Congestion control and spin-bit state for one connection path.
//!
//! [`PathRecovery`] is what a connection holds: it forwards sends and acks to
//! the configured [`CongestionController`] and raises the measurement loss
//! bit once for every ack that declared packets lost.

use std::time::Duration;

use crate::congestion_control::{
    CongestionControl, CongestionControlConfig, CongestionControlStats, CongestionController,
};
use crate::logging::CONGESTION_TARGET;
use crate::measurement::{MeasurementField, MeasurementState, QueuedFrame, Role};
use crate::recovery::{AckOutcome, AckRanges, PacketNumber, RecoveryError};
use crate::simulation::{RealTime, TimeSource};

pub struct PathRecovery<T: TimeSource = RealTime> {
    controller: CongestionController<T>,
    measurement: MeasurementState<T>,
}

impl PathRecovery<RealTime> {
    pub fn new(config: &CongestionControlConfig, role: Role) -> Self {
        Self::new_with_time_source(config, role, RealTime::new())
    }
}

impl<T: TimeSource> PathRecovery<T> {
    pub fn new_with_time_source(config: &CongestionControlConfig, role: Role, time_source: T) -> Self {
        Self {
            controller: config.build_with_time_source(time_source.clone()),
            measurement: MeasurementState::new_with_time_source(role, time_source),
        }
    }

    pub fn from_parts(controller: CongestionController<T>, measurement: MeasurementState<T>) -> Self {
        Self {
            controller,
            measurement,
        }
    }

    pub fn with_max_rx_tx_delay(mut self, delay: Duration) -> Self {
        self.measurement = self.measurement.with_max_rx_tx_delay(delay);
        self
    }

    pub fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        self.controller
            .on_packet_sent(packet_number, is_ack_only, sent_bytes);
    }

    pub fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        let outcome = self.controller.on_ack_received(acks, ack_delay)?;
        if outcome.has_losses() {
            tracing::debug!(
                target: CONGESTION_TARGET,
                lost = outcome.lost.len(),
                "Raising measurement loss flag"
            );
            self.measurement.loss_measurement_tasks();
        }
        Ok(outcome)
    }

    pub fn bytes_allowed_to_send(&self) -> usize {
        self.controller.bytes_allowed_to_send()
    }

    pub fn check_loss_detection_alarm(&mut self) -> bool {
        self.controller.check_loss_detection_alarm()
    }

    /// Feed the measurement field of a received packet. Returns `true` on a
    /// spin edge.
    pub fn on_packet_received(&mut self, packet_number: PacketNumber, field: MeasurementField) -> bool {
        self.measurement
            .incoming_measurement_tasks(packet_number, field)
    }

    /// Measurement field for the header of the next outgoing packet.
    pub fn next_measurement_field<F: QueuedFrame>(
        &mut self,
        clear_queue: &[F],
        protected_queue: &[F],
    ) -> MeasurementField {
        self.measurement
            .outgoing_measurement_tasks(clear_queue, protected_queue)
    }

    pub fn controller(&self) -> &CongestionController<T> {
        &self.controller
    }

    pub fn measurement(&self) -> &MeasurementState<T> {
        &self.measurement
    }

    pub fn stats(&self) -> CongestionControlStats {
        self.controller.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::congestion_control::CongestionControlAlgorithm;
    use crate::measurement::MeasurementHeaderData;
    use crate::simulation::VirtualTime;

    struct Frame;

    impl QueuedFrame for Frame {
        fn needs_transmit(&self) -> bool {
            true
        }
    }

    fn path(algorithm: CongestionControlAlgorithm) -> (PathRecovery<VirtualTime>, VirtualTime) {
        let time = VirtualTime::new();
        let path = PathRecovery::new_with_time_source(
            &CongestionControlConfig::new(algorithm),
            Role::Server,
            time.clone(),
        );
        (path, time)
    }

    #[test]
    fn test_loss_raises_measurement_flag() {
        let (mut path, _time) = path(CongestionControlAlgorithm::Adaptive);
        for pn in 1..=6 {
            path.on_packet_sent(pn, false, 1000);
        }
        let outcome = path
            .on_ack_received(&AckRanges::single(6, 1).unwrap(), Duration::ZERO)
            .unwrap();
        assert_eq!(outcome.lost, vec![1, 2]);
        assert!(path.measurement().header().loss);

        let field = path.next_measurement_field(&[Frame], &[]);
        assert!(field.decode().loss);
        assert!(!field.decode().blocking);
    }

    #[test]
    fn test_clean_ack_leaves_flag_clear() {
        let (mut path, time) = path(CongestionControlAlgorithm::FixedWindow);
        for pn in 1..=5 {
            path.on_packet_sent(pn, false, 1000);
        }
        time.advance(Duration::from_millis(10));
        let outcome = path
            .on_ack_received(&AckRanges::single(5, 5).unwrap(), Duration::ZERO)
            .unwrap();
        assert!(!outcome.has_losses());
        assert!(!path.measurement().header().loss);
        assert_eq!(path.stats().flightsize, 0);
    }

    #[test]
    fn test_unsent_ack_does_not_touch_measurement() {
        let (mut path, _time) = path(CongestionControlAlgorithm::Adaptive);
        path.on_packet_sent(0, false, 1000);
        assert!(path
            .on_ack_received(&AckRanges::single(9, 1).unwrap(), Duration::ZERO)
            .is_err());
        assert!(!path.measurement().header().loss);
        assert_eq!(path.controller().flightsize(), 1000);
    }

    #[test]
    fn test_received_edge_reflected_in_next_header() {
        let (mut path, _time) = path(CongestionControlAlgorithm::NoLimit);
        let field = |spin| MeasurementHeaderData { spin, ..Default::default() }.encode();

        assert!(!path.on_packet_received(1, field(0)));
        assert!(path.on_packet_received(2, field(1)));
        let out = path.next_measurement_field::<Frame>(&[], &[]).decode();
        assert_eq!(out.spin, 1);
        assert!(out.valid_edge);
        assert!(out.blocking);
        assert_eq!(path.bytes_allowed_to_send(), usize::MAX);
    }
}
