//! Per-connection spin-bit state machine.

use std::time::Duration;

use super::header::{LatencyStatus, MeasurementField, MeasurementHeaderData, SPIN_MODULUS};
use crate::logging::MEASUREMENT_TARGET;
use crate::recovery::PacketNumber;
use crate::simulation::{RealTime, TimeSource};

/// An outgoing edge must be sent within this long of the incoming edge to be
/// flagged valid.
pub const DEFAULT_MAX_RX_TX_DELAY: Duration = Duration::from_millis(1);

/// Which end of the connection this state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Advances the spin value on every round trip.
    Client,
    /// Reflects the spin value it last received.
    Server,
}

/// A frame waiting in an output queue.
pub trait QueuedFrame {
    fn needs_transmit(&self) -> bool;
}

impl<F: QueuedFrame + ?Sized> QueuedFrame for &F {
    fn needs_transmit(&self) -> bool {
        (**self).needs_transmit()
    }
}

/// Spin-bit state of one connection endpoint.
///
/// Call [`incoming_measurement_tasks`](Self::incoming_measurement_tasks) for
/// every received packet, [`outgoing_measurement_tasks`](Self::outgoing_measurement_tasks)
/// when building every outgoing header, and
/// [`loss_measurement_tasks`](Self::loss_measurement_tasks) whenever packets
/// are declared lost.
pub struct MeasurementState<T: TimeSource = RealTime> {
    header: MeasurementHeaderData,
    role: Role,
    max_rx_tx_delay: Duration,
    max_packet_number: Option<PacketNumber>,
    last_rx_spin: Option<u8>,
    rx_edge_nanos: u64,
    generating_edge: bool,
    incoming_status: LatencyStatus,
    edges_seen: u64,
    time_source: T,
}

impl MeasurementState<RealTime> {
    pub fn new(role: Role) -> Self {
        Self::new_with_time_source(role, RealTime::new())
    }
}

impl<T: TimeSource> MeasurementState<T> {
    pub fn new_with_time_source(role: Role, time_source: T) -> Self {
        let rx_edge_nanos = time_source.now_nanos();
        Self {
            header: MeasurementHeaderData::default(),
            role,
            max_rx_tx_delay: DEFAULT_MAX_RX_TX_DELAY,
            max_packet_number: None,
            last_rx_spin: None,
            rx_edge_nanos,
            generating_edge: false,
            incoming_status: LatencyStatus::Invalid,
            edges_seen: 0,
            time_source,
        }
    }

    pub fn with_max_rx_tx_delay(mut self, delay: Duration) -> Self {
        self.max_rx_tx_delay = delay;
        self
    }

    /// Process the measurement field of a received packet.
    ///
    /// Packets at or below the highest packet number seen are ignored.
    /// Returns `true` if the packet carried a spin edge.
    pub fn incoming_measurement_tasks(
        &mut self,
        packet_number: PacketNumber,
        field: MeasurementField,
    ) -> bool {
        if self.max_packet_number.is_some_and(|max| packet_number <= max) {
            tracing::trace!(
                target: MEASUREMENT_TARGET,
                packet_number,
                max_packet_number = self.max_packet_number,
                "Ignoring reordered packet"
            );
            return false;
        }
        self.max_packet_number = Some(packet_number);

        let received = field.decode();
        self.incoming_status = received.status;

        let is_edge = self
            .last_rx_spin
            .is_some_and(|previous| previous != received.spin);
        if is_edge {
            self.rx_edge_nanos = self.time_source.now_nanos();
            self.generating_edge = true;
            self.header.loss = false;
            self.edges_seen += 1;
            tracing::trace!(
                target: MEASUREMENT_TARGET,
                packet_number,
                spin = received.spin,
                "Spin edge received"
            );
        }

        self.header.spin = match self.role {
            Role::Server => received.spin,
            Role::Client => (received.spin + 1) % SPIN_MODULUS,
        };
        self.last_rx_spin = Some(received.spin);
        is_edge
    }

    /// Compute the measurement field for the next outgoing packet.
    pub fn outgoing_measurement_tasks<F: QueuedFrame>(
        &mut self,
        clear_queue: &[F],
        protected_queue: &[F],
    ) -> MeasurementField {
        if self.generating_edge {
            let delay = self.time_source.elapsed_since(self.rx_edge_nanos);
            if delay > self.max_rx_tx_delay {
                self.header.valid = false;
                self.header.valid_edge = false;
                self.header.status = LatencyStatus::Invalid;
                tracing::trace!(
                    target: MEASUREMENT_TARGET,
                    delay_us = delay.as_micros() as u64,
                    "Outgoing edge too late"
                );
            } else {
                self.header.valid = true;
                self.header.valid_edge = true;
                self.header.status = self.incoming_status.advanced();
            }
        } else {
            self.header.status = LatencyStatus::Invalid;
            self.header.valid_edge = false;
        }
        self.generating_edge = false;

        self.header.blocking = !clear_queue
            .iter()
            .chain(protected_queue)
            .any(QueuedFrame::needs_transmit);

        self.header.encode()
    }

    /// Raise the loss flag until the next incoming edge.
    pub fn loss_measurement_tasks(&mut self) {
        self.header.loss = true;
    }

    /// Header values as of the last update.
    pub fn header(&self) -> &MeasurementHeaderData {
        &self.header
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn generating_edge(&self) -> bool {
        self.generating_edge
    }

    pub fn edges_seen(&self) -> u64 {
        self.edges_seen
    }

    pub fn max_packet_number(&self) -> Option<PacketNumber> {
        self.max_packet_number
    }
}
