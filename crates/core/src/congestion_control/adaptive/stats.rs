//! Adaptive controller statistics.

use std::time::Duration;

use super::state::RecoveryPhase;
use crate::recovery::PacketNumber;

/// Snapshot of the adaptive controller for telemetry and debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveStats {
    /// Current congestion window size (bytes).
    pub cwnd: usize,
    /// Current bytes in flight (unacknowledged).
    pub flightsize: usize,
    /// Current slow start threshold (bytes).
    pub ssthresh: usize,
    pub phase: RecoveryPhase,
    /// Largest packet sent when the last recovery epoch started.
    pub end_of_recovery: Option<PacketNumber>,
    /// Bytes sent since the current recovery epoch started.
    pub bytes_tx_in_recovery: usize,
    /// Bytes from before the epoch acknowledged during it.
    pub bytes_rx_in_recovery: usize,
    /// Peak congestion window reached during controller lifetime.
    pub peak_cwnd: usize,
    pub smoothed_rtt: Duration,
    pub total_losses: u64,
    pub total_probes: u64,
    pub recovery_epochs: u64,
}
