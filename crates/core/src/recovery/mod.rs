//! Loss recovery building blocks shared by the congestion controllers.
//!
//! - [`ack`]: validated acknowledgment ranges
//! - [`rtt`]: dual smoothed RTT estimator
//! - [`sent_packets`]: ledger of packets in flight
//! - [`loss`]: ack processing, reordering-threshold loss detection and the
//!   Tail Loss Probe alarm
//! - [`stats`]: time-series records emitted while recovering

pub mod ack;
pub mod loss;
pub mod rtt;
pub mod sent_packets;
pub mod stats;

pub use ack::{AckRange, AckRangeError, AckRanges, PacketNumber};
pub use loss::{
    AckOutcome, LossDetectionConfig, LossRecovery, RecoveryError, ResolvedPackets,
    DEFAULT_MIN_TLP_TIMEOUT, DEFAULT_REORDERING_THRESHOLD, DEFAULT_TLP_RTT_MULTIPLIER,
};
pub use rtt::{RttEstimator, SmoothedRtt};
pub use sent_packets::{SentPacketEntry, SentPacketLedger};
pub use stats::Statistic;
