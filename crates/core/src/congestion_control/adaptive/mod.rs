//! Adaptive window-based congestion controller.
//!
//! Classic NewReno-style AIMD driven by QUIC's per-packet-number
//! acknowledgments:
//!
//! - **Slow start** while `cwnd < ssthresh`: every acknowledged byte grows
//!   the window by one byte.
//! - **Congestion avoidance** otherwise: each acknowledged packet grows the
//!   window by `mss * acked_bytes / cwnd`, about one segment per RTT.
//! - **Recovery**: a loss newer than the current epoch starts a new one. The
//!   epoch ends once every packet sent before it started has been resolved,
//!   i.e. once the largest acknowledged packet reaches `end_of_recovery`.
//!
//! ## Fast recovery allowance
//!
//! Inside an epoch, acknowledgments of packets sent before the epoch don't
//! grow the window; their bytes are counted instead. The connection may send
//! whichever is larger: the room left in the reduced window, or half of the
//! bytes acknowledged during recovery minus what was already sent during
//! recovery. The latter keeps the ack clock ticking after a burst of losses
//! empties the window.
//!
//! ## Probe alarm
//!
//! A Tail Loss Probe alarm is armed while bytes are in flight. When it
//! expires the window grows by one segment so a probe can be sent.

mod config;
mod controller;
mod state;
mod stats;


pub use config::AdaptiveConfig;
pub use controller::AdaptiveController;
pub use state::RecoveryPhase;
pub use stats::AdaptiveStats;
