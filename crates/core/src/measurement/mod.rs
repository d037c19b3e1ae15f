//! Spin-bit latency measurement.
//!
//! Every packet header carries a one-byte [`MeasurementField`]. The spin
//! value bounces between the endpoints: the server reflects what it last
//! received, the client advances it by one. An on-path observer sees the
//! spin value change once per round trip. The remaining bits let the
//! observer judge whether an edge is trustworthy:
//!
//! - an edge reflected more than [`DEFAULT_MAX_RX_TX_DELAY`] after it was
//!   received is flagged invalid,
//! - `status` counts how many consecutive valid edges the path has seen,
//! - `blocking` tells the peer nothing was waiting to be sent,
//! - `loss` is raised when loss recovery declares packets lost.

mod header;
mod state;

pub use header::{LatencyStatus, MeasurementField, MeasurementHeaderData, SPIN_MODULUS};
pub use state::{MeasurementState, QueuedFrame, Role, DEFAULT_MAX_RX_TX_DELAY};
