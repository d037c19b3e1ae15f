/// Loss recovery configuration loaded from TOML.
pub mod config;

/// Pluggable congestion controllers behind one enum.
pub mod congestion_control;

/// Tracing targets and subscriber bootstrap.
pub mod logging;

/// Spin-bit latency measurement header and state.
pub mod measurement;

/// Congestion control and measurement of one connection path.
pub mod path;

/// RTT estimation, sent-packet ledger and loss detection.
pub mod recovery;

/// Injectable time sources, including virtual time for tests.
pub mod simulation;

pub use config::{ConfigError, RecoveryConfig};
pub use congestion_control::{
    CongestionControl, CongestionControlAlgorithm, CongestionControlConfig, CongestionControlStats,
    CongestionController,
};
pub use measurement::{MeasurementField, MeasurementHeaderData, MeasurementState, Role};
pub use path::PathRecovery;
pub use recovery::{AckOutcome, AckRange, AckRanges, PacketNumber, RecoveryError};
