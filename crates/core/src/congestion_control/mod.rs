//! Congestion control interface for the transport.
//!
//! This module provides a pluggable interface for the congestion controllers,
//! allowing selection between them via configuration.
//!
//! ## Design
//!
//! The design uses enum dispatch rather than trait objects since all
//! controller types are known at compile time. This provides:
//! - Zero-cost abstraction (no vtable indirection)
//! - Full access to variant-specific state via pattern matching
//! - Type-safe configuration
//!
//! Every variant except [`NoLimitController`] owns a
//! [`LossRecovery`](crate::recovery::LossRecovery) holding the sent-packet
//! ledger, the RTT estimate and the loss detection state. Variants only decide
//! how big the window is and whether the probe alarm is used.
//!
//! ## Supported Algorithms
//!
//! | Variant | Window policy | Loss detection | Probe alarm |
//! |---|---|---|---|
//! | `NoLimit` | unlimited | none | none |
//! | `FixedRate` | byte credit growing at a constant rate | reordering threshold | none |
//! | `FixedWindow` | static window | reordering threshold | TLP |
//! | `Adaptive` (default) | slow start / AIMD / recovery epochs | reordering threshold | TLP |
//!
//! ## Usage
//!
//! ```ignore
//! use pinq::congestion_control::{CongestionControl, CongestionControlConfig};
//! use pinq::recovery::AckRanges;
//!
//! let mut controller = CongestionControlConfig::default().build();
//!
//! controller.on_packet_sent(1, false, 1200);
//! let outcome = controller.on_ack_received(&AckRanges::single(1, 1)?, Duration::ZERO)?;
//! let allowance = controller.bytes_allowed_to_send();
//! ```

mod adaptive;
mod fixed_rate;
mod fixed_window;
mod no_limit;


use std::fmt;
use std::time::Duration;

use crate::recovery::{AckOutcome, AckRanges, LossDetectionConfig, PacketNumber, RecoveryError};
use crate::simulation::{RealTime, TimeSource};

pub use adaptive::{AdaptiveConfig, AdaptiveController, AdaptiveStats, RecoveryPhase};
pub use fixed_rate::{FixedRateConfig, FixedRateController, DEFAULT_RATE_BYTES_PER_SEC};
pub use fixed_window::{FixedWindowConfig, FixedWindowController};
pub use no_limit::NoLimitController;

// =============================================================================
// Window Constants
// =============================================================================

/// Maximum segment size assumed for window arithmetic.
pub const DEFAULT_MSS: usize = 1460;

/// Congestion window before any feedback arrives.
pub const DEFAULT_INITIAL_WINDOW: usize = 10 * DEFAULT_MSS;

/// The window is never reduced below this.
pub const DEFAULT_MINIMUM_WINDOW: usize = 2 * DEFAULT_MSS;

/// Multiplicative decrease applied when a recovery epoch starts.
pub const DEFAULT_LOSS_REDUCTION_FACTOR: f64 = 0.5;

// =============================================================================
// Algorithm Identification
// =============================================================================

/// Identifies the congestion control algorithm in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CongestionControlAlgorithm {
    /// No congestion control at all; every send is allowed.
    NoLimit,

    /// Byte credit accruing at a constant rate, independent of feedback.
    FixedRate,

    /// Static window, reset on every acknowledgment.
    FixedWindow,

    /// Window-based AIMD with slow start and recovery epochs.
    #[default]
    Adaptive,
}

impl fmt::Display for CongestionControlAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongestionControlAlgorithm::NoLimit => write!(f, "NoLimit"),
            CongestionControlAlgorithm::FixedRate => write!(f, "FixedRate"),
            CongestionControlAlgorithm::FixedWindow => write!(f, "FixedWindow"),
            CongestionControlAlgorithm::Adaptive => write!(f, "Adaptive"),
        }
    }
}

impl CongestionControlAlgorithm {
    /// Parse a configuration name; unknown names select [`Self::Adaptive`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "noop" | "nolimit" | "none" => Self::NoLimit,
            "fixedrate" | "fixed-rate" => Self::FixedRate,
            "fixedwindow" | "fixed-window" => Self::FixedWindow,
            _ => Self::Adaptive,
        }
    }
}

// =============================================================================
// Algorithm-Agnostic Statistics
// =============================================================================

/// Algorithm-agnostic congestion control statistics.
///
/// For variant-specific statistics, pattern match on the
/// `CongestionController` enum to access the native controller.
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionControlStats {
    /// Algorithm identifier.
    pub algorithm: CongestionControlAlgorithm,
    /// Current congestion window size (bytes).
    pub cwnd: usize,
    /// Current bytes in flight (unacknowledged).
    pub flightsize: usize,
    /// Current slow start threshold (bytes); `usize::MAX` when unset.
    pub ssthresh: usize,
    /// Ack-delay compensated smoothed RTT.
    pub smoothed_rtt: Duration,
    pub rtt_variance: Duration,
    /// Raw smoothed RTT.
    pub smoothed_rtt_tcp: Duration,
    /// Total packets declared lost.
    pub total_losses: u64,
    /// Total probe alarms fired.
    pub total_probes: u64,
    /// Recovery epochs entered.
    pub recovery_epochs: u64,
    /// Whether a recovery epoch is active.
    pub in_recovery: bool,
}

impl CongestionControlStats {
    /// Calculate effective bandwidth based on cwnd and RTT.
    ///
    /// Returns bytes per second, 0 if RTT is zero. Capped at `usize::MAX`.
    pub fn effective_bandwidth(&self, rtt: Duration) -> usize {
        if rtt.is_zero() {
            return 0;
        }
        let bandwidth = self.cwnd as f64 / rtt.as_secs_f64();
        if !bandwidth.is_finite() || bandwidth > usize::MAX as f64 {
            usize::MAX
        } else if bandwidth < 0.0 {
            0
        } else {
            bandwidth as usize
        }
    }
}

// =============================================================================
// Congestion Control Trait
// =============================================================================

/// Operations every congestion controller supports.
///
/// Implemented by the concrete controllers and by the `CongestionController`
/// enum for dispatch. A controller belongs to one connection; callers
/// serialise access through `&mut self`.
pub trait CongestionControl: Send {
    // =========================================================================
    // Event Handlers
    // =========================================================================

    /// Called for every packet handed to the network.
    ///
    /// Ack-only packets are tracked but never count towards bytes in flight.
    /// Each packet number must be reported at most once.
    fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize);

    /// Called for every received ack frame.
    ///
    /// Updates the RTT estimate from the largest acknowledged packet if it is
    /// newly acknowledged, resolves every tracked packet in the ranges, runs
    /// loss detection and re-arms the probe alarm. The lost packet numbers of
    /// this event are returned in [`AckOutcome::lost`].
    fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError>;

    /// How many bytes may be sent right now.
    fn bytes_allowed_to_send(&self) -> usize;

    /// Poll the probe alarm. Returns `true` if it fired.
    fn check_loss_detection_alarm(&mut self) -> bool;

    // =========================================================================
    // State Queries
    // =========================================================================

    /// Returns the current congestion window in bytes.
    fn current_cwnd(&self) -> usize;

    /// Returns the bytes sent but not yet acknowledged or lost.
    fn flightsize(&self) -> usize;

    /// Returns the ack-delay compensated smoothed RTT.
    fn smoothed_rtt(&self) -> Duration;

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns algorithm-agnostic statistics.
    fn stats(&self) -> CongestionControlStats;

    /// Returns the algorithm identifier.
    fn algorithm(&self) -> CongestionControlAlgorithm;
}

// =============================================================================
// Congestion Controller Enum (Dispatch)
// =============================================================================

/// Congestion controller that dispatches to the configured algorithm.
///
/// ```ignore
/// let controller = config.build();
///
/// match &controller {
///     CongestionController::Adaptive(c) => println!("phase: {}", c.phase()),
///     CongestionController::FixedRate(c) => println!("rate: {}", c.rate()),
///     _ => {}
/// }
/// ```
pub enum CongestionController<T: TimeSource = RealTime> {
    /// No congestion control.
    NoLimit(NoLimitController),
    /// Fixed-rate congestion controller.
    FixedRate(FixedRateController<T>),
    /// Fixed-window congestion controller.
    FixedWindow(FixedWindowController<T>),
    /// Adaptive AIMD congestion controller.
    Adaptive(AdaptiveController<T>),
}

impl<T: TimeSource> fmt::Debug for CongestionController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLimit(_) => f.debug_struct("CongestionController::NoLimit").finish(),
            Self::FixedRate(c) => f
                .debug_struct("CongestionController::FixedRate")
                .field("rate", &c.rate())
                .field("flightsize", &c.flightsize())
                .finish_non_exhaustive(),
            Self::FixedWindow(c) => f
                .debug_struct("CongestionController::FixedWindow")
                .field("cwnd", &c.current_cwnd())
                .field("flightsize", &c.flightsize())
                .finish_non_exhaustive(),
            Self::Adaptive(c) => f
                .debug_struct("CongestionController::Adaptive")
                .field("cwnd", &c.current_cwnd())
                .field("flightsize", &c.flightsize())
                .field("phase", &c.phase())
                .finish_non_exhaustive(),
        }
    }
}

impl<T: TimeSource> CongestionControl for CongestionController<T> {
    fn on_packet_sent(&mut self, packet_number: PacketNumber, is_ack_only: bool, sent_bytes: usize) {
        match self {
            Self::NoLimit(c) => c.on_packet_sent(packet_number, is_ack_only, sent_bytes),
            Self::FixedRate(c) => c.on_packet_sent(packet_number, is_ack_only, sent_bytes),
            Self::FixedWindow(c) => c.on_packet_sent(packet_number, is_ack_only, sent_bytes),
            Self::Adaptive(c) => c.on_packet_sent(packet_number, is_ack_only, sent_bytes),
        }
    }

    fn on_ack_received(
        &mut self,
        acks: &AckRanges,
        ack_delay: Duration,
    ) -> Result<AckOutcome, RecoveryError> {
        match self {
            Self::NoLimit(c) => c.on_ack_received(acks, ack_delay),
            Self::FixedRate(c) => c.on_ack_received(acks, ack_delay),
            Self::FixedWindow(c) => c.on_ack_received(acks, ack_delay),
            Self::Adaptive(c) => c.on_ack_received(acks, ack_delay),
        }
    }

    fn bytes_allowed_to_send(&self) -> usize {
        match self {
            Self::NoLimit(c) => c.bytes_allowed_to_send(),
            Self::FixedRate(c) => c.bytes_allowed_to_send(),
            Self::FixedWindow(c) => c.bytes_allowed_to_send(),
            Self::Adaptive(c) => c.bytes_allowed_to_send(),
        }
    }

    fn check_loss_detection_alarm(&mut self) -> bool {
        match self {
            Self::NoLimit(c) => c.check_loss_detection_alarm(),
            Self::FixedRate(c) => c.check_loss_detection_alarm(),
            Self::FixedWindow(c) => c.check_loss_detection_alarm(),
            Self::Adaptive(c) => c.check_loss_detection_alarm(),
        }
    }

    fn current_cwnd(&self) -> usize {
        match self {
            Self::NoLimit(c) => c.current_cwnd(),
            Self::FixedRate(c) => c.current_cwnd(),
            Self::FixedWindow(c) => c.current_cwnd(),
            Self::Adaptive(c) => c.current_cwnd(),
        }
    }

    fn flightsize(&self) -> usize {
        match self {
            Self::NoLimit(c) => c.flightsize(),
            Self::FixedRate(c) => c.flightsize(),
            Self::FixedWindow(c) => c.flightsize(),
            Self::Adaptive(c) => c.flightsize(),
        }
    }

    fn smoothed_rtt(&self) -> Duration {
        match self {
            Self::NoLimit(c) => c.smoothed_rtt(),
            Self::FixedRate(c) => c.smoothed_rtt(),
            Self::FixedWindow(c) => c.smoothed_rtt(),
            Self::Adaptive(c) => c.smoothed_rtt(),
        }
    }

    fn stats(&self) -> CongestionControlStats {
        match self {
            Self::NoLimit(c) => c.stats(),
            Self::FixedRate(c) => c.stats(),
            Self::FixedWindow(c) => c.stats(),
            Self::Adaptive(c) => c.stats(),
        }
    }

    fn algorithm(&self) -> CongestionControlAlgorithm {
        match self {
            Self::NoLimit(_) => CongestionControlAlgorithm::NoLimit,
            Self::FixedRate(_) => CongestionControlAlgorithm::FixedRate,
            Self::FixedWindow(_) => CongestionControlAlgorithm::FixedWindow,
            Self::Adaptive(_) => CongestionControlAlgorithm::Adaptive,
        }
    }
}

impl<T: TimeSource> CongestionController<T> {
    /// Get adaptive-specific statistics if this is an adaptive controller.
    pub fn adaptive_stats(&self) -> Option<AdaptiveStats> {
        match self {
            Self::Adaptive(c) => Some(c.adaptive_stats()),
            Self::NoLimit(_) | Self::FixedRate(_) | Self::FixedWindow(_) => None,
        }
    }

    /// Get a reference to the inner adaptive controller if applicable.
    pub fn as_adaptive(&self) -> Option<&AdaptiveController<T>> {
        match self {
            Self::Adaptive(c) => Some(c),
            Self::NoLimit(_) | Self::FixedRate(_) | Self::FixedWindow(_) => None,
        }
    }

    /// Get a reference to the inner FixedRate controller if applicable.
    pub fn as_fixed_rate(&self) -> Option<&FixedRateController<T>> {
        match self {
            Self::FixedRate(c) => Some(c),
            Self::NoLimit(_) | Self::FixedWindow(_) | Self::Adaptive(_) => None,
        }
    }

    /// Get a reference to the inner FixedWindow controller if applicable.
    pub fn as_fixed_window(&self) -> Option<&FixedWindowController<T>> {
        match self {
            Self::FixedWindow(c) => Some(c),
            Self::NoLimit(_) | Self::FixedRate(_) | Self::Adaptive(_) => None,
        }
    }

    /// Returns the configured fixed rate in bytes/sec, or 0 for the other
    /// algorithms.
    pub fn configured_rate(&self) -> usize {
        match self {
            Self::FixedRate(c) => c.rate(),
            Self::NoLimit(_) | Self::FixedWindow(_) | Self::Adaptive(_) => 0,
        }
    }

    /// Probe alarm deadline in time-source nanoseconds, if armed.
    pub fn loss_detection_alarm(&self) -> Option<u64> {
        match self {
            Self::NoLimit(_) | Self::FixedRate(_) => None,
            Self::FixedWindow(c) => c.recovery().alarm_deadline(),
            Self::Adaptive(c) => c.recovery().alarm_deadline(),
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for creating congestion controllers.
///
/// Specifies which algorithm to use and its parameters.
///
/// ## Example
///
/// ```ignore
/// // Default configuration (adaptive)
/// let controller = CongestionControlConfig::default().build();
///
/// // Fixed window of 20 segments
/// let controller = CongestionControlConfig::new(CongestionControlAlgorithm::FixedWindow)
///     .with_initial_cwnd(20 * DEFAULT_MSS)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CongestionControlConfig {
    /// Which algorithm to use.
    pub algorithm: CongestionControlAlgorithm,
    /// Segment size used for window growth and allowance rounding.
    pub mss: usize,
    /// Initial congestion window (bytes); the static window for FixedWindow.
    pub initial_cwnd: usize,
    /// Minimum congestion window (bytes).
    pub min_cwnd: usize,
    /// Loss detection and probe alarm tuning.
    pub loss_detection: LossDetectionConfig,
    /// Algorithm-specific configuration.
    pub algorithm_config: AlgorithmConfig,
}

/// Algorithm-specific configuration options.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AlgorithmConfig {
    /// No-limit has no options.
    NoLimit,
    /// Fixed-rate specific configuration.
    FixedRate {
        /// Credit accrual in bytes per second.
        rate_bytes_per_sec: usize,
        /// Credit available at start.
        initial_credit: usize,
    },
    /// Fixed-window has no options beyond the window itself.
    FixedWindow,
    /// Adaptive specific configuration.
    Adaptive {
        /// Multiplicative decrease on entering recovery.
        loss_reduction_factor: f64,
    },
}

impl Default for CongestionControlConfig {
    fn default() -> Self {
        Self::from_adaptive_config(AdaptiveConfig::default())
    }
}

impl CongestionControlConfig {
    /// Create a new configuration for the specified algorithm with defaults.
    pub fn new(algorithm: CongestionControlAlgorithm) -> Self {
        match algorithm {
            CongestionControlAlgorithm::NoLimit => Self::no_limit(),
            CongestionControlAlgorithm::FixedRate => {
                Self::from_fixed_rate_config(FixedRateConfig::default())
            }
            CongestionControlAlgorithm::FixedWindow => {
                Self::from_fixed_window_config(FixedWindowConfig::default())
            }
            CongestionControlAlgorithm::Adaptive => Self::default(),
        }
    }

    /// Create a configuration that imposes no limit.
    pub fn no_limit() -> Self {
        Self {
            algorithm: CongestionControlAlgorithm::NoLimit,
            mss: DEFAULT_MSS,
            initial_cwnd: DEFAULT_INITIAL_WINDOW,
            min_cwnd: DEFAULT_MINIMUM_WINDOW,
            loss_detection: LossDetectionConfig::default(),
            algorithm_config: AlgorithmConfig::NoLimit,
        }
    }

    /// Create a configuration for fixed-rate with the specified rate in bytes/sec.
    pub fn fixed_rate(rate_bytes_per_sec: usize) -> Self {
        Self::from_fixed_rate_config(FixedRateConfig::new(rate_bytes_per_sec))
    }

    /// Create a configuration for fixed-rate with the specified rate in Mbps.
    pub fn fixed_rate_mbps(mbps: usize) -> Self {
        Self::from_fixed_rate_config(FixedRateConfig::from_mbps(mbps))
    }

    /// Create a configuration from an existing FixedRateConfig.
    pub fn from_fixed_rate_config(config: FixedRateConfig) -> Self {
        Self {
            algorithm: CongestionControlAlgorithm::FixedRate,
            mss: config.mss,
            initial_cwnd: DEFAULT_INITIAL_WINDOW,
            min_cwnd: DEFAULT_MINIMUM_WINDOW,
            loss_detection: config.loss_detection,
            algorithm_config: AlgorithmConfig::FixedRate {
                rate_bytes_per_sec: config.rate_bytes_per_sec,
                initial_credit: config.initial_credit,
            },
        }
    }

    /// Create a configuration for a fixed window of `window` bytes.
    pub fn fixed_window(window: usize) -> Self {
        Self::from_fixed_window_config(FixedWindowConfig::new(window))
    }

    /// Create a configuration from an existing FixedWindowConfig.
    pub fn from_fixed_window_config(config: FixedWindowConfig) -> Self {
        Self {
            algorithm: CongestionControlAlgorithm::FixedWindow,
            mss: config.mss,
            initial_cwnd: config.window,
            min_cwnd: DEFAULT_MINIMUM_WINDOW,
            loss_detection: config.loss_detection,
            algorithm_config: AlgorithmConfig::FixedWindow,
        }
    }

    /// Create a configuration from an existing AdaptiveConfig.
    pub fn from_adaptive_config(config: AdaptiveConfig) -> Self {
        Self {
            algorithm: CongestionControlAlgorithm::Adaptive,
            mss: config.mss,
            initial_cwnd: config.initial_cwnd,
            min_cwnd: config.min_cwnd,
            loss_detection: config.loss_detection,
            algorithm_config: AlgorithmConfig::Adaptive {
                loss_reduction_factor: config.loss_reduction_factor,
            },
        }
    }

    /// Set the segment size.
    pub fn with_mss(mut self, mss: usize) -> Self {
        self.mss = mss;
        self
    }

    /// Set the initial congestion window.
    pub fn with_initial_cwnd(mut self, cwnd: usize) -> Self {
        self.initial_cwnd = cwnd;
        self
    }

    /// Set the minimum congestion window.
    pub fn with_min_cwnd(mut self, cwnd: usize) -> Self {
        self.min_cwnd = cwnd;
        self
    }

    /// Set the reordering threshold used for loss detection.
    pub fn with_reordering_threshold(mut self, threshold: u64) -> Self {
        self.loss_detection.reordering_threshold = threshold;
        self
    }

    /// Set the lower bound of the probe timeout.
    pub fn with_min_tlp_timeout(mut self, timeout: Duration) -> Self {
        self.loss_detection.min_tlp_timeout = timeout;
        self
    }

    /// Build a congestion controller from this configuration.
    pub fn build(&self) -> CongestionController<RealTime> {
        self.build_with_time_source(RealTime::new())
    }

    /// Build a congestion controller with a custom time source.
    ///
    /// This is useful for deterministic testing with virtual time.
    pub fn build_with_time_source<T: TimeSource>(&self, time_source: T) -> CongestionController<T> {
        tracing::debug!(
            target: crate::logging::CONGESTION_TARGET,
            algorithm = %self.algorithm,
            mss = self.mss,
            initial_cwnd = self.initial_cwnd,
            "Building congestion controller"
        );
        match self.algorithm {
            CongestionControlAlgorithm::NoLimit => CongestionController::NoLimit(NoLimitController),
            CongestionControlAlgorithm::FixedRate => {
                let config = self
                    .as_fixed_rate_config()
                    .unwrap_or_else(|| FixedRateConfig {
                        mss: self.mss,
                        loss_detection: self.loss_detection.clone(),
                        ..Default::default()
                    });
                CongestionController::FixedRate(FixedRateController::new_with_time_source(
                    config,
                    time_source,
                ))
            }
            CongestionControlAlgorithm::FixedWindow => {
                let config = FixedWindowConfig {
                    window: self.initial_cwnd,
                    mss: self.mss,
                    loss_detection: self.loss_detection.clone(),
                };
                CongestionController::FixedWindow(FixedWindowController::new_with_time_source(
                    config,
                    time_source,
                ))
            }
            CongestionControlAlgorithm::Adaptive => {
                let config = self.as_adaptive_config().unwrap_or_else(|| AdaptiveConfig {
                    mss: self.mss,
                    initial_cwnd: self.initial_cwnd,
                    min_cwnd: self.min_cwnd,
                    loss_detection: self.loss_detection.clone(),
                    ..Default::default()
                });
                CongestionController::Adaptive(AdaptiveController::new_with_time_source(
                    config,
                    time_source,
                ))
            }
        }
    }

    /// Convert to the native FixedRateConfig if this is a FixedRate configuration.
    pub fn as_fixed_rate_config(&self) -> Option<FixedRateConfig> {
        match &self.algorithm_config {
            AlgorithmConfig::FixedRate {
                rate_bytes_per_sec,
                initial_credit,
            } => Some(FixedRateConfig {
                rate_bytes_per_sec: *rate_bytes_per_sec,
                initial_credit: *initial_credit,
                mss: self.mss,
                loss_detection: self.loss_detection.clone(),
            }),
            AlgorithmConfig::NoLimit | AlgorithmConfig::FixedWindow | AlgorithmConfig::Adaptive { .. } => {
                None
            }
        }
    }

    /// Convert to the native FixedWindowConfig if this is a FixedWindow configuration.
    pub fn as_fixed_window_config(&self) -> Option<FixedWindowConfig> {
        match &self.algorithm_config {
            AlgorithmConfig::FixedWindow => Some(FixedWindowConfig {
                window: self.initial_cwnd,
                mss: self.mss,
                loss_detection: self.loss_detection.clone(),
            }),
            AlgorithmConfig::NoLimit | AlgorithmConfig::FixedRate { .. } | AlgorithmConfig::Adaptive { .. } => {
                None
            }
        }
    }

    /// Convert to the native AdaptiveConfig if this is an Adaptive configuration.
    pub fn as_adaptive_config(&self) -> Option<AdaptiveConfig> {
        match &self.algorithm_config {
            AlgorithmConfig::Adaptive {
                loss_reduction_factor,
            } => Some(AdaptiveConfig {
                mss: self.mss,
                initial_cwnd: self.initial_cwnd,
                min_cwnd: self.min_cwnd,
                loss_reduction_factor: *loss_reduction_factor,
                loss_detection: self.loss_detection.clone(),
            }),
            AlgorithmConfig::NoLimit | AlgorithmConfig::FixedRate { .. } | AlgorithmConfig::FixedWindow => {
                None
            }
        }
    }
}
