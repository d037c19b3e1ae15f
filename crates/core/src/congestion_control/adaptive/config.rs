//! Adaptive controller configuration.

use crate::congestion_control::{
    DEFAULT_INITIAL_WINDOW, DEFAULT_LOSS_REDUCTION_FACTOR, DEFAULT_MINIMUM_WINDOW, DEFAULT_MSS,
};
use crate::recovery::LossDetectionConfig;

/// Configuration for the adaptive controller.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveConfig {
    /// Segment size used for congestion avoidance growth and probes.
    pub mss: usize,
    /// Initial congestion window (bytes)
    pub initial_cwnd: usize,
    /// Minimum congestion window (bytes)
    pub min_cwnd: usize,
    /// Window multiplier applied when a recovery epoch starts.
    pub loss_reduction_factor: f64,
    pub loss_detection: LossDetectionConfig,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            mss: DEFAULT_MSS,
            initial_cwnd: DEFAULT_INITIAL_WINDOW,
            min_cwnd: DEFAULT_MINIMUM_WINDOW,
            loss_reduction_factor: DEFAULT_LOSS_REDUCTION_FACTOR,
            loss_detection: LossDetectionConfig::default(),
        }
    }
}
