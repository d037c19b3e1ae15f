//! Loss recovery configuration.
//!
//! [`RecoveryConfig`] is the serializable, file-facing form. It is turned
//! into the typed [`CongestionControlConfig`] with
//! [`RecoveryConfig::build_congestion_config`].
//!
//! ```toml
//! congestion-control = "fixedwindow"
//! initial-window = 29200
//! reordering-threshold = 3
//! min-tlp-timeout-ms = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::congestion_control::{
    AdaptiveConfig, CongestionControlAlgorithm, CongestionControlConfig, FixedRateConfig,
    FixedWindowConfig,
};
use crate::measurement::Role;
use crate::path::PathRecovery;
use crate::recovery::LossDetectionConfig;
use crate::simulation::{RealTime, TimeSource};

pub use crate::congestion_control::{
    DEFAULT_INITIAL_WINDOW, DEFAULT_LOSS_REDUCTION_FACTOR, DEFAULT_MINIMUM_WINDOW, DEFAULT_MSS,
    DEFAULT_RATE_BYTES_PER_SEC,
};
pub use crate::measurement::DEFAULT_MAX_RX_TX_DELAY;
pub use crate::recovery::{
    DEFAULT_MIN_TLP_TIMEOUT, DEFAULT_REORDERING_THRESHOLD, DEFAULT_TLP_RTT_MULTIPLIER,
};

/// Environment variable overriding the configured algorithm.
pub const CONGESTION_CONTROL_ENV: &str = "PINQ_CONGESTION_CONTROL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Congestion control and measurement settings of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RecoveryConfig {
    /// Congestion control algorithm.
    ///
    /// Available algorithms:
    /// - `noop`: no congestion control
    /// - `fixedrate`: constant byte credit rate
    /// - `fixedwindow`: static window
    /// - `adaptive` (default): slow start, AIMD and recovery epochs
    ///
    /// Unknown names select `adaptive`.
    pub congestion_control: String,

    pub mss: usize,

    /// Initial window; the static window of `fixedwindow`.
    pub initial_window: usize,

    pub minimum_window: usize,

    /// Window multiplier applied when a recovery epoch starts.
    pub loss_reduction_factor: f64,

    /// Packets acked above an unacked packet before it is declared lost.
    pub reordering_threshold: u64,

    pub min_tlp_timeout_ms: u64,

    /// Probe timeout as a multiple of the smoothed RTT.
    pub tlp_rtt_multiplier: f64,

    pub fixed_rate_bytes_per_sec: usize,

    /// Credit available at start; defaults to `initial-window`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_rate_initial_credit: Option<usize>,

    /// Longest delay for an outgoing spin edge to still count as valid.
    pub max_rx_tx_delay_us: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            congestion_control: default_congestion_control(),
            mss: DEFAULT_MSS,
            initial_window: DEFAULT_INITIAL_WINDOW,
            minimum_window: DEFAULT_MINIMUM_WINDOW,
            loss_reduction_factor: DEFAULT_LOSS_REDUCTION_FACTOR,
            reordering_threshold: DEFAULT_REORDERING_THRESHOLD,
            min_tlp_timeout_ms: DEFAULT_MIN_TLP_TIMEOUT.as_millis() as u64,
            tlp_rtt_multiplier: DEFAULT_TLP_RTT_MULTIPLIER,
            fixed_rate_bytes_per_sec: DEFAULT_RATE_BYTES_PER_SEC,
            fixed_rate_initial_credit: None,
            max_rx_tx_delay_us: DEFAULT_MAX_RX_TX_DELAY.as_micros() as u64,
        }
    }
}

fn default_congestion_control() -> String {
    "adaptive".to_string()
}

impl RecoveryConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file, apply the environment override and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::debug!(path = ?path, "Reading recovery configuration");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        let config = config.with_algorithm_override(std::env::var(CONGESTION_CONTROL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace the algorithm name if `algorithm` is set and not blank.
    pub fn with_algorithm_override(mut self, algorithm: Option<String>) -> Self {
        if let Some(algorithm) = algorithm.filter(|a| !a.trim().is_empty()) {
            tracing::debug!(
                configured = %self.congestion_control,
                %algorithm,
                "Congestion control overridden from environment"
            );
            self.congestion_control = algorithm;
        }
        self
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };

        if self.mss == 0 {
            return invalid("mss", "must be positive");
        }
        if self.minimum_window == 0 {
            return invalid("minimum-window", "must be positive");
        }
        if self.minimum_window > self.initial_window {
            return invalid("minimum-window", "must not exceed initial-window");
        }
        if !(self.loss_reduction_factor > 0.0 && self.loss_reduction_factor <= 1.0) {
            return invalid("loss-reduction-factor", "must be in (0, 1]");
        }
        if self.reordering_threshold == 0 {
            return invalid("reordering-threshold", "must be at least 1");
        }
        if !(self.tlp_rtt_multiplier.is_finite() && self.tlp_rtt_multiplier > 0.0) {
            return invalid("tlp-rtt-multiplier", "must be a positive number");
        }
        if self.algorithm() == CongestionControlAlgorithm::FixedRate
            && self.fixed_rate_bytes_per_sec == 0
        {
            return invalid("fixed-rate-bytes-per-sec", "must be positive");
        }
        Ok(())
    }

    pub fn algorithm(&self) -> CongestionControlAlgorithm {
        CongestionControlAlgorithm::from_name(&self.congestion_control)
    }

    pub fn loss_detection(&self) -> LossDetectionConfig {
        LossDetectionConfig {
            reordering_threshold: self.reordering_threshold,
            min_tlp_timeout: Duration::from_millis(self.min_tlp_timeout_ms),
            tlp_rtt_multiplier: self.tlp_rtt_multiplier,
        }
    }

    pub fn max_rx_tx_delay(&self) -> Duration {
        Duration::from_micros(self.max_rx_tx_delay_us)
    }

    /// Build a `CongestionControlConfig` for the configured algorithm.
    pub fn build_congestion_config(&self) -> CongestionControlConfig {
        let loss_detection = self.loss_detection();
        match self.algorithm() {
            CongestionControlAlgorithm::NoLimit => CongestionControlConfig::no_limit(),
            CongestionControlAlgorithm::FixedRate => {
                CongestionControlConfig::from_fixed_rate_config(FixedRateConfig {
                    rate_bytes_per_sec: self.fixed_rate_bytes_per_sec,
                    initial_credit: self.fixed_rate_initial_credit.unwrap_or(self.initial_window),
                    mss: self.mss,
                    loss_detection,
                })
            }
            CongestionControlAlgorithm::FixedWindow => {
                CongestionControlConfig::from_fixed_window_config(FixedWindowConfig {
                    window: self.initial_window,
                    mss: self.mss,
                    loss_detection,
                })
            }
            CongestionControlAlgorithm::Adaptive => {
                CongestionControlConfig::from_adaptive_config(AdaptiveConfig {
                    mss: self.mss,
                    initial_cwnd: self.initial_window,
                    min_cwnd: self.minimum_window,
                    loss_reduction_factor: self.loss_reduction_factor,
                    loss_detection,
                })
            }
        }
    }

    pub fn build_path(&self, role: Role) -> PathRecovery<RealTime> {
        self.build_path_with_time_source(role, RealTime::new())
    }

    pub fn build_path_with_time_source<T: TimeSource>(&self, role: Role, time_source: T) -> PathRecovery<T> {
        PathRecovery::new_with_time_source(&self.build_congestion_config(), role, time_source)
            .with_max_rx_tx_delay(self.max_rx_tx_delay())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::congestion_control::CongestionControl;
    use crate::simulation::VirtualTime;

    #[test]
    fn test_defaults_via_serde() {
        let config = RecoveryConfig::from_toml_str("").unwrap();
        assert_eq!(config, RecoveryConfig::default());
        assert_eq!(config.algorithm(), CongestionControlAlgorithm::Adaptive);
        assert_eq!(config.min_tlp_timeout_ms, 10);
        assert_eq!(config.max_rx_tx_delay(), Duration::from_millis(1));

        let cc_config = config.build_congestion_config();
        assert_eq!(cc_config, CongestionControlConfig::default());
    }

    #[test]
    fn test_fixed_window_config() {
        let config_str = r#"
            congestion-control = "fixedwindow"
            initial-window = 29200
        "#;
        let config = RecoveryConfig::from_toml_str(config_str).unwrap();
        let cc_config = config.build_congestion_config();
        assert_eq!(cc_config.algorithm, CongestionControlAlgorithm::FixedWindow);
        assert_eq!(cc_config.as_fixed_window_config().unwrap().window, 29_200);
    }

    #[test]
    fn test_fixed_rate_config() {
        let config_str = r#"
            congestion-control = "fixedrate"
            fixed-rate-bytes-per-sec = 1000000
            fixed-rate-initial-credit = 2920
            reordering-threshold = 5
        "#;
        let config = RecoveryConfig::from_toml_str(config_str).unwrap();
        let fixed_rate = config.build_congestion_config().as_fixed_rate_config().unwrap();
        assert_eq!(fixed_rate.rate_bytes_per_sec, 1_000_000);
        assert_eq!(fixed_rate.initial_credit, 2920);
        assert_eq!(fixed_rate.loss_detection.reordering_threshold, 5);
    }

    #[test]
    fn test_noop_and_unknown_names() {
        let noop = RecoveryConfig::from_toml_str(r#"congestion-control = "noop""#).unwrap();
        assert_eq!(noop.build_congestion_config().algorithm, CongestionControlAlgorithm::NoLimit);

        let unknown = RecoveryConfig::from_toml_str(r#"congestion-control = "reno""#).unwrap();
        assert_eq!(unknown.algorithm(), CongestionControlAlgorithm::Adaptive);
    }

    #[test]
    fn test_algorithm_override() {
        let config = RecoveryConfig::default().with_algorithm_override(Some("fixedrate".into()));
        assert_eq!(config.algorithm(), CongestionControlAlgorithm::FixedRate);

        let config = config.with_algorithm_override(Some("  ".into()));
        assert_eq!(config.algorithm(), CongestionControlAlgorithm::FixedRate);

        let config = config.with_algorithm_override(None);
        assert_eq!(config.congestion_control, "fixedrate");
    }

    #[test]
    fn test_validation_errors() {
        let err = RecoveryConfig::from_toml_str("mss = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "mss", .. }));

        let err = RecoveryConfig::from_toml_str("loss-reduction-factor = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "loss-reduction-factor",
                ..
            }
        ));

        let err = RecoveryConfig::from_toml_str("minimum-window = 100000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "minimum-window", .. }));

        let err = RecoveryConfig::from_toml_str("reordering-threshold = 0").unwrap_err();
        assert!(err.to_string().contains("reordering-threshold"));
    }

    #[test]
    fn test_parse_error() {
        let err = RecoveryConfig::from_toml_str("mss = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = RecoveryConfig {
            congestion_control: "fixedwindow".into(),
            initial_window: 20_000,
            fixed_rate_initial_credit: Some(5_000),
            ..Default::default()
        };
        let serialized = config.to_toml_string().unwrap();
        assert!(serialized.contains("congestion-control = \"fixedwindow\""));
        assert_eq!(RecoveryConfig::from_toml_str(&serialized).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("recovery.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "congestion-control = \"adaptive\"").unwrap();
        writeln!(file, "initial-window = 14600").unwrap();
        writeln!(file, "loss-reduction-factor = 0.7").unwrap();
        drop(file);

        let config = RecoveryConfig::load(&path).unwrap();
        assert_eq!(config.loss_reduction_factor, 0.7);
        assert_eq!(config.initial_window, 14_600);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = RecoveryConfig::load(temp_dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_build_path_applies_settings() {
        let config = RecoveryConfig {
            congestion_control: "fixedwindow".into(),
            initial_window: 10_000,
            max_rx_tx_delay_us: 5_000,
            ..Default::default()
        };
        let time = VirtualTime::new();
        let mut path = config.build_path_with_time_source(Role::Client, time.clone());
        assert_eq!(path.controller().current_cwnd(), 10_000);

        path.on_packet_received(1, crate::measurement::MeasurementField(0));
        path.on_packet_received(2, crate::measurement::MeasurementField(0b0100_0000));
        time.advance(Duration::from_millis(4));
        let out = path.next_measurement_field::<NoFrame>(&[], &[]).decode();
        assert!(out.valid_edge);
        assert_eq!(out.spin, 2);
    }

    struct NoFrame;

    impl crate::measurement::QueuedFrame for NoFrame {
        fn needs_transmit(&self) -> bool {
            false
        }
    }
}
