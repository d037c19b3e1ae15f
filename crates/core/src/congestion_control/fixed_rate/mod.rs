//! Fixed-rate congestion controller.
//!
//! A non-adaptive controller whose send allowance is a byte credit that grows
//! linearly with time, regardless of network feedback:
//!
//! ```text
//! allowance = rate * seconds_since_start + initial_credit - bytes_transmitted
//! ```
//!
//! A positive allowance is rounded down to a whole number of segments so the
//! connection never sends a partial packet's worth of credit early.
//!
//! Losses are still detected with the reordering threshold and reported to
//! the connection, but they never change the rate. There is no probe alarm.
//!
//! ## Usage
//!
//! ```ignore
//! let config = CongestionControlConfig::fixed_rate_mbps(10);
//! let controller = config.build();
//! ```

mod controller;

pub use controller::{FixedRateConfig, FixedRateController, DEFAULT_RATE_BYTES_PER_SEC};
