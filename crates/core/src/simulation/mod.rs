//! Deterministic time support.
//!
//! Every controller and the spin-bit measurement state are generic over a
//! [`TimeSource`]. Production code uses [`RealTime`]; tests drive
//! [`VirtualTime`] by hand so alarm expiry, RTT samples, fixed-rate credit and
//! edge validity windows are reproducible to the nanosecond.

mod time;

pub use time::{RealTime, TimeSource, VirtualTime};
