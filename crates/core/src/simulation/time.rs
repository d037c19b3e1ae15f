//! Time abstraction layer for deterministic testing.
//!
//! This module provides:
//! - `TimeSource` trait for abstracting clock reads
//! - `RealTime` implementation backed by a monotonic `Instant`
//! - `VirtualTime` implementation for deterministic tests

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Abstraction over a monotonic clock supporting both real and virtual time.
///
/// Every timestamp the recovery and measurement code stores is a value
/// returned by `now_nanos`, so a controller built with `VirtualTime` never
/// observes wall-clock time.
pub trait TimeSource: Send + Sync + Clone + 'static {
    /// Returns the current time as nanoseconds since an arbitrary epoch.
    fn now_nanos(&self) -> u64;

    /// Returns the current time as a Duration since an arbitrary epoch.
    fn now(&self) -> Duration {
        Duration::from_nanos(self.now_nanos())
    }

    /// Time elapsed since `earlier_nanos`, zero if the clock reads earlier.
    fn elapsed_since(&self, earlier_nanos: u64) -> Duration {
        Duration::from_nanos(self.now_nanos().saturating_sub(earlier_nanos))
    }
}

/// Real-time implementation backed by `Instant`.
#[derive(Clone)]
pub struct RealTime {
    epoch: Instant,
}

impl Default for RealTime {
    fn default() -> Self {
        Self::new()
    }
}

impl RealTime {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl TimeSource for RealTime {
    fn now_nanos(&self) -> u64 {
        // u64 nanoseconds covers ~584 years of uptime
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Virtual time implementation for deterministic tests.
///
/// Time only advances when explicitly stepped via `advance()` or `advance_to()`.
/// Clones share the same clock, so a test can hold one handle while the
/// controller under test holds another.
#[derive(Clone, Debug)]
pub struct VirtualTime {
    current_nanos: Arc<AtomicU64>,
}

impl Default for VirtualTime {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTime {
    /// Creates a new virtual time starting at 0.
    pub fn new() -> Self {
        Self::with_initial_time(0)
    }

    /// Creates a new virtual time starting at the given nanoseconds.
    pub fn with_initial_time(initial_nanos: u64) -> Self {
        Self {
            current_nanos: Arc::new(AtomicU64::new(initial_nanos)),
        }
    }

    /// Advances time by the given duration, saturating at `u64::MAX`.
    pub fn advance(&self, duration: Duration) {
        let step = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.current_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(step))
            })
            .ok();
    }

    /// Advances time to the given absolute nanoseconds.
    ///
    /// Time never moves backwards: targets in the past are ignored.
    pub fn advance_to(&self, target_nanos: u64) {
        self.current_nanos
            .fetch_max(target_nanos, Ordering::SeqCst);
    }
}

impl TimeSource for VirtualTime {
    fn now_nanos(&self) -> u64 {
        self.current_nanos.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_time_starts_at_zero() {
        let vt = VirtualTime::new();
        assert_eq!(vt.now_nanos(), 0);
    }

    #[test]
    fn test_virtual_time_advance() {
        let vt = VirtualTime::new();
        vt.advance(Duration::from_secs(10));
        assert_eq!(vt.now_nanos(), 10_000_000_000);
        assert_eq!(vt.now(), Duration::from_secs(10));
    }

    #[test]
    fn test_virtual_time_never_goes_backwards() {
        let vt = VirtualTime::with_initial_time(1_000);
        vt.advance_to(500);
        assert_eq!(vt.now_nanos(), 1_000);
        vt.advance_to(2_000);
        assert_eq!(vt.now_nanos(), 2_000);
    }

    #[test]
    fn test_virtual_time_clones_share_clock() {
        let vt = VirtualTime::new();
        let handle = vt.clone();
        handle.advance(Duration::from_millis(5));
        assert_eq!(vt.now(), Duration::from_millis(5));
    }

    #[test]
    fn test_virtual_time_advance_saturates() {
        let vt = VirtualTime::with_initial_time(u64::MAX - 1);
        vt.advance(Duration::from_secs(1));
        assert_eq!(vt.now_nanos(), u64::MAX);
    }

    #[test]
    fn test_elapsed_since_saturates() {
        let vt = VirtualTime::with_initial_time(100);
        assert_eq!(vt.elapsed_since(500), Duration::ZERO);
        assert_eq!(vt.elapsed_since(40), Duration::from_nanos(60));
    }

    #[test]
    fn test_real_time_basic() {
        let rt = RealTime::new();
        let t1 = rt.now_nanos();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = rt.now_nanos();
        assert!(t2 > t1);
    }
}
