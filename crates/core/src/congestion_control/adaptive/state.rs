//! Adaptive congestion window state machine.

use std::fmt;

/// Phase of the adaptive controller.
///
/// The phase is derived from the window variables rather than stored, so it
/// can never disagree with them:
///
/// - `Recovery` while `largest_acked < end_of_recovery`
/// - otherwise `SlowStart` while `cwnd < ssthresh`
/// - otherwise `CongestionAvoidance`
///
/// ## State Transitions
///
/// ```text
/// ┌─────────────┐   (loss newer than epoch)   ┌────────────┐
/// │  SlowStart  │────────────────────────────►│  Recovery  │◄──┐
/// └─────────────┘                             └─────┬──────┘   │
///                                                   │          │ (loss newer
///            (largest_acked reaches end_of_recovery;│          │  than epoch)
///             ssthresh == cwnd after the reduction) │          │
///                                                   ▼          │
///                                     ┌──────────────────────┐ │
///                                     │ CongestionAvoidance  │─┘
///                                     └──────────────────────┘
/// ```
///
/// A reduction sets `ssthresh = cwnd` and the window only grows afterwards,
/// so slow start is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryPhase {
    /// Exponential growth until the first loss.
    SlowStart,
    /// Additive increase, about one segment per RTT.
    CongestionAvoidance,
    /// Window reduced; waiting for packets sent before the loss to resolve.
    Recovery,
}

impl RecoveryPhase {
    pub(crate) fn derive(in_recovery: bool, cwnd: usize, ssthresh: usize) -> Self {
        if in_recovery {
            Self::Recovery
        } else if cwnd < ssthresh {
            Self::SlowStart
        } else {
            Self::CongestionAvoidance
        }
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self, Self::Recovery)
    }
}

impl fmt::Display for RecoveryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlowStart => write!(f, "slow-start"),
            Self::CongestionAvoidance => write!(f, "congestion-avoidance"),
            Self::Recovery => write!(f, "recovery"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive() {
        assert_eq!(RecoveryPhase::derive(false, 100, usize::MAX), RecoveryPhase::SlowStart);
        assert_eq!(
            RecoveryPhase::derive(false, 100, 100),
            RecoveryPhase::CongestionAvoidance
        );
        assert_eq!(RecoveryPhase::derive(true, 100, usize::MAX), RecoveryPhase::Recovery);
        assert!(RecoveryPhase::derive(true, 1, 1).is_recovery());
    }
}
