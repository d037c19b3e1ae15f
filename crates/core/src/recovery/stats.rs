//! Numeric time-series records for offline analysis.
//!
//! Each record renders as one line, `<NAME> time:<unix-seconds> <field>:<value> ...`,
//! emitted on the [`STATISTICS_TARGET`] tracing target. Durations are printed in
//! milliseconds.

use std::fmt;
use std::time::Duration;

use chrono::Utc;

use super::ack::PacketNumber;
use crate::logging::STATISTICS_TARGET;

#[derive(Debug, Clone, PartialEq)]
pub enum Statistic {
    /// Ack-delay compensated smoothed RTT.
    Rtt { smoothed: Duration, variance: Duration },
    /// Uncompensated smoothed RTT.
    RttTcp { smoothed: Duration, variance: Duration },
    /// Time between sending a packet and its first acknowledgment.
    AckDelay {
        packet_number: PacketNumber,
        rtt: Duration,
    },
    BytesInFlight { bytes: usize },
    CongestionWindow { bytes: usize },
    LostPacket { packet_number: PacketNumber },
    LossDetectionAlarm,
    BytesAllowedToSend { bytes: usize },
}

impl Statistic {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rtt { .. } => "RTT",
            Self::RttTcp { .. } => "RTT_TCP",
            Self::AckDelay { .. } => "ACK_DELAY",
            Self::BytesInFlight { .. } => "BYTES_IN_FLIGHT",
            Self::CongestionWindow { .. } => "CONGESTION_WINDOW",
            Self::LostPacket { .. } => "LOST_PACKET",
            Self::LossDetectionAlarm => "LOSS_DETECTION_ALARM",
            Self::BytesAllowedToSend { .. } => "BYTES_ALLOWED_TO_SEND",
        }
    }

    /// Render the record stamped with `unix_seconds`.
    pub fn render(&self, unix_seconds: f64) -> String {
        format!("{} time:{unix_seconds:.6}{}", self.name(), Fields(self))
    }

    /// Emit the record stamped with the current wall-clock time.
    pub fn emit(&self) {
        if tracing::enabled!(target: STATISTICS_TARGET, tracing::Level::DEBUG) {
            tracing::debug!(target: STATISTICS_TARGET, "{}", self.render(unix_now()));
        }
    }
}

fn unix_now() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}

struct Fields<'a>(&'a Statistic);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Statistic::Rtt { smoothed, variance } | Statistic::RttTcp { smoothed, variance } => {
                write!(
                    f,
                    " variance:{:.3} rtt:{:.3}",
                    millis(*variance),
                    millis(*smoothed)
                )
            }
            Statistic::AckDelay { packet_number, rtt } => {
                write!(f, " pn:{packet_number} rtt:{:.3}", millis(*rtt))
            }
            Statistic::BytesInFlight { bytes }
            | Statistic::CongestionWindow { bytes }
            | Statistic::BytesAllowedToSend { bytes } => write!(f, " bytes:{bytes}"),
            Statistic::LostPacket { packet_number } => write!(f, " pn:{packet_number}"),
            Statistic::LossDetectionAlarm => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rtt() {
        let stat = Statistic::Rtt {
            smoothed: Duration::from_micros(20_500),
            variance: Duration::from_millis(5),
        };
        assert_eq!(
            stat.render(1_700_000_000.25),
            "RTT time:1700000000.250000 variance:5.000 rtt:20.500"
        );
    }

    #[test]
    fn test_render_packet_records() {
        let ack = Statistic::AckDelay {
            packet_number: 7,
            rtt: Duration::from_millis(12),
        };
        assert_eq!(ack.render(1.0), "ACK_DELAY time:1.000000 pn:7 rtt:12.000");

        let lost = Statistic::LostPacket { packet_number: 3 };
        assert_eq!(lost.render(2.5), "LOST_PACKET time:2.500000 pn:3");
    }

    #[test]
    fn test_render_byte_counters() {
        assert_eq!(
            Statistic::CongestionWindow { bytes: 14_600 }.render(0.0),
            "CONGESTION_WINDOW time:0.000000 bytes:14600"
        );
        assert_eq!(
            Statistic::BytesInFlight { bytes: 0 }.render(0.0),
            "BYTES_IN_FLIGHT time:0.000000 bytes:0"
        );
    }

    #[test]
    fn test_render_alarm_has_no_fields() {
        assert_eq!(
            Statistic::LossDetectionAlarm.render(3.0),
            "LOSS_DETECTION_ALARM time:3.000000"
        );
    }

    #[test]
    fn test_unix_now_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(unix_now() > 1_577_836_800.0);
    }
}
