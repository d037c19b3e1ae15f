//! Acknowledgment ranges as decoded from ACK frames.

use std::fmt;

use thiserror::Error;

/// QUIC packet number.
pub type PacketNumber = u64;

/// A contiguous span of acknowledged packet numbers.
///
/// Covers `last_packet - count + 1 ..= last_packet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AckRange {
    pub last_packet: PacketNumber,
    pub count: u64,
}

impl AckRange {
    pub fn new(last_packet: PacketNumber, count: u64) -> Self {
        Self { last_packet, count }
    }

    /// Lowest packet number covered by this range.
    ///
    /// Only meaningful for ranges accepted by [`AckRanges::new`].
    pub fn first_packet(&self) -> PacketNumber {
        self.last_packet
            .saturating_sub(self.count.saturating_sub(1))
    }

    /// Packet numbers in this range, highest first.
    pub fn packet_numbers(&self) -> impl Iterator<Item = PacketNumber> {
        (self.first_packet()..=self.last_packet).rev()
    }

    pub fn contains(&self, packet_number: PacketNumber) -> bool {
        packet_number <= self.last_packet && packet_number >= self.first_packet()
    }
}

impl fmt::Display for AckRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.first_packet(), self.last_packet)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AckRangeError {
    #[error("ack frame carries no ranges")]
    Empty,

    #[error("ack range ending at {last_packet} has zero count")]
    ZeroCount { last_packet: PacketNumber },

    #[error("ack range ending at {last_packet} with count {count} reaches below packet number 0")]
    Underflow { last_packet: PacketNumber, count: u64 },

    #[error("ack range {current} is not strictly below previous range {previous}")]
    NotDescending { previous: AckRange, current: AckRange },
}

/// The ranges of one ACK frame, validated and non-empty.
///
/// Ranges are strictly descending and never overlap; the first range holds
/// the largest acknowledged packet number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckRanges {
    ranges: Vec<AckRange>,
}

impl AckRanges {
    pub fn new(ranges: Vec<AckRange>) -> Result<Self, AckRangeError> {
        if ranges.is_empty() {
            return Err(AckRangeError::Empty);
        }
        for range in &ranges {
            if range.count == 0 {
                return Err(AckRangeError::ZeroCount {
                    last_packet: range.last_packet,
                });
            }
            if range.count > range.last_packet.saturating_add(1) {
                return Err(AckRangeError::Underflow {
                    last_packet: range.last_packet,
                    count: range.count,
                });
            }
        }
        for pair in ranges.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if current.last_packet >= previous.first_packet() {
                return Err(AckRangeError::NotDescending { previous, current });
            }
        }
        Ok(Self { ranges })
    }

    /// A single range acknowledging `count` packets ending at `last_packet`.
    pub fn single(last_packet: PacketNumber, count: u64) -> Result<Self, AckRangeError> {
        Self::new(vec![AckRange::new(last_packet, count)])
    }

    /// Largest packet number acknowledged by this frame.
    pub fn largest(&self) -> PacketNumber {
        self.ranges[0].last_packet
    }

    pub fn ranges(&self) -> &[AckRange] {
        &self.ranges
    }

    /// Every acknowledged packet number, in descending order.
    pub fn packet_numbers(&self) -> impl Iterator<Item = PacketNumber> + '_ {
        self.ranges.iter().flat_map(AckRange::packet_numbers)
    }

    pub fn contains(&self, packet_number: PacketNumber) -> bool {
        self.ranges.iter().any(|r| r.contains(packet_number))
    }
}

impl TryFrom<Vec<AckRange>> for AckRanges {
    type Error = AckRangeError;

    fn try_from(ranges: Vec<AckRange>) -> Result<Self, Self::Error> {
        Self::new(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_range_covers_count_packets() {
        let acks = AckRanges::single(5, 5).unwrap();
        assert_eq!(acks.largest(), 5);
        assert_eq!(acks.packet_numbers().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_multiple_ranges_descending() {
        let acks = AckRanges::new(vec![AckRange::new(10, 2), AckRange::new(6, 3)]).unwrap();
        assert_eq!(
            acks.packet_numbers().collect::<Vec<_>>(),
            vec![10, 9, 6, 5, 4]
        );
        assert!(acks.contains(9));
        assert!(!acks.contains(7));
        assert!(!acks.contains(8));
    }

    #[test]
    fn test_range_including_packet_zero() {
        let acks = AckRanges::single(2, 3).unwrap();
        assert_eq!(acks.packet_numbers().collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn test_range_ending_at_largest_packet_number() {
        let acks = AckRanges::new(vec![AckRange::new(u64::MAX, 1), AckRange::new(5, 1)]).unwrap();
        assert_eq!(acks.largest(), u64::MAX);
        assert_eq!(acks.ranges()[0].first_packet(), u64::MAX);

        let acks = AckRanges::single(u64::MAX, 3).unwrap();
        assert_eq!(
            acks.packet_numbers().collect::<Vec<_>>(),
            vec![u64::MAX, u64::MAX - 1, u64::MAX - 2]
        );
        assert!(acks.contains(u64::MAX - 2));
        assert!(!acks.contains(u64::MAX - 3));
        assert_eq!(
            AckRange::new(u64::MAX, 2).to_string(),
            format!("{}..={}", u64::MAX - 1, u64::MAX)
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(AckRanges::new(vec![]), Err(AckRangeError::Empty));
    }

    #[test]
    fn test_rejects_zero_count() {
        assert_eq!(
            AckRanges::single(4, 0),
            Err(AckRangeError::ZeroCount { last_packet: 4 })
        );
    }

    #[test]
    fn test_rejects_underflow() {
        assert_eq!(
            AckRanges::single(2, 4),
            Err(AckRangeError::Underflow {
                last_packet: 2,
                count: 4
            })
        );
    }

    #[test]
    fn test_rejects_overlap_and_ascending() {
        let overlapping = AckRanges::new(vec![AckRange::new(10, 3), AckRange::new(8, 2)]);
        assert!(matches!(
            overlapping,
            Err(AckRangeError::NotDescending { .. })
        ));

        let ascending = AckRanges::new(vec![AckRange::new(3, 1), AckRange::new(7, 1)]);
        assert!(matches!(ascending, Err(AckRangeError::NotDescending { .. })));
    }

    #[test]
    fn test_adjacent_ranges_accepted() {
        // 10..=9 then 8..=8: touching but not overlapping
        let acks = AckRanges::new(vec![AckRange::new(10, 2), AckRange::new(8, 1)]);
        assert!(acks.is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(AckRange::new(9, 4).to_string(), "6..=9");
    }
}
