//! The one-byte measurement field carried in every packet header.
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +-------+---+---+-------+---+---+
//! | spin  | V | B | status| L | E |
//! +-------+---+---+-------+---+---+
//! ```
//!
//! `V` is the legacy valid flag, `B` blocking, `L` loss and `E` valid-edge.

use std::fmt;

const SPIN_SHIFT: u8 = 6;
const SPIN_MASK: u8 = 0b1100_0000;
const VALID_SHIFT: u8 = 5;
const BLOCKING_SHIFT: u8 = 4;
const STATUS_SHIFT: u8 = 2;
const STATUS_MASK: u8 = 0b0000_1100;
const LOSS_SHIFT: u8 = 1;
const VALID_EDGE_SHIFT: u8 = 0;

/// Number of distinct spin values.
pub const SPIN_MODULUS: u8 = 4;

/// Two-bit latency status signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum LatencyStatus {
    #[default]
    Invalid = 0,
    Handshake0 = 1,
    Handshake1 = 2,
    Valid = 3,
}

impl LatencyStatus {
    /// Decode the low two bits of `bits`.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Invalid,
            1 => Self::Handshake0,
            2 => Self::Handshake1,
            _ => Self::Valid,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// The status one step further along, saturating at [`Self::Valid`].
    pub fn advanced(self) -> Self {
        Self::from_bits(self.bits().saturating_add(1).min(Self::Valid.bits()))
    }
}

/// Decoded measurement header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasurementHeaderData {
    /// Two-bit spin value; only the low two bits are encoded.
    pub spin: u8,
    pub valid: bool,
    pub blocking: bool,
    pub status: LatencyStatus,
    pub loss: bool,
    pub valid_edge: bool,
}

impl Default for MeasurementHeaderData {
    /// Header state of a fresh connection.
    fn default() -> Self {
        Self {
            spin: 0,
            valid: true,
            blocking: false,
            status: LatencyStatus::Invalid,
            loss: false,
            valid_edge: true,
        }
    }
}

impl MeasurementHeaderData {
    pub fn encode(&self) -> MeasurementField {
        let mut bits = ((self.spin % SPIN_MODULUS) << SPIN_SHIFT) & SPIN_MASK;
        bits |= u8::from(self.valid) << VALID_SHIFT;
        bits |= u8::from(self.blocking) << BLOCKING_SHIFT;
        bits |= (self.status.bits() << STATUS_SHIFT) & STATUS_MASK;
        bits |= u8::from(self.loss) << LOSS_SHIFT;
        bits |= u8::from(self.valid_edge) << VALID_EDGE_SHIFT;
        MeasurementField(bits)
    }
}

/// Raw measurement byte as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeasurementField(pub u8);

impl MeasurementField {
    pub fn decode(self) -> MeasurementHeaderData {
        let bit = |shift: u8| self.0 & (1 << shift) != 0;
        MeasurementHeaderData {
            spin: (self.0 & SPIN_MASK) >> SPIN_SHIFT,
            valid: bit(VALID_SHIFT),
            blocking: bit(BLOCKING_SHIFT),
            status: LatencyStatus::from_bits((self.0 & STATUS_MASK) >> STATUS_SHIFT),
            loss: bit(LOSS_SHIFT),
            valid_edge: bit(VALID_EDGE_SHIFT),
        }
    }

    pub fn spin(self) -> u8 {
        (self.0 & SPIN_MASK) >> SPIN_SHIFT
    }
}

impl From<u8> for MeasurementField {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

impl From<MeasurementField> for u8 {
    fn from(field: MeasurementField) -> Self {
        field.0
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_header_encoding() {
        // valid (bit 5) and valid-edge (bit 0)
        assert_eq!(MeasurementHeaderData::default().encode(), MeasurementField(0b0010_0001));
    }

    #[test]
    fn test_bit_positions() {
        let header = MeasurementHeaderData {
            spin: 2,
            valid: false,
            blocking: true,
            status: LatencyStatus::Handshake0,
            loss: true,
            valid_edge: false,
        };
        assert_eq!(header.encode().0, 0b1001_0110);
    }

    #[test]
    fn test_decode_all_set() {
        let header = MeasurementField(0xff).decode();
        assert_eq!(header.spin, 3);
        assert!(header.valid && header.blocking && header.loss && header.valid_edge);
        assert_eq!(header.status, LatencyStatus::Valid);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for bits in 0..=u8::MAX {
            assert_eq!(MeasurementField(bits).decode().encode(), MeasurementField(bits));
        }
    }

    #[test]
    fn test_spin_wraps_modulo_four() {
        let header = MeasurementHeaderData {
            spin: 5,
            ..Default::default()
        };
        assert_eq!(header.encode().spin(), 1);
    }

    #[test]
    fn test_status_advances_and_saturates() {
        assert_eq!(LatencyStatus::Invalid.advanced(), LatencyStatus::Handshake0);
        assert_eq!(LatencyStatus::Handshake1.advanced(), LatencyStatus::Valid);
        assert_eq!(LatencyStatus::Valid.advanced(), LatencyStatus::Valid);
    }

    #[test]
    fn test_display() {
        assert_eq!(MeasurementField(0b0010_0001).to_string(), "0b00100001");
    }
}
