//! Wire encoding for the terminal's writable characteristics.
//!
//! # Wire Formats
//!
//! ```text
//! Access PIN:          '4' '3' '2' '1'          -> [0x34, 0x33, 0x32, 0x31]
//!                      one ASCII byte per digit, no terminator, 4-10 bytes
//!
//! Door-open duration:  1234 seconds (0x04D2)    -> [0xD2, 0x04]
//!                      u16, little-endian, exactly 2 bytes
//! ```
//!
//! Encoders are only defined for validated values ([`PinValue`],
//! [`DurationValue`]); range checks belong to the validator and no clamping
//! happens here.

use impterm_core::{DurationValue, PinValue, constants::DURATION_PAYLOAD_LEN};

/// Encode an access PIN as raw ASCII digits.
///
/// The result has exactly `pin.len()` bytes, in input order.
///
/// ```
/// use impterm_core::PinValue;
/// use impterm_protocol::codec::encode_pin;
///
/// let pin = PinValue::new("4321").unwrap();
/// assert_eq!(encode_pin(&pin), b"4321".to_vec());
/// ```
pub fn encode_pin(pin: &PinValue) -> Vec<u8> {
    pin.as_str().as_bytes().to_vec()
}

/// Encode a door-open duration as a little-endian `u16`.
///
/// ```
/// use impterm_core::DurationValue;
/// use impterm_protocol::codec::encode_duration;
///
/// let duration = DurationValue::new(256).unwrap();
/// assert_eq!(encode_duration(duration), [0, 1]);
/// ```
pub fn encode_duration(seconds: DurationValue) -> [u8; DURATION_PAYLOAD_LEN] {
    seconds.as_secs().to_le_bytes()
}

/// Decode a door-open duration payload.
///
/// Returns `None` unless the payload is exactly two bytes.
pub fn decode_duration(payload: &[u8]) -> Option<u16> {
    let bytes: [u8; DURATION_PAYLOAD_LEN] = payload.try_into().ok()?;
    Some(u16::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, [1, 0])]
    #[case(10, [10, 0])]
    #[case(256, [0, 1])]
    #[case(1234, [210, 4])]
    #[case(65535, [255, 255])]
    fn test_encode_duration(#[case] seconds: u16, #[case] expected: [u8; 2]) {
        let duration = DurationValue::new(seconds).unwrap();
        assert_eq!(encode_duration(duration), expected);
    }

    #[test]
    fn test_encode_pin_ascii_codes() {
        let pin = PinValue::new("4321").unwrap();
        assert_eq!(encode_pin(&pin), vec![52, 51, 50, 49]);
    }

    #[test]
    fn test_encode_pin_max_length() {
        let pin = PinValue::new("0123456789").unwrap();
        let encoded = encode_pin(&pin);
        assert_eq!(encoded.len(), 10);
        assert_eq!(encoded[0], b'0');
        assert_eq!(encoded[9], b'9');
    }

    #[test]
    fn test_decode_duration() {
        assert_eq!(decode_duration(&[210, 4]), Some(1234));
        assert_eq!(decode_duration(&[0, 1]), Some(256));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[1])]
    #[case(&[1, 0, 0])]
    #[case(&[1, 0, 0, 0, 0, 0, 0, 0])]
    fn test_decode_duration_rejects_wrong_length(#[case] payload: &[u8]) {
        assert_eq!(decode_duration(payload), None);
    }
}
