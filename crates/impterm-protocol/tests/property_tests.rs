//! Property-based tests for operator input validation and wire encoding.
//!
//! These tests use proptest to generate arbitrary operator input and verify
//! that the validator and encoder agree with the wire format for every
//! value, not only the hand-picked cases in the unit tests.

use impterm_core::{DurationValue, PinValue};
use impterm_protocol::{
    ConfigCommand, decode_duration, encode_duration, encode_pin, pins_match, validate_duration,
    validate_duration_input, validate_pin,
};
use proptest::prelude::*;

/// Strategy for generating valid PINs (4-10 ASCII digits).
fn valid_pin() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{4,10}").expect("Failed to create PIN regex strategy")
}

/// Strategy for generating valid door-open durations.
fn valid_duration() -> impl Strategy<Value = u16> {
    1u16..=u16::MAX
}

proptest! {
    /// Property: the validator accepts exactly the strings made of 4-10 ASCII digits.
    #[test]
    fn prop_validate_pin_matches_definition(input in any::<String>()) {
        let expected = (4..=10).contains(&input.len())
            && input.bytes().all(|b| b.is_ascii_digit());
        prop_assert_eq!(validate_pin(&input), expected);
    }

    /// Property: every generated digit string of valid length is accepted.
    #[test]
    fn prop_valid_pins_accepted(pin in valid_pin()) {
        prop_assert!(validate_pin(&pin));
    }

    /// Property: the validator accepts exactly the integers in 1..=65535.
    #[test]
    fn prop_validate_duration_matches_range(seconds in any::<i64>()) {
        prop_assert_eq!(validate_duration(seconds), (1..=65535).contains(&seconds));
    }

    /// Property: numeric text input agrees with the numeric validator.
    #[test]
    fn prop_duration_input_agrees_with_numeric(seconds in -100_000i64..100_000) {
        prop_assert_eq!(
            validate_duration_input(&seconds.to_string()),
            validate_duration(seconds)
        );
    }

    /// Property: a PIN always matches itself and never matches a different PIN.
    #[test]
    fn prop_pins_match_is_equality(a in valid_pin(), b in valid_pin()) {
        prop_assert!(pins_match(&a, &a));
        prop_assert_eq!(pins_match(&a, &b), a == b);
    }

    /// Property: the PIN payload is the ASCII code of each digit, in order.
    #[test]
    fn prop_encode_pin_is_ascii(pin in valid_pin()) {
        let value = PinValue::new(&pin).unwrap();
        let encoded = encode_pin(&value);

        prop_assert_eq!(encoded.len(), pin.len());
        for (byte, digit) in encoded.iter().zip(pin.chars()) {
            prop_assert_eq!(*byte, digit as u8);
        }
    }

    /// Property: decoding the duration payload as little-endian u16 yields the input.
    #[test]
    fn prop_encode_duration_roundtrip(seconds in valid_duration()) {
        let encoded = encode_duration(DurationValue::new(seconds).unwrap());

        prop_assert_eq!(encoded.len(), 2);
        prop_assert_eq!(encoded[0], (seconds & 0xFF) as u8);
        prop_assert_eq!(encoded[1], (seconds >> 8) as u8);
        prop_assert_eq!(decode_duration(&encoded), Some(seconds));
    }

    /// Property: commands target distinct attributes and carry the encoded payload.
    #[test]
    fn prop_command_payloads(pin in valid_pin(), seconds in valid_duration()) {
        let pin_command = ConfigCommand::SetAccessPin(PinValue::new(&pin).unwrap());
        let duration_command =
            ConfigCommand::SetDoorOpenDuration(DurationValue::new(seconds).unwrap());

        prop_assert_ne!(pin_command.address(), duration_command.address());
        prop_assert_eq!(pin_command.payload(), pin.as_bytes().to_vec());
        prop_assert_eq!(duration_command.payload(), seconds.to_le_bytes().to_vec());
    }
}
