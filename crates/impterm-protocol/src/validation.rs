//! Operator input predicates.
//!
//! These functions gate every submission before any link I/O happens. They
//! are total over their input types: malformed input (empty strings,
//! non-numeric durations, out-of-range numbers) yields `false` and never
//! panics.
//!
//! # Rules
//!
//! | Predicate | True iff |
//! |-----------|----------|
//! | [`validate_pin`] | input matches `^[0-9]{4,10}$` |
//! | [`validate_duration`] | `1 <= n <= 65535` |
//! | [`validate_duration_input`] | trimmed input parses as an integer accepted by [`validate_duration`] |
//! | [`pins_match`] | both inputs are byte-for-byte identical |
//!
//! # Examples
//!
//! ```
//! use impterm_protocol::validation::*;
//!
//! assert!(validate_pin("1234"));
//! assert!(!validate_pin("123"));
//! assert!(!validate_pin("12345678901"));
//! assert!(!validate_pin("12a4"));
//!
//! assert!(!validate_duration(0));
//! assert!(validate_duration(1));
//! assert!(validate_duration(65535));
//! assert!(!validate_duration(65536));
//!
//! assert!(pins_match("1234", "1234"));
//! assert!(!pins_match("1234", "1235"));
//! ```

use impterm_core::{
    DurationValue, PinValue,
    constants::{MAX_DOOR_OPEN_SECS, MIN_DOOR_OPEN_SECS},
};
use subtle::ConstantTimeEq;

/// Check that a PIN is 4-10 ASCII decimal digits.
///
/// Non-ASCII digits (e.g. full-width or Arabic-Indic numerals) are rejected,
/// the terminal keypad only produces `0`-`9`.
pub fn validate_pin(pin: &str) -> bool {
    PinValue::new(pin).is_ok()
}

/// Check that a door-open duration is within 1-65535 seconds.
pub fn validate_duration(seconds: i64) -> bool {
    (i64::from(MIN_DOOR_OPEN_SECS)..=i64::from(MAX_DOOR_OPEN_SECS)).contains(&seconds)
}

/// Check a door-open duration as typed by the operator.
///
/// Surrounding whitespace is ignored. Fractions, units and empty input are
/// rejected.
///
/// ```
/// use impterm_protocol::validation::validate_duration_input;
///
/// assert!(validate_duration_input("10"));
/// assert!(validate_duration_input(" 10\n"));
/// assert!(!validate_duration_input("10s"));
/// assert!(!validate_duration_input(""));
/// ```
pub fn validate_duration_input(input: &str) -> bool {
    input.parse::<DurationValue>().is_ok()
}

/// Check that the PIN confirmation equals the PIN.
///
/// Comparison is byte-exact and runs in constant time for equal-length
/// inputs. No normalization is applied: `"1234 "` does not match `"1234"`.
pub fn pins_match(pin: &str, confirmation: &str) -> bool {
    pin.as_bytes().ct_eq(confirmation.as_bytes()).into()
}
