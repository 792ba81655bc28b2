//! Operator input validation and wire encoding for the IMP access terminal.
//!
//! Everything in this crate is pure: no I/O, no shared state. It decides
//! whether an operator submission may reach the link layer and produces the
//! exact bytes the terminal expects.
//!
//! ```
//! use impterm_protocol::{ConfigCommand, codec, validation};
//! use impterm_core::PinValue;
//!
//! assert!(validation::validate_pin("4321"));
//! assert!(validation::pins_match("4321", "4321"));
//!
//! let pin = PinValue::new("4321").unwrap();
//! assert_eq!(codec::encode_pin(&pin), vec![52, 51, 50, 49]);
//!
//! let command = ConfigCommand::SetAccessPin(pin);
//! assert_eq!(command.payload(), vec![52, 51, 50, 49]);
//! ```

pub mod codec;
pub mod command;
pub mod validation;

pub use codec::{decode_duration, encode_duration, encode_pin};
pub use command::ConfigCommand;
pub use validation::{pins_match, validate_duration, validate_duration_input, validate_pin};
