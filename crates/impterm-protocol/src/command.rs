//! Configuration commands understood by the terminal.
//!
//! A command pairs a validated operator value with the attribute it is
//! written to. The link layer only ever sees the resulting
//! `(AttributeAddress, payload)` pair.

use crate::codec::{encode_duration, encode_pin};
use impterm_core::{AttributeAddress, DurationValue, PinValue};

/// A single configuration write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Replace the access PIN typed on the terminal keypad.
    SetAccessPin(PinValue),

    /// Change how long the door stays open after a granted access.
    SetDoorOpenDuration(DurationValue),
}

impl ConfigCommand {
    /// Attribute the command writes to.
    pub fn address(&self) -> AttributeAddress {
        match self {
            Self::SetAccessPin(_) => AttributeAddress::ACCESS_PIN,
            Self::SetDoorOpenDuration(_) => AttributeAddress::DOOR_OPEN_DURATION,
        }
    }

    /// Encoded payload in the terminal's wire format.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::SetAccessPin(pin) => encode_pin(pin),
            Self::SetDoorOpenDuration(seconds) => encode_duration(*seconds).to_vec(),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetAccessPin(_) => "set_access_pin",
            Self::SetDoorOpenDuration(_) => "set_door_open_duration",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_access_pin() {
        let command = ConfigCommand::SetAccessPin(PinValue::new("4321").unwrap());
        assert_eq!(command.address(), AttributeAddress::ACCESS_PIN);
        assert_eq!(command.payload(), vec![52, 51, 50, 49]);
        assert_eq!(command.name(), "set_access_pin");
    }

    #[test]
    fn test_set_door_open_duration() {
        let command = ConfigCommand::SetDoorOpenDuration(DurationValue::new(10).unwrap());
        assert_eq!(command.address(), AttributeAddress::DOOR_OPEN_DURATION);
        assert_eq!(command.payload(), vec![10, 0]);
        assert_eq!(command.name(), "set_door_open_duration");
    }
}
