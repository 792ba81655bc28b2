use crate::{
    constants::{
        ACCESS_PIN_CHARACTERISTIC_UUID, AUTOMATION_IO_SERVICE_UUID,
        DOOR_OPEN_DURATION_CHARACTERISTIC_UUID, MAX_PIN_LENGTH, MIN_DOOR_OPEN_SECS,
        MIN_PIN_LENGTH,
    },
    error::ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Access PIN (4-10 ASCII decimal digits)
///
/// # Security
/// `Debug` and `Display` mask the digits, and comparison runs in constant
/// time. The raw digits are only reachable through [`PinValue::as_str`].
#[derive(Clone, Eq)]
pub struct PinValue(String);

impl PinValue {
    /// Create a new PIN with validation.
    ///
    /// The input is taken verbatim: surrounding whitespace makes it invalid.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidPin` unless the input is 4-10 ASCII digits.
    pub fn new(pin: &str) -> std::result::Result<Self, ValidationError> {
        let length = pin.chars().count();
        let digits_only = pin.bytes().all(|b| b.is_ascii_digit());

        if !digits_only || !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&length) {
            return Err(ValidationError::InvalidPin { length });
        }

        Ok(PinValue(pin.to_string()))
    }

    /// Get the PIN digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a validated PIN has at least four digits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for PinValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Debug for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PinValue({})", "*".repeat(self.0.len()))
    }
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "*".repeat(self.0.len()))
    }
}

impl std::str::FromStr for PinValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PinValue::new(s)
    }
}

/// Door-open duration in seconds (1-65535)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct DurationValue(u16);

impl DurationValue {
    /// Create a new duration with validation.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidDuration` for zero.
    pub fn new(seconds: u16) -> std::result::Result<Self, ValidationError> {
        if seconds < MIN_DOOR_OPEN_SECS {
            return Err(ValidationError::InvalidDuration {
                input: seconds.to_string(),
            });
        }
        Ok(DurationValue(seconds))
    }

    /// Get the raw number of seconds.
    #[must_use]
    pub fn as_secs(&self) -> u16 {
        self.0
    }
}

impl TryFrom<i64> for DurationValue {
    type Error = ValidationError;

    fn try_from(seconds: i64) -> std::result::Result<Self, Self::Error> {
        let seconds = u16::try_from(seconds).map_err(|_| ValidationError::InvalidDuration {
            input: seconds.to_string(),
        })?;
        DurationValue::new(seconds)
    }
}

impl From<DurationValue> for u16 {
    fn from(value: DurationValue) -> Self {
        value.0
    }
}

impl std::str::FromStr for DurationValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let seconds: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidDuration {
                input: s.to_string(),
            })?;
        DurationValue::try_from(seconds)
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// GATT attribute address: a characteristic inside a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeAddress {
    pub service: Uuid,
    pub characteristic: Uuid,
}

impl AttributeAddress {
    /// Access PIN characteristic of the Automation IO service.
    pub const ACCESS_PIN: AttributeAddress = AttributeAddress {
        service: AUTOMATION_IO_SERVICE_UUID,
        characteristic: ACCESS_PIN_CHARACTERISTIC_UUID,
    };

    /// Door-open duration characteristic of the Automation IO service.
    pub const DOOR_OPEN_DURATION: AttributeAddress = AttributeAddress {
        service: AUTOMATION_IO_SERVICE_UUID,
        characteristic: DOOR_OPEN_DURATION_CHARACTERISTIC_UUID,
    };

    pub const fn new(service: Uuid, characteristic: Uuid) -> Self {
        Self {
            service,
            characteristic,
        }
    }
}

impl fmt::Display for AttributeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.characteristic)
    }
}

/// Closed taxonomy of transaction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Operator aborted device selection. Informational, not an error.
    UserCancelled,

    /// Peripheral rejected the operation until it is unlocked or authenticated.
    NotPermitted,

    /// Discovery, connection, attribute resolution or write failed on the link.
    LinkError,

    /// Failure without any diagnostic to classify.
    Unknown,
}

impl FailureKind {
    /// Whether resubmitting the same request may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::LinkError | FailureKind::Unknown)
    }

    /// Whether the failure should be presented as an error.
    pub fn is_error(&self) -> bool {
        !matches!(self, FailureKind::UserCancelled)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FailureKind::UserCancelled => "UserCancelled",
            FailureKind::NotPermitted => "NotPermitted",
            FailureKind::LinkError => "LinkError",
            FailureKind::Unknown => "Unknown",
        };
        write!(f, "{}", kind)
    }
}

/// Result of one configuration transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Success,
    Failure {
        kind: FailureKind,
        /// Platform diagnostic, kept for logs and detailed feedback.
        message: Option<String>,
    },
}

impl TransactionOutcome {
    /// Create a failure outcome.
    pub fn failure(kind: FailureKind, message: Option<String>) -> Self {
        Self::Failure { kind, message }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure kind, or `None` on success.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Operator-facing feedback text for the presentation layer.
    pub fn user_message(&self) -> &'static str {
        match self.failure_kind() {
            None => "Terminal configuration updated",
            Some(FailureKind::UserCancelled) => "Device selection was cancelled",
            Some(FailureKind::NotPermitted) => {
                "The terminal refused the change. Unlock the terminal and try again"
            }
            Some(FailureKind::LinkError) => {
                "Could not communicate with the terminal. Move closer and try again"
            }
            Some(FailureKind::Unknown) => "Unexpected error while configuring the terminal",
        }
    }
}

impl fmt::Display for TransactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failure {
                kind,
                message: Some(message),
            } => write!(f, "Failure({kind}): {message}"),
            Self::Failure {
                kind,
                message: None,
            } => write!(f, "Failure({kind})"),
        }
    }
}
