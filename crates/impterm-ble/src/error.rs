//! Error types for link operations.
//!
//! Every failure raised by a backend, the connection manager or the
//! transaction executor is expressed as a [`LinkError`]. Each variant maps to
//! exactly one [`FailureKind`] through [`LinkError::kind`], so platform
//! failures are classified once, where they enter the crate.

use crate::classify::classify_message;
use impterm_core::{FailureKind, TransactionOutcome};
use std::time::Duration;
use uuid::Uuid;

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors that can occur while talking to a terminal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Operator dismissed the device selection prompt.
    #[error("Device selection cancelled by the operator")]
    Cancelled,

    /// Picker returned an index outside the offered candidates.
    #[error("Selected device {index} is not one of the {available} candidates")]
    InvalidSelection { index: usize, available: usize },

    /// No Bluetooth adapter is available on this host.
    #[error("No Bluetooth adapter found")]
    NoAdapter,

    /// Scan finished without any peripheral advertising the service.
    #[error("No device advertising service {service} found")]
    NoDevicesFound { service: Uuid },

    /// Peripheral refused the operation until it is unlocked or paired.
    #[error("Operation not permitted: {message}")]
    NotPermitted { message: String },

    /// Operation did not complete within its time bound.
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: &'static str,
        duration_ms: u64,
    },

    /// Peripheral is not connected or dropped the link.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    #[error("Service {service} not found on device")]
    ServiceNotFound { service: Uuid },

    #[error("Characteristic {characteristic} not found in service {service}")]
    CharacteristicNotFound { service: Uuid, characteristic: Uuid },

    /// Platform failure carrying a free-form diagnostic.
    #[error("Communication error: {message}")]
    Communication { message: String },

    /// Platform failure without any diagnostic.
    #[error("Unknown link failure")]
    Unknown,
}

impl LinkError {
    /// Create a new not-permitted error.
    pub fn not_permitted(message: impl Into<String>) -> Self {
        Self::NotPermitted {
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(operation: &'static str, limit: Duration) -> Self {
        Self::Timeout {
            operation,
            duration_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// Failure kind reported to the caller.
    ///
    /// Only [`LinkError::Communication`] is classified by its message; every
    /// other variant already names its kind.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Cancelled => FailureKind::UserCancelled,
            Self::NotPermitted { .. } => FailureKind::NotPermitted,
            Self::Communication { message } => classify_message(Some(message)),
            Self::Unknown => FailureKind::Unknown,
            Self::InvalidSelection { .. }
            | Self::NoAdapter
            | Self::NoDevicesFound { .. }
            | Self::Timeout { .. }
            | Self::Disconnected { .. }
            | Self::ServiceNotFound { .. }
            | Self::CharacteristicNotFound { .. } => FailureKind::LinkError,
        }
    }
}

impl From<LinkError> for TransactionOutcome {
    fn from(error: LinkError) -> Self {
        let kind = error.kind();
        let message = match error {
            LinkError::Unknown => None,
            LinkError::Communication { message } if message.trim().is_empty() => None,
            other => Some(other.to_string()),
        };
        TransactionOutcome::failure(kind, message)
    }
}
