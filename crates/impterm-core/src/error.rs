use thiserror::Error;

/// Operator input rejected before any link I/O is attempted.
///
/// Validation failures are reported by the submission entry points as `Err`
/// and are never folded into a transaction outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// PIN is not 4-10 ASCII digits. Only the length is reported so the
    /// entered value never ends up in logs.
    #[error("Access PIN must be 4-10 decimal digits, got {length} characters")]
    InvalidPin { length: usize },

    #[error("PIN confirmation does not match")]
    PinMismatch,

    #[error("Door-open duration must be a whole number of seconds in 1-65535, got '{input}'")]
    InvalidDuration { input: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
