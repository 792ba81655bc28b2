//! Submission entry points.
//!
//! [`ConfigClient`] is what a presentation layer talks to: it takes raw
//! operator input, validates it before any link I/O, encodes it and runs one
//! transaction per submission.

use crate::config::LinkConfig;
use crate::error::Result;
use crate::executor::write_attribute;
use crate::manager::ConnectionManager;
use crate::state::SessionState;
use crate::traits::{DevicePicker, LinkBackend};
use crate::types::DeviceSummary;
use impterm_core::{DurationValue, PinValue, TransactionOutcome, ValidationError};
use impterm_protocol::{ConfigCommand, pins_match};
use tracing::{debug, info};

/// Terminal configuration client.
///
/// Submissions from concurrent tasks are executed one at a time against the
/// single cached terminal.
///
/// # Examples
///
/// ```
/// use impterm_ble::client::ConfigClient;
/// use impterm_ble::config::LinkConfig;
/// use impterm_ble::mock::{MockBackend, MockPeripheral, ScriptedPicker};
///
/// #[tokio::main]
/// async fn main() {
///     let (terminal, handle) = MockPeripheral::new("C8:2E:18:00:00:01");
///     let backend = MockBackend::new().with_peripheral(terminal);
///     let client = ConfigClient::new(backend, ScriptedPicker::select(0), LinkConfig::default());
///
///     let outcome = client.submit_pin("4321", "4321").await.unwrap();
///     assert!(outcome.is_success());
///     assert_eq!(handle.writes()[0].payload, vec![52, 51, 50, 49]);
///
///     // Rejected before any I/O
///     assert!(client.submit_duration(0).await.is_err());
/// }
/// ```
pub struct ConfigClient<B: LinkBackend, K: DevicePicker> {
    manager: ConnectionManager<B, K>,
}

impl<B: LinkBackend, K: DevicePicker> ConfigClient<B, K> {
    pub fn new(backend: B, picker: K, config: LinkConfig) -> Self {
        Self {
            manager: ConnectionManager::new(backend, picker, config),
        }
    }

    pub fn manager(&self) -> &ConnectionManager<B, K> {
        &self.manager
    }

    pub fn state(&self) -> SessionState {
        self.manager.state()
    }

    /// Set the terminal's access PIN.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPin`] if `pin` is not 4-10 digits
    /// and [`ValidationError::PinMismatch`] if `confirmation` differs. No
    /// link I/O happens in either case. Link failures are reported in the
    /// returned outcome, not as errors.
    pub async fn submit_pin(
        &self,
        pin: &str,
        confirmation: &str,
    ) -> std::result::Result<TransactionOutcome, ValidationError> {
        let pin = PinValue::new(pin)?;
        if !pins_match(pin.as_str(), confirmation) {
            debug!("PIN confirmation mismatch");
            return Err(ValidationError::PinMismatch);
        }
        Ok(self.execute(ConfigCommand::SetAccessPin(pin)).await)
    }

    /// Set the terminal's door-open duration in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] if `seconds` is outside
    /// 1-65535. No link I/O happens in that case.
    pub async fn submit_duration(
        &self,
        seconds: i64,
    ) -> std::result::Result<TransactionOutcome, ValidationError> {
        let seconds = DurationValue::try_from(seconds)?;
        Ok(self.execute(ConfigCommand::SetDoorOpenDuration(seconds)).await)
    }

    /// Set the door-open duration from text as typed by the operator.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDuration`] if `input` is not a whole
    /// number of seconds in 1-65535.
    pub async fn submit_duration_input(
        &self,
        input: &str,
    ) -> std::result::Result<TransactionOutcome, ValidationError> {
        let seconds: DurationValue = input.parse()?;
        Ok(self.execute(ConfigCommand::SetDoorOpenDuration(seconds)).await)
    }

    /// List terminals in range without binding to any of them.
    pub async fn scan(&self) -> Result<Vec<DeviceSummary>> {
        self.manager.scan().await
    }

    /// Disconnect from the cached terminal.
    pub async fn shutdown(&self) -> Result<()> {
        self.manager.disconnect().await
    }

    async fn execute(&self, command: ConfigCommand) -> TransactionOutcome {
        info!(command = command.name(), "Submitting configuration change");
        write_attribute(&self.manager, command.address(), &command.payload()).await
    }
}
