//! Link trait definitions.
//!
//! This module defines the contract between the connection manager and the
//! Bluetooth stack. A [`LinkBackend`] discovers peripherals, a
//! [`PeripheralLink`] is one discovered peripheral, and a [`DevicePicker`]
//! lets the operator choose among the candidates.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceSummary, GattCharacteristic, GattService, Selection};
use std::time::Duration;
use uuid::Uuid;

/// Bluetooth stack able to scan for peripherals.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic type parameters, or the enum wrappers from the
/// [`devices`](crate::devices) module when the backend is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use impterm_ble::traits::{LinkBackend, PeripheralLink};
/// use impterm_ble::Result;
/// use impterm_core::constants::{AUTOMATION_IO_SERVICE_UUID, DEFAULT_SCAN_WINDOW};
///
/// async fn list_terminals<B: LinkBackend>(backend: &B) -> Result<Vec<String>> {
///     let found = backend
///         .discover(AUTOMATION_IO_SERVICE_UUID, DEFAULT_SCAN_WINDOW)
///         .await?;
///     Ok(found.iter().map(|p| p.summary().to_string()).collect())
/// }
/// ```
pub trait LinkBackend: Send + Sync {
    /// Peripheral handle produced by this backend.
    type Peripheral: PeripheralLink;

    /// Scan for peripherals advertising `service`.
    ///
    /// Listens for `scan_window` and returns every matching peripheral seen,
    /// possibly none. Returned handles are not connected.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No adapter is available
    /// - The platform refuses to scan
    async fn discover(&self, service: Uuid, scan_window: Duration)
    -> Result<Vec<Self::Peripheral>>;
}

/// One discovered peripheral.
///
/// A handle keeps its identity for its whole lifetime and can be connected
/// and disconnected repeatedly.
pub trait PeripheralLink: Send + Sync {
    /// Platform-assigned identity.
    fn id(&self) -> &str;

    /// Advertised identity captured at discovery time.
    fn summary(&self) -> DeviceSummary;

    /// Whether the link is currently up.
    ///
    /// Platform query failures are reported as `false`.
    async fn is_connected(&self) -> bool;

    /// Establish the link.
    ///
    /// # Errors
    ///
    /// Returns an error if the peripheral is out of range, refuses the
    /// connection or the platform reports a failure.
    async fn connect(&self) -> Result<()>;

    /// Tear the link down. Disconnecting an idle handle is not an error.
    async fn disconnect(&self) -> Result<()>;

    /// Resolve the GATT table of a connected peripheral.
    ///
    /// # Errors
    ///
    /// Returns an error if the peripheral is not connected or service
    /// discovery fails.
    async fn discover_services(&self) -> Result<Vec<GattService>>;

    /// Write `payload` to `characteristic`, waiting for the peripheral's
    /// acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The peripheral rejects the write (e.g. the terminal is locked)
    /// - The link drops before the acknowledgement
    async fn write(&self, characteristic: &GattCharacteristic, payload: &[u8]) -> Result<()>;
}

/// Operator prompt for choosing a discovered terminal.
///
/// # Examples
///
/// ```
/// use impterm_ble::traits::DevicePicker;
/// use impterm_ble::types::{DeviceSummary, Selection};
/// use impterm_ble::Result;
///
/// /// Picks the strongest signal without asking.
/// struct Strongest;
///
/// impl DevicePicker for Strongest {
///     async fn choose(&self, candidates: &[DeviceSummary]) -> Result<Selection> {
///         Ok(candidates
///             .iter()
///             .enumerate()
///             .max_by_key(|(_, c)| c.rssi.unwrap_or(i16::MIN))
///             .map_or(Selection::Cancelled, |(index, _)| Selection::Device(index)))
///     }
/// }
/// ```
pub trait DevicePicker: Send + Sync {
    /// Ask the operator to pick one of `candidates`.
    ///
    /// Called only with a non-empty candidate list.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt itself fails (e.g. the input stream
    /// closed). Dismissing the prompt is [`Selection::Cancelled`], not an
    /// error.
    async fn choose(&self, candidates: &[DeviceSummary]) -> Result<Selection>;
}
