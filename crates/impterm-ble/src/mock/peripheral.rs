//! Mock terminal peripheral for testing and development.
//!
//! This module provides a simulated access terminal that records every write
//! and can be scripted to fail, drop the link or respond slowly.

use crate::{
    LinkError, Result,
    traits::PeripheralLink,
    types::{DeviceSummary, GattCharacteristic, GattService},
};
use impterm_core::constants::{
    ACCESS_PIN_CHARACTERISTIC_UUID, AUTOMATION_IO_SERVICE_UUID,
    DOOR_OPEN_DURATION_CHARACTERISTIC_UUID,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// A write accepted by a mock peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub characteristic: Uuid,
    pub payload: Vec<u8>,
}

#[derive(Debug)]
struct PeripheralState {
    connected: bool,
    services: Vec<GattService>,
    writes: Vec<RecordedWrite>,
    connect_calls: usize,
    disconnect_calls: usize,
    connect_error: Option<LinkError>,
    services_error: Option<LinkError>,
    write_error: Option<LinkError>,
    latency: Duration,
    stall_checks: bool,
}

impl PeripheralState {
    fn terminal() -> Self {
        Self {
            connected: false,
            services: vec![GattService::new(
                AUTOMATION_IO_SERVICE_UUID,
                [
                    ACCESS_PIN_CHARACTERISTIC_UUID,
                    DOOR_OPEN_DURATION_CHARACTERISTIC_UUID,
                ],
            )],
            writes: Vec::new(),
            connect_calls: 0,
            disconnect_calls: 0,
            connect_error: None,
            services_error: None,
            write_error: None,
            latency: Duration::ZERO,
            stall_checks: false,
        }
    }
}

fn lock(state: &Mutex<PeripheralState>) -> MutexGuard<'_, PeripheralState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock access terminal.
///
/// A fresh peripheral advertises the Automation IO service and exposes the
/// access PIN and door-open duration characteristics. Clones share state, so
/// a clone handed out by [`MockBackend`](super::MockBackend) is the same
/// device.
///
/// # Examples
///
/// ```
/// use impterm_ble::mock::MockPeripheral;
/// use impterm_ble::traits::PeripheralLink;
///
/// #[tokio::main]
/// async fn main() -> impterm_ble::Result<()> {
///     let (terminal, handle) = MockPeripheral::new("C8:2E:18:00:00:01");
///
///     terminal.connect().await?;
///     let services = terminal.discover_services().await?;
///     let pin = services[0].characteristics[0];
///     terminal.write(&pin, b"4321").await?;
///
///     assert_eq!(handle.writes()[0].payload, b"4321".to_vec());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockPeripheral {
    summary: DeviceSummary,
    advertised: Vec<Uuid>,
    state: Arc<Mutex<PeripheralState>>,
}

impl MockPeripheral {
    /// Create a mock terminal with the default name.
    ///
    /// Returns a tuple of (MockPeripheral, MockPeripheralHandle) where the
    /// handle inspects and scripts the peripheral.
    pub fn new(id: impl Into<String>) -> (Self, MockPeripheralHandle) {
        let state = Arc::new(Mutex::new(PeripheralState::terminal()));
        let peripheral = Self {
            summary: DeviceSummary::new(id).with_name("IMP Terminal"),
            advertised: vec![AUTOMATION_IO_SERVICE_UUID],
            state: Arc::clone(&state),
        };
        (peripheral, MockPeripheralHandle { state })
    }

    /// Set the advertised name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.summary.name = Some(name.into());
        self
    }

    /// Set the advertised signal strength.
    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.summary.rssi = Some(rssi);
        self
    }

    /// Replace the advertised service list.
    pub fn advertising(mut self, services: Vec<Uuid>) -> Self {
        self.advertised = services;
        self
    }

    pub(crate) fn advertises(&self, service: Uuid) -> bool {
        self.advertised.contains(&service)
    }

    async fn simulate_latency(&self) {
        let latency = lock(&self.state).latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

impl PeripheralLink for MockPeripheral {
    fn id(&self) -> &str {
        &self.summary.id
    }

    fn summary(&self) -> DeviceSummary {
        self.summary.clone()
    }

    async fn is_connected(&self) -> bool {
        let (connected, stalled) = {
            let state = lock(&self.state);
            (state.connected, state.stall_checks)
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        connected
    }

    async fn connect(&self) -> Result<()> {
        self.simulate_latency().await;

        let mut state = lock(&self.state);
        state.connect_calls += 1;
        if let Some(error) = state.connect_error.clone() {
            return Err(error);
        }
        state.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let mut state = lock(&self.state);
        state.disconnect_calls += 1;
        state.connected = false;
        Ok(())
    }

    async fn discover_services(&self) -> Result<Vec<GattService>> {
        let state = lock(&self.state);
        if !state.connected {
            return Err(LinkError::disconnected(self.summary.id.clone()));
        }
        if let Some(error) = state.services_error.clone() {
            return Err(error);
        }
        Ok(state.services.clone())
    }

    async fn write(&self, characteristic: &GattCharacteristic, payload: &[u8]) -> Result<()> {
        self.simulate_latency().await;

        let mut state = lock(&self.state);
        if !state.connected {
            return Err(LinkError::disconnected(self.summary.id.clone()));
        }
        if let Some(error) = state.write_error.clone() {
            if matches!(error, LinkError::Disconnected { .. }) {
                state.connected = false;
            }
            return Err(error);
        }
        state.writes.push(RecordedWrite {
            characteristic: characteristic.uuid,
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

/// Handle for inspecting and scripting a mock peripheral.
///
/// It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockPeripheralHandle {
    state: Arc<Mutex<PeripheralState>>,
}

impl MockPeripheralHandle {
    /// Writes accepted so far, oldest first.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        lock(&self.state).writes.clone()
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }

    /// Number of connection attempts, failed ones included.
    pub fn connect_count(&self) -> usize {
        lock(&self.state).connect_calls
    }

    pub fn disconnect_count(&self) -> usize {
        lock(&self.state).disconnect_calls
    }

    /// Simulate the link dropping (peripheral out of range, powered off).
    pub fn drop_link(&self) {
        lock(&self.state).connected = false;
    }

    /// Replace the GATT table exposed after connecting.
    pub fn set_services(&self, services: Vec<GattService>) {
        lock(&self.state).services = services;
    }

    /// Make every connection attempt fail with `error` until cleared.
    pub fn fail_connect(&self, error: Option<LinkError>) {
        lock(&self.state).connect_error = error;
    }

    /// Make service discovery fail with `error` until cleared.
    pub fn fail_service_discovery(&self, error: Option<LinkError>) {
        lock(&self.state).services_error = error;
    }

    /// Make every write fail with `error` until cleared.
    ///
    /// A [`LinkError::Disconnected`] also drops the link.
    pub fn fail_writes(&self, error: Option<LinkError>) {
        lock(&self.state).write_error = error;
    }

    /// Delay applied before each connect and write.
    pub fn set_latency(&self, latency: Duration) {
        lock(&self.state).latency = latency;
    }

    /// Make link status queries never answer.
    pub fn stall_connection_checks(&self, stall: bool) {
        lock(&self.state).stall_checks = stall;
    }
}
