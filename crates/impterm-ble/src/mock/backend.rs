//! Mock Bluetooth stack.

use super::MockPeripheral;
use crate::{LinkError, Result, traits::LinkBackend};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Default)]
struct BackendState {
    peripherals: Vec<MockPeripheral>,
    scans: usize,
    scan_error: Option<LinkError>,
    scan_delay: Duration,
}

/// Mock Bluetooth stack holding a fixed set of peripherals in range.
///
/// The scan window is not simulated: a scan returns immediately unless a
/// delay is set with [`MockBackend::set_scan_delay`]. Clones share state.
///
/// # Examples
///
/// ```
/// use impterm_ble::mock::{MockBackend, MockPeripheral};
/// use impterm_ble::traits::LinkBackend;
/// use impterm_core::constants::{AUTOMATION_IO_SERVICE_UUID, DEFAULT_SCAN_WINDOW};
///
/// #[tokio::main]
/// async fn main() -> impterm_ble::Result<()> {
///     let (terminal, _handle) = MockPeripheral::new("C8:2E:18:00:00:01");
///     let backend = MockBackend::new().with_peripheral(terminal);
///
///     let found = backend
///         .discover(AUTOMATION_IO_SERVICE_UUID, DEFAULT_SCAN_WINDOW)
///         .await?;
///     assert_eq!(found.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    /// Create a backend with no peripherals in range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peripheral in range.
    pub fn with_peripheral(self, peripheral: MockPeripheral) -> Self {
        self.add_peripheral(peripheral);
        self
    }

    /// Bring a peripheral into range.
    pub fn add_peripheral(&self, peripheral: MockPeripheral) {
        self.lock().peripherals.push(peripheral);
    }

    /// Number of scans performed.
    pub fn scan_count(&self) -> usize {
        self.lock().scans
    }

    /// Make every scan fail with `error` until cleared.
    pub fn fail_scans(&self, error: Option<LinkError>) {
        self.lock().scan_error = error;
    }

    /// Delay applied to each scan.
    pub fn set_scan_delay(&self, delay: Duration) {
        self.lock().scan_delay = delay;
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LinkBackend for MockBackend {
    type Peripheral = MockPeripheral;

    async fn discover(&self, service: Uuid, _scan_window: Duration) -> Result<Vec<MockPeripheral>> {
        let delay = {
            let mut state = self.lock();
            state.scans += 1;
            if let Some(error) = state.scan_error.clone() {
                return Err(error);
            }
            state.scan_delay
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let found: Vec<_> = self
            .lock()
            .peripherals
            .iter()
            .filter(|p| p.advertises(service))
            .cloned()
            .collect();
        trace!(%service, count = found.len(), "Mock scan finished");
        Ok(found)
    }
}
