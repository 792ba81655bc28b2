//! Enum wrappers for link backend dispatch.
//!
//! Native `async fn` in traits (RPITIT, Rust Edition 2024) are not
//! object-safe, so `Box<dyn LinkBackend>` is not available. These enums
//! provide concrete type dispatch instead, letting the CLI choose between
//! the platform stack and the simulated terminal at runtime.
//!
//! # Examples
//!
//! ```
//! use impterm_ble::devices::AnyBackend;
//! use impterm_ble::mock::{MockBackend, MockPeripheral};
//!
//! let (terminal, _handle) = MockPeripheral::new("C8:2E:18:00:00:01");
//! let backend = AnyBackend::Mock(MockBackend::new().with_peripheral(terminal));
//!
//! // Can now be used polymorphically through the LinkBackend trait
//! ```

use crate::mock::{MockBackend, MockPeripheral};
#[cfg(feature = "btleplug")]
use crate::platform::{BtleplugBackend, BtleplugPeripheral};
use crate::traits::{LinkBackend, PeripheralLink};
use crate::types::{DeviceSummary, GattCharacteristic, GattService};
use crate::Result;
use std::time::Duration;
use uuid::Uuid;

/// Enum wrapper for link backend dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyBackend {
    /// Host Bluetooth adapter.
    #[cfg(feature = "btleplug")]
    Btleplug(BtleplugBackend),

    /// Simulated terminal for demos and testing.
    Mock(MockBackend),
}

impl LinkBackend for AnyBackend {
    type Peripheral = AnyPeripheral;

    async fn discover(&self, service: Uuid, scan_window: Duration) -> Result<Vec<AnyPeripheral>> {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(backend) => Ok(backend
                .discover(service, scan_window)
                .await?
                .into_iter()
                .map(AnyPeripheral::Btleplug)
                .collect()),
            Self::Mock(backend) => Ok(backend
                .discover(service, scan_window)
                .await?
                .into_iter()
                .map(AnyPeripheral::Mock)
                .collect()),
        }
    }
}

/// Enum wrapper for peripheral dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyPeripheral {
    #[cfg(feature = "btleplug")]
    Btleplug(BtleplugPeripheral),

    Mock(MockPeripheral),
}

impl PeripheralLink for AnyPeripheral {
    fn id(&self) -> &str {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.id(),
            Self::Mock(peripheral) => peripheral.id(),
        }
    }

    fn summary(&self) -> DeviceSummary {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.summary(),
            Self::Mock(peripheral) => peripheral.summary(),
        }
    }

    async fn is_connected(&self) -> bool {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.is_connected().await,
            Self::Mock(peripheral) => peripheral.is_connected().await,
        }
    }

    async fn connect(&self) -> Result<()> {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.connect().await,
            Self::Mock(peripheral) => peripheral.connect().await,
        }
    }

    async fn disconnect(&self) -> Result<()> {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.disconnect().await,
            Self::Mock(peripheral) => peripheral.disconnect().await,
        }
    }

    async fn discover_services(&self) -> Result<Vec<GattService>> {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.discover_services().await,
            Self::Mock(peripheral) => peripheral.discover_services().await,
        }
    }

    async fn write(&self, characteristic: &GattCharacteristic, payload: &[u8]) -> Result<()> {
        match self {
            #[cfg(feature = "btleplug")]
            Self::Btleplug(peripheral) => peripheral.write(characteristic, payload).await,
            Self::Mock(peripheral) => peripheral.write(characteristic, payload).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impterm_core::constants::AUTOMATION_IO_SERVICE_UUID;

    #[tokio::test]
    async fn test_mock_dispatch() {
        let (terminal, handle) = MockPeripheral::new("AA:01");
        let backend = AnyBackend::Mock(MockBackend::new().with_peripheral(terminal));

        let found = backend
            .discover(AUTOMATION_IO_SERVICE_UUID, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(matches!(found[0], AnyPeripheral::Mock(_)));
        assert_eq!(found[0].id(), "AA:01");

        found[0].connect().await.unwrap();
        assert!(handle.is_connected());
        assert_eq!(found[0].discover_services().await.unwrap().len(), 1);
    }
}
