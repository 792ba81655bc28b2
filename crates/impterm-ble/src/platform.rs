//! Platform Bluetooth backend built on `btleplug`.
//!
//! Uses the first adapter reported by the platform manager (BlueZ on Linux,
//! CoreBluetooth on macOS, WinRT on Windows). Native `btleplug` errors are
//! converted into [`LinkError`] here and nowhere else.

use crate::error::{LinkError, Result};
use crate::traits::{LinkBackend, PeripheralLink};
use crate::types::{DeviceSummary, GattCharacteristic, GattService};
use btleplug::api::{
    Central, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::future::join_all;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, trace};
use uuid::Uuid;

impl From<btleplug::Error> for LinkError {
    fn from(error: btleplug::Error) -> Self {
        match error {
            btleplug::Error::PermissionDenied => {
                LinkError::not_permitted("Bluetooth permission denied")
            }
            btleplug::Error::TimedOut(limit) => LinkError::timeout("platform operation", limit),
            btleplug::Error::NotConnected => LinkError::communication("Peripheral not connected"),
            btleplug::Error::DeviceNotFound => LinkError::communication("Peripheral not found"),
            // RuntimeError and Other only carry a platform message
            other => LinkError::communication(other.to_string()),
        }
    }
}

/// Link backend for the host's Bluetooth adapter.
#[derive(Debug)]
pub struct BtleplugBackend {
    adapter: Adapter,
    name_filter: Option<String>,
}

impl BtleplugBackend {
    /// Open the first Bluetooth adapter.
    ///
    /// Peripherals whose advertised name contains `name_filter` are offered
    /// even when they do not advertise the service.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NoAdapter`] if the host has no adapter, or the
    /// platform error if the Bluetooth stack cannot be opened.
    pub async fn new(name_filter: Option<String>) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(LinkError::NoAdapter)?;

        let info = adapter.adapter_info().await.unwrap_or_default();
        info!(adapter = %info, "Bluetooth adapter ready");
        Ok(Self {
            adapter,
            name_filter,
        })
    }

    fn matches(&self, service: Uuid, advertised: &[Uuid], name: Option<&str>) -> bool {
        if advertised.contains(&service) {
            return true;
        }
        match (&self.name_filter, name) {
            (Some(filter), Some(name)) => name.contains(filter.as_str()),
            _ => false,
        }
    }
}

impl LinkBackend for BtleplugBackend {
    type Peripheral = BtleplugPeripheral;

    #[instrument(skip(self), level = "debug")]
    async fn discover(&self, service: Uuid, scan_window: Duration) -> Result<Vec<BtleplugPeripheral>> {
        // A service filter would hide terminals found only by name
        let filter = match self.name_filter {
            Some(_) => ScanFilter::default(),
            None => ScanFilter {
                services: vec![service],
            },
        };

        self.adapter.start_scan(filter).await?;
        tokio::time::sleep(scan_window).await;
        let peripherals = self.adapter.peripherals().await;
        if let Err(error) = self.adapter.stop_scan().await {
            debug!(%error, "Failed to stop scan cleanly");
        }
        let peripherals = peripherals?;

        let properties = join_all(peripherals.iter().map(|p| p.properties())).await;

        let mut found = Vec::new();
        for (peripheral, properties) in peripherals.into_iter().zip(properties) {
            let Some(properties) = scanned_properties(peripheral.id(), properties) else {
                continue;
            };
            if !self.matches(
                service,
                &properties.services,
                properties.local_name.as_deref(),
            ) {
                trace!(peripheral = %peripheral.id(), "Skipping unrelated peripheral");
                continue;
            }

            let summary = DeviceSummary {
                id: peripheral.id().to_string(),
                name: properties.local_name,
                rssi: properties.rssi,
            };
            found.push(BtleplugPeripheral {
                inner: peripheral,
                summary,
            });
        }

        debug!(count = found.len(), "Scan finished");
        Ok(found)
    }
}

/// Properties of a scanned peripheral, or `None` if it cannot be offered.
///
/// One peripheral failing its properties query does not end the scan.
fn scanned_properties(
    id: impl fmt::Display,
    properties: btleplug::Result<Option<PeripheralProperties>>,
) -> Option<PeripheralProperties> {
    match properties {
        Ok(properties) => properties,
        Err(error) => {
            debug!(peripheral = %id, %error, "Skipping peripheral without properties");
            None
        }
    }
}

/// Peripheral discovered by [`BtleplugBackend`].
#[derive(Debug, Clone)]
pub struct BtleplugPeripheral {
    inner: Peripheral,
    summary: DeviceSummary,
}

impl BtleplugPeripheral {
    /// Convert a platform error, naming this peripheral when the link is gone.
    fn link_error(&self, error: btleplug::Error) -> LinkError {
        match error {
            btleplug::Error::NotConnected | btleplug::Error::DeviceNotFound => {
                LinkError::disconnected(self.summary.id.clone())
            }
            other => other.into(),
        }
    }
}

impl PeripheralLink for BtleplugPeripheral {
    fn id(&self) -> &str {
        &self.summary.id
    }

    fn summary(&self) -> DeviceSummary {
        self.summary.clone()
    }

    async fn is_connected(&self) -> bool {
        self.inner.is_connected().await.unwrap_or(false)
    }

    async fn connect(&self) -> Result<()> {
        self.inner.connect().await.map_err(|e| self.link_error(e))
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner.disconnect().await.map_err(|e| self.link_error(e))
    }

    async fn discover_services(&self) -> Result<Vec<GattService>> {
        self.inner
            .discover_services()
            .await
            .map_err(|e| self.link_error(e))?;

        Ok(self
            .inner
            .services()
            .into_iter()
            .map(|service| GattService {
                uuid: service.uuid,
                characteristics: service
                    .characteristics
                    .into_iter()
                    .map(|c| GattCharacteristic {
                        uuid: c.uuid,
                        service: c.service_uuid,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn write(&self, characteristic: &GattCharacteristic, payload: &[u8]) -> Result<()> {
        let native = self
            .inner
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == characteristic.uuid && c.service_uuid == characteristic.service)
            .ok_or(LinkError::CharacteristicNotFound {
                service: characteristic.service,
                characteristic: characteristic.uuid,
            })?;

        // With response, so a locked terminal's rejection reaches the caller
        self.inner
            .write(&native, payload, WriteType::WithResponse)
            .await
            .map_err(|e| self.link_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impterm_core::FailureKind;
    use rstest::rstest;

    #[test]
    fn test_permission_denied_is_not_permitted() {
        let error = LinkError::from(btleplug::Error::PermissionDenied);
        assert_eq!(error.kind(), FailureKind::NotPermitted);
    }

    #[test]
    fn test_platform_timeout() {
        let error = LinkError::from(btleplug::Error::TimedOut(Duration::from_secs(3)));
        assert_eq!(error, LinkError::timeout("platform operation", Duration::from_secs(3)));
    }

    #[rstest]
    #[case::not_connected(btleplug::Error::NotConnected, "Communication error: Peripheral not connected")]
    #[case::not_found(btleplug::Error::DeviceNotFound, "Communication error: Peripheral not found")]
    fn test_missing_link_reads_as_message(#[case] error: btleplug::Error, #[case] expected: &str) {
        let error = LinkError::from(error);
        assert_eq!(error.to_string(), expected);
        assert_eq!(error.kind(), FailureKind::LinkError);
    }

    #[test]
    fn test_failed_properties_query_skips_peripheral() {
        let failed = Err(btleplug::Error::RuntimeError("org.bluez.Error.Failed".to_string()));
        assert!(scanned_properties("AA:01", failed).is_none());
        assert!(scanned_properties("AA:02", Ok(None)).is_none());

        let advertised = PeripheralProperties {
            local_name: Some("IMP Terminal".to_string()),
            ..PeripheralProperties::default()
        };
        let kept = scanned_properties("AA:03", Ok(Some(advertised))).unwrap();
        assert_eq!(kept.local_name.as_deref(), Some("IMP Terminal"));
    }

    #[rstest]
    #[case(
        "org.bluez.Error.NotPermitted: Write not permitted",
        FailureKind::NotPermitted
    )]
    #[case(
        "org.bluez.Error.Failed: Operation already in progress",
        FailureKind::LinkError
    )]
    #[case("Operation was cancelled", FailureKind::UserCancelled)]
    fn test_runtime_errors_are_classified(
        #[case] message: &str,
        #[case] expected: FailureKind,
    ) {
        let error = LinkError::from(btleplug::Error::RuntimeError(message.to_string()));
        assert_eq!(error.kind(), expected);
    }
}
