//! Common types shared across link backends.
//!
//! This module defines the backend-neutral view of a peripheral: what the
//! operator sees in the device picker and the GATT table resolved after
//! connecting.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Advertised identity of a discovered peripheral.
///
/// Shown to the operator when choosing a terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Platform-assigned peripheral identity (MAC address, CoreBluetooth UUID).
    pub id: String,

    /// Advertised local name, if any.
    pub name: Option<String>,

    /// Signal strength at discovery time, in dBm.
    pub rssi: Option<i16>,
}

impl DeviceSummary {
    /// Create a new DeviceSummary with only an identity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            rssi: None,
        }
    }

    /// Set the advertised name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the signal strength.
    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Name to display, falling back to the identity.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.rssi) {
            (Some(name), Some(rssi)) => write!(f, "{name} [{}] {rssi} dBm", self.id),
            (Some(name), None) => write!(f, "{name} [{}]", self.id),
            (None, Some(rssi)) => write!(f, "[{}] {rssi} dBm", self.id),
            (None, None) => write!(f, "[{}]", self.id),
        }
    }
}

/// A characteristic resolved on a connected peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GattCharacteristic {
    pub uuid: Uuid,

    /// Service the characteristic belongs to.
    pub service: Uuid,
}

/// A primary service resolved on a connected peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GattService {
    pub uuid: Uuid,
    pub characteristics: Vec<GattCharacteristic>,
}

impl GattService {
    /// Create a service exposing the given characteristics.
    pub fn new(uuid: Uuid, characteristics: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            uuid,
            characteristics: characteristics
                .into_iter()
                .map(|characteristic| GattCharacteristic {
                    uuid: characteristic,
                    service: uuid,
                })
                .collect(),
        }
    }

    /// Find a characteristic of this service by UUID.
    pub fn characteristic(&self, uuid: Uuid) -> Option<&GattCharacteristic> {
        self.characteristics.iter().find(|c| c.uuid == uuid)
    }
}

/// Operator decision in the device picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Index into the offered candidates.
    Device(usize),

    /// Prompt dismissed.
    Cancelled,
}
