//! Core constants for the IMP access terminal configuration protocol.
//!
//! This module defines the GATT attribute identifiers exposed by the terminal,
//! the operator input bounds enforced before anything is written, and the
//! default timing used by the link layer.
//!
//! # Attribute Layout
//!
//! The terminal exposes a single primary service with write-only
//! characteristics:
//!
//! | Operation | Service | Characteristic | Payload |
//! |-----------|---------|----------------|---------|
//! | Set access PIN | `automation_io` (0x1815) | `bf6036dc-5b62-425e-bed4-9b7f6ba1c921` | ASCII digits, 4-10 bytes |
//! | Set door-open duration | `automation_io` (0x1815) | `4e3ee180-27a0-4894-815a-c98a07ba1555` | `u16` little-endian |
//!
//! # Usage
//!
//! ```
//! use impterm_core::constants::*;
//!
//! assert_eq!(
//!     AUTOMATION_IO_SERVICE_UUID.to_string(),
//!     "00001815-0000-1000-8000-00805f9b34fb"
//! );
//!
//! fn pin_length_ok(len: usize) -> bool {
//!     (MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len)
//! }
//! assert!(pin_length_ok(4));
//! ```

use std::time::Duration;
use uuid::Uuid;

// ============================================================================
// GATT Attributes
// ============================================================================

/// Bluetooth SIG assigned number of the Automation IO service.
pub const AUTOMATION_IO_SERVICE_ID: u16 = 0x1815;

/// Automation IO service expanded into the Bluetooth base UUID.
///
/// # Examples
///
/// ```
/// use impterm_core::constants::{AUTOMATION_IO_SERVICE_ID, AUTOMATION_IO_SERVICE_UUID};
///
/// let short = (AUTOMATION_IO_SERVICE_UUID.as_u128() >> 96) as u16;
/// assert_eq!(short, AUTOMATION_IO_SERVICE_ID);
/// ```
pub const AUTOMATION_IO_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x0000_1815_0000_1000_8000_0080_5f9b_34fb);

/// Access PIN characteristic (write only).
pub const ACCESS_PIN_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xbf60_36dc_5b62_425e_bed4_9b7f_6ba1_c921);

/// Door-open duration characteristic (write only).
pub const DOOR_OPEN_DURATION_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0x4e3e_e180_27a0_4894_815a_c98a_07ba_1555);

// ============================================================================
// Operator Input Bounds
// ============================================================================

/// Minimum access PIN length in digits.
pub const MIN_PIN_LENGTH: usize = 4;

/// Maximum access PIN length in digits.
///
/// Matches the keypad buffer of the terminal firmware; longer writes are
/// rejected by the peripheral.
pub const MAX_PIN_LENGTH: usize = 10;

/// Minimum door-open duration in seconds.
pub const MIN_DOOR_OPEN_SECS: u16 = 1;

/// Maximum door-open duration in seconds (full `u16` range).
pub const MAX_DOOR_OPEN_SECS: u16 = u16::MAX;

/// Size of the encoded door-open duration payload.
pub const DURATION_PAYLOAD_LEN: usize = 2;

/// Factory access PIN of the terminal firmware.
///
/// Informational only. The client never reads configuration back.
pub const DEFAULT_ACCESS_PIN: &str = "1234";

/// Factory door-open duration of the terminal firmware, in seconds.
pub const DEFAULT_DOOR_OPEN_SECS: u16 = 10;

// ============================================================================
// Link Timing
// ============================================================================

/// How long a discovery scan listens for advertisements.
pub const DEFAULT_SCAN_WINDOW: Duration = Duration::from_secs(5);

/// Upper bound for discovery, including the operator's device choice.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for a single link operation (connect, service discovery, write).
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);
