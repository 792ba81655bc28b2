//! Mock link implementations for testing and development.
//!
//! This module provides a simulated Bluetooth stack, terminal and device
//! picker that can be controlled programmatically without requiring a
//! physical adapter.

pub mod backend;
pub mod peripheral;
pub mod picker;

// Re-export commonly used types
pub use backend::MockBackend;
pub use peripheral::{MockPeripheral, MockPeripheralHandle, RecordedWrite};
pub use picker::ScriptedPicker;
