//! Bluetooth LE link layer for configuring IMP access terminals.
//!
//! This crate turns a validated configuration change into a GATT write on a
//! terminal: it discovers and caches the peripheral, negotiates a session,
//! performs the write and folds every failure into a
//! [`TransactionOutcome`](impterm_core::TransactionOutcome).
//!
//! # Layers
//!
//! ```text
//! ConfigClient::submit_pin / submit_duration      validate, encode
//!        │
//!        ▼
//! executor::write_attribute                       service → characteristic → write
//!        │
//!        ▼
//! ConnectionManager::acquire_session              single cached peripheral
//!        │
//!        ▼
//! LinkBackend / PeripheralLink                    btleplug or mock
//! ```
//!
//! # Design Philosophy
//!
//! - **Async-first**: All link operations are asynchronous using native
//!   `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Serialized**: The connection manager lends its session to one
//!   transaction at a time; concurrent submissions queue in order.
//! - **Bounded**: Every suspension point runs under a timeout from
//!   [`LinkConfig`].
//! - **Classified once**: Platform errors become a [`LinkError`] at the
//!   backend boundary, and each [`LinkError`] maps to exactly one
//!   [`FailureKind`](impterm_core::FailureKind).
//!
//! # Example
//!
//! ```
//! use impterm_ble::{ConfigClient, LinkConfig};
//! use impterm_ble::mock::{MockBackend, MockPeripheral, ScriptedPicker};
//! use impterm_core::FailureKind;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Nothing in range and the operator dismisses the picker
//!     let client = ConfigClient::new(MockBackend::new(), ScriptedPicker::cancel(), LinkConfig::default());
//!     let outcome = client.submit_duration(10).await.unwrap();
//!     assert_eq!(outcome.failure_kind(), Some(FailureKind::LinkError));
//!
//!     let (terminal, _handle) = MockPeripheral::new("C8:2E:18:00:00:01");
//!     let client = ConfigClient::new(
//!         MockBackend::new().with_peripheral(terminal),
//!         ScriptedPicker::cancel(),
//!         LinkConfig::default(),
//!     );
//!     let outcome = client.submit_duration(10).await.unwrap();
//!     assert_eq!(outcome.failure_kind(), Some(FailureKind::UserCancelled));
//! }
//! ```
//!
//! # Feature Flags
//!
//! - `btleplug` (default): the [`platform`] backend for the host adapter.
//!   Without it only the [`mock`] backend is available.

pub mod classify;
pub mod client;
pub mod config;
pub mod devices;
pub mod error;
pub mod executor;
pub mod manager;
pub mod mock;
#[cfg(feature = "btleplug")]
pub mod platform;
pub mod state;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use client::ConfigClient;
pub use config::LinkConfig;
pub use devices::{AnyBackend, AnyPeripheral};
pub use error::{LinkError, Result};
pub use manager::{ConnectionManager, SessionGuard};
pub use state::SessionState;
pub use traits::{DevicePicker, LinkBackend, PeripheralLink};
pub use types::{DeviceSummary, GattCharacteristic, GattService, Selection};
