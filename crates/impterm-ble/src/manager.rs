//! Connection manager.
//!
//! This module provides the [`ConnectionManager`], the single owner of the
//! cached peripheral handle. Transactions borrow the handle through a
//! [`SessionGuard`]; the guard holds the manager's lock for its whole
//! lifetime, so transactions run one at a time in the order they asked for
//! a session, and the handle cannot be replaced under an in-flight write.
//!
//! # Acquiring a Session
//!
//! ```text
//! cached handle connected? ──yes──────────────────────────────► Bound
//!          │ no
//!          ▼
//! reconnect cached handle ──ok────────────────────────────────► Bound
//!          │ failed / no handle
//!          ▼
//! scan for service ─► operator picks ─► replace + connect ──ok─► Bound
//!          │               │                   │
//!          ▼               ▼                   ▼
//!      LinkError      UserCancelled        LinkError            (Unbound)
//! ```
//!
//! # Examples
//!
//! ```
//! use impterm_ble::config::LinkConfig;
//! use impterm_ble::manager::ConnectionManager;
//! use impterm_ble::mock::{MockBackend, MockPeripheral, ScriptedPicker};
//! use impterm_ble::state::SessionState;
//! use impterm_ble::traits::PeripheralLink;
//!
//! #[tokio::main]
//! async fn main() -> impterm_ble::Result<()> {
//!     let (terminal, _handle) = MockPeripheral::new("C8:2E:18:00:00:01");
//!     let backend = MockBackend::new().with_peripheral(terminal);
//!     let manager = ConnectionManager::new(backend, ScriptedPicker::select(0), LinkConfig::default());
//!
//!     let session = manager.acquire_session().await?;
//!     assert_eq!(session.peripheral().id(), "C8:2E:18:00:00:01");
//!     manager.release_session(session);
//!
//!     assert_eq!(manager.state(), SessionState::Bound);
//!     Ok(())
//! }
//! ```

use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::state::SessionState;
use crate::traits::{DevicePicker, LinkBackend, PeripheralLink};
use crate::types::{DeviceSummary, Selection};
use impterm_core::constants::AUTOMATION_IO_SERVICE_UUID;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard, watch};
use tracing::{debug, info, trace, warn};

/// Run `operation`, failing with [`LinkError::Timeout`] once `limit` elapses.
pub(crate) async fn bounded<T>(
    name: &'static str,
    limit: Duration,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation = name, limit_ms = limit.as_millis() as u64, "Link operation timed out");
            Err(LinkError::timeout(name, limit))
        }
    }
}

/// Ask whether `peripheral` is still connected. No answer within `limit`
/// counts as a lost link.
pub(crate) async fn link_alive<P: PeripheralLink>(peripheral: &P, limit: Duration) -> bool {
    bounded("connection check", limit, async {
        Ok(peripheral.is_connected().await)
    })
    .await
    .unwrap_or(false)
}

/// Owner of the single cached peripheral session.
///
/// Generic over the Bluetooth stack and the operator prompt; use
/// [`AnyBackend`](crate::devices::AnyBackend) when the stack is chosen at
/// runtime.
pub struct ConnectionManager<B: LinkBackend, K: DevicePicker> {
    backend: B,
    picker: K,
    config: LinkConfig,

    /// Cached handle. Locked for the whole lifetime of a [`SessionGuard`].
    slot: Mutex<Option<B::Peripheral>>,

    state: watch::Sender<SessionState>,
}

impl<B: LinkBackend, K: DevicePicker> ConnectionManager<B, K> {
    /// Create a manager with an empty slot.
    pub fn new(backend: B, picker: K, config: LinkConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Unbound);
        Self {
            backend,
            picker,
            config,
            slot: Mutex::new(None),
            state,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Current slot state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receive every slot state change.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Identity of the cached peripheral, if any.
    ///
    /// Waits for any in-flight transaction to release its session.
    pub async fn cached_device(&self) -> Option<DeviceSummary> {
        self.slot.lock().await.as_ref().map(PeripheralLink::summary)
    }

    /// Borrow a connected session, discovering a terminal if needed.
    ///
    /// Waits for the previous transaction to release its session first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The operator dismisses the device picker ([`LinkError::Cancelled`])
    /// - No terminal advertising the service is in range
    /// - Connecting, scanning or picking exceeds its time bound
    /// - The platform reports a failure
    ///
    /// The slot is left `Unbound` on every error and nothing is retried.
    pub async fn acquire_session(&self) -> Result<SessionGuard<'_, B::Peripheral>> {
        let mut slot = self.slot.lock().await;

        let revived = match slot.as_ref() {
            Some(cached) => self.revive(cached).await,
            None => {
                self.set_state(SessionState::Connecting);
                false
            }
        };
        if revived {
            return self.guard(slot);
        }

        let chosen = match bounded(
            "discovery",
            self.config.discovery_timeout,
            self.discover_and_pick(),
        )
        .await
        {
            Ok(chosen) => chosen,
            Err(error) => {
                match &error {
                    LinkError::Cancelled => info!("Device selection cancelled"),
                    other => warn!(error = %other, "Discovery failed"),
                }
                self.set_state(SessionState::Unbound);
                return Err(error);
            }
        };

        if let Some(previous) = slot.take() {
            self.retire(previous).await;
        }
        let peripheral = slot.insert(chosen);

        if let Err(error) = bounded(
            "connect",
            self.config.operation_timeout,
            peripheral.connect(),
        )
        .await
        {
            warn!(peripheral = peripheral.id(), error = %error, "Connection failed");
            self.set_state(SessionState::Unbound);
            return Err(error);
        }

        info!(peripheral = peripheral.id(), "Connected to terminal");
        self.set_state(SessionState::Bound);
        self.guard(slot)
    }

    /// End a transaction's borrow of the session.
    ///
    /// Equivalent to dropping the guard. The peripheral stays cached and
    /// connected for the next transaction.
    pub fn release_session(&self, session: SessionGuard<'_, B::Peripheral>) {
        trace!(peripheral = session.peripheral().id(), "Session released");
        drop(session);
    }

    /// Disconnect and forget the cached peripheral.
    ///
    /// Waits for any in-flight transaction to release its session.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform fails to disconnect within the
    /// operation timeout. The handle is forgotten either way.
    pub async fn disconnect(&self) -> Result<()> {
        let Some(peripheral) = self.slot.lock().await.take() else {
            return Ok(());
        };

        info!(peripheral = peripheral.id(), "Disconnecting from terminal");
        let result = bounded(
            "disconnect",
            self.config.operation_timeout,
            peripheral.disconnect(),
        )
        .await;
        self.set_state(SessionState::Unbound);
        result
    }

    /// Scan for terminals without touching the session slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails or exceeds the discovery timeout.
    pub async fn scan(&self) -> Result<Vec<DeviceSummary>> {
        let found = bounded(
            "scan",
            self.config.discovery_timeout,
            self.backend
                .discover(AUTOMATION_IO_SERVICE_UUID, self.config.scan_window),
        )
        .await?;
        Ok(found.iter().map(PeripheralLink::summary).collect())
    }

    /// Steps 1 and 2: reuse or reconnect the cached handle.
    async fn revive(&self, cached: &B::Peripheral) -> bool {
        if link_alive(cached, self.config.operation_timeout).await {
            debug!(peripheral = cached.id(), "Reusing connected session");
            if !self.state().is_bound() {
                self.set_state(SessionState::Connecting);
                self.set_state(SessionState::Bound);
            }
            return true;
        }

        if self.state().is_bound() {
            debug!(peripheral = cached.id(), "Cached session lost its link");
            self.set_state(SessionState::Unbound);
        }
        self.set_state(SessionState::Connecting);

        match bounded("reconnect", self.config.operation_timeout, cached.connect()).await {
            Ok(()) => {
                info!(peripheral = cached.id(), "Reconnected to cached terminal");
                self.set_state(SessionState::Bound);
                true
            }
            Err(error) => {
                warn!(peripheral = cached.id(), error = %error, "Reconnect failed, discovering");
                false
            }
        }
    }

    /// Step 2: scan for the service and let the operator choose.
    async fn discover_and_pick(&self) -> Result<B::Peripheral> {
        debug!(service = %AUTOMATION_IO_SERVICE_UUID, "Scanning for terminals");
        let candidates = self
            .backend
            .discover(AUTOMATION_IO_SERVICE_UUID, self.config.scan_window)
            .await?;

        if candidates.is_empty() {
            return Err(LinkError::NoDevicesFound {
                service: AUTOMATION_IO_SERVICE_UUID,
            });
        }

        let summaries: Vec<_> = candidates.iter().map(PeripheralLink::summary).collect();
        debug!(count = summaries.len(), "Prompting for device");

        match self.picker.choose(&summaries).await? {
            Selection::Cancelled => Err(LinkError::Cancelled),
            Selection::Device(index) => {
                let available = candidates.len();
                candidates
                    .into_iter()
                    .nth(index)
                    .ok_or(LinkError::InvalidSelection { index, available })
            }
        }
    }

    /// Disconnect a handle that is being replaced.
    async fn retire(&self, previous: B::Peripheral) {
        debug!(peripheral = previous.id(), "Replacing cached terminal");
        if let Err(error) = bounded(
            "disconnect",
            self.config.operation_timeout,
            previous.disconnect(),
        )
        .await
        {
            debug!(peripheral = previous.id(), error = %error, "Disconnect of replaced terminal failed");
        }
    }

    fn set_state(&self, next: SessionState) {
        set_state(&self.state, next);
    }

    fn guard<'a>(
        &'a self,
        slot: MutexGuard<'a, Option<B::Peripheral>>,
    ) -> Result<SessionGuard<'a, B::Peripheral>> {
        match MutexGuard::try_map(slot, Option::as_mut) {
            Ok(peripheral) => Ok(SessionGuard {
                peripheral,
                state: &self.state,
            }),
            Err(_) => {
                self.set_state(SessionState::Unbound);
                Err(LinkError::Unknown)
            }
        }
    }
}

fn set_state(state: &watch::Sender<SessionState>, next: SessionState) {
    state.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        match current.transition(next) {
            Ok(next) => {
                trace!(from = %current, to = %next, "Session state changed");
                *current = next;
                true
            }
            Err(error) => {
                warn!(error = %error, "Ignoring session state change");
                false
            }
        }
    });
}

/// A transaction's exclusive borrow of the connected session.
///
/// Holding a guard blocks every other `acquire_session`, `disconnect` and
/// `cached_device` call on the same manager.
pub struct SessionGuard<'a, P> {
    peripheral: MappedMutexGuard<'a, P>,
    state: &'a watch::Sender<SessionState>,
}

impl<P: PeripheralLink> SessionGuard<'_, P> {
    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    /// Record that the link dropped during the transaction.
    ///
    /// The handle stays cached so the next session tries to reconnect it
    /// before scanning.
    pub fn mark_link_lost(&self) {
        set_state(self.state, SessionState::Unbound);
    }
}
