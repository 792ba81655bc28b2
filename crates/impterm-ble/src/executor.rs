//! Transaction executor.
//!
//! One transaction is a strictly sequential pipeline over a borrowed session:
//!
//! ```text
//! acquire session ─► resolve service ─► resolve characteristic ─► write ─► Success
//!        │                 │                     │                  │
//!    classified            └────── LinkError ────┘              classified
//! ```
//!
//! Session and write failures go through [`LinkError::kind`]. Any failure
//! to resolve the service or characteristic, including service discovery
//! itself, is a [`FailureKind::LinkError`] whatever its message says.
//!
//! The first failing step ends the transaction and nothing is retried.

use crate::error::{LinkError, Result};
use crate::manager::{ConnectionManager, SessionGuard, bounded, link_alive};
use crate::traits::{DevicePicker, LinkBackend, PeripheralLink};
use crate::types::GattCharacteristic;
use impterm_core::{AttributeAddress, FailureKind, TransactionOutcome};
use std::time::Duration;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Pipeline step that ended a transaction.
#[derive(Debug)]
enum StepError {
    /// Service discovery, service lookup or characteristic lookup.
    Resolve(LinkError),
    Write(LinkError),
}

/// Write `payload` to the characteristic at `address` on the session
/// provided by `manager`.
///
/// Every failure, including a failure to obtain a session, is folded into
/// the returned outcome.
pub async fn write_attribute<B: LinkBackend, K: DevicePicker>(
    manager: &ConnectionManager<B, K>,
    address: AttributeAddress,
    payload: &[u8],
) -> TransactionOutcome {
    let span = info_span!(
        "write_attribute",
        service = %address.service,
        characteristic = %address.characteristic,
        payload_len = payload.len(),
    );

    async move {
        let session = match manager.acquire_session().await {
            Ok(session) => session,
            Err(error) => return report(error),
        };

        let timeout = manager.config().operation_timeout;
        let outcome = match write_on_session(&session, address, payload, timeout).await {
            Ok(()) => {
                info!(peripheral = session.peripheral().id(), "Attribute written");
                TransactionOutcome::Success
            }
            Err(step) => {
                if !link_alive(session.peripheral(), timeout).await {
                    session.mark_link_lost();
                }
                match step {
                    StepError::Resolve(error) => report_resolution(error),
                    StepError::Write(error) => report(error),
                }
            }
        };

        manager.release_session(session);
        outcome
    }
    .instrument(span)
    .await
}

async fn write_on_session<P: PeripheralLink>(
    session: &SessionGuard<'_, P>,
    address: AttributeAddress,
    payload: &[u8],
    timeout: Duration,
) -> std::result::Result<(), StepError> {
    let peripheral = session.peripheral();

    let characteristic =
        resolve(peripheral, address, timeout).await.map_err(StepError::Resolve)?;

    debug!(peripheral = peripheral.id(), "Writing attribute");
    bounded("write", timeout, peripheral.write(&characteristic, payload))
        .await
        .map_err(StepError::Write)
}

async fn resolve<P: PeripheralLink>(
    peripheral: &P,
    address: AttributeAddress,
    timeout: Duration,
) -> Result<GattCharacteristic> {
    let services = bounded(
        "service discovery",
        timeout,
        peripheral.discover_services(),
    )
    .await?;

    let service = services
        .iter()
        .find(|s| s.uuid == address.service)
        .ok_or(LinkError::ServiceNotFound {
            service: address.service,
        })?;

    service
        .characteristic(address.characteristic)
        .copied()
        .ok_or(LinkError::CharacteristicNotFound {
            service: address.service,
            characteristic: address.characteristic,
        })
}

fn report_resolution(error: LinkError) -> TransactionOutcome {
    warn!(kind = %FailureKind::LinkError, error = %error, "Attribute resolution failed");
    TransactionOutcome::failure(FailureKind::LinkError, Some(error.to_string()))
}

fn report(error: LinkError) -> TransactionOutcome {
    let kind = error.kind();
    match kind {
        FailureKind::UserCancelled => info!(%kind, "Transaction cancelled"),
        FailureKind::NotPermitted | FailureKind::LinkError => {
            warn!(%kind, error = %error, "Transaction failed")
        }
        FailureKind::Unknown => error!(%kind, error = %error, "Transaction failed"),
    }
    error.into()
}
