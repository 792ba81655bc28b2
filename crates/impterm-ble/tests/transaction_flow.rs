//! Integration tests for end-to-end configuration transactions.
//!
//! These tests drive the public submission API against the mock backend:
//! 1. Operator input → validation → encoding
//! 2. Session acquisition → discovery / reuse / reconnect
//! 3. Attribute write → outcome classification

use impterm_ble::mock::{MockBackend, MockPeripheral, MockPeripheralHandle, ScriptedPicker};
use impterm_ble::{ConfigClient, LinkConfig, LinkError, PeripheralLink, Selection, SessionState};
use impterm_core::constants::{
    ACCESS_PIN_CHARACTERISTIC_UUID, DOOR_OPEN_DURATION_CHARACTERISTIC_UUID,
};
use impterm_core::{FailureKind, TransactionOutcome, ValidationError};
use std::time::Duration;

// ============================================================================
// Helpers
// ============================================================================

type MockClient = ConfigClient<MockBackend, ScriptedPicker>;

struct Fixture {
    client: MockClient,
    backend: MockBackend,
    picker: ScriptedPicker,
    terminal: MockPeripheralHandle,
}

/// One terminal in range, operator always picks it.
fn single_terminal() -> Fixture {
    with_picker(ScriptedPicker::select(0))
}

fn with_picker(picker: ScriptedPicker) -> Fixture {
    let (peripheral, terminal) = MockPeripheral::new("C8:2E:18:00:00:01");
    let backend = MockBackend::new().with_peripheral(peripheral.with_rssi(-58));
    let client = ConfigClient::new(backend.clone(), picker.clone(), LinkConfig::default());
    Fixture {
        client,
        backend,
        picker,
        terminal,
    }
}

// ============================================================================
// Submissions
// ============================================================================

#[tokio::test]
async fn test_pin_on_bound_terminal() {
    let f = single_terminal();
    let session = f.client.manager().acquire_session().await.unwrap();
    f.client.manager().release_session(session);
    assert_eq!(f.client.state(), SessionState::Bound);

    let outcome = f.client.submit_pin("4321", "4321").await.unwrap();

    assert_eq!(outcome, TransactionOutcome::Success);
    let writes = f.terminal.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].characteristic, ACCESS_PIN_CHARACTERISTIC_UUID);
    assert_eq!(writes[0].payload, vec![52, 51, 50, 49]);
    // Bound session reused: no second scan or prompt
    assert_eq!(f.backend.scan_count(), 1);
    assert_eq!(f.picker.calls(), 1);
}

#[tokio::test]
async fn test_duration_is_little_endian() {
    let f = single_terminal();

    let outcome = f.client.submit_duration(1234).await.unwrap();

    assert!(outcome.is_success());
    let writes = f.terminal.writes();
    assert_eq!(writes[0].characteristic, DOOR_OPEN_DURATION_CHARACTERISTIC_UUID);
    assert_eq!(writes[0].payload, vec![210, 4]);
}

#[tokio::test]
async fn test_duration_with_cancelled_discovery() {
    let f = with_picker(ScriptedPicker::cancel());

    let outcome = f.client.submit_duration(10).await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::UserCancelled));
    assert!(!FailureKind::UserCancelled.is_error());
    assert_eq!(f.client.state(), SessionState::Unbound);
    assert!(f.client.manager().cached_device().await.is_none());
    assert!(f.terminal.writes().is_empty());
    assert_eq!(f.terminal.connect_count(), 0);
}

#[tokio::test]
async fn test_cancel_is_not_retried() {
    let f = with_picker(ScriptedPicker::sequence([
        Selection::Cancelled,
        Selection::Device(0),
    ]));

    let outcome = f.client.submit_pin("1234", "1234").await.unwrap();
    assert_eq!(outcome.failure_kind(), Some(FailureKind::UserCancelled));
    assert_eq!(f.picker.calls(), 1);

    // The operator resubmits
    let outcome = f.client.submit_pin("1234", "1234").await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(f.picker.calls(), 2);
}

#[tokio::test]
async fn test_pin_mismatch_does_no_io() {
    let f = single_terminal();

    let result = f.client.submit_pin("4321", "4322").await;

    assert_eq!(result, Err(ValidationError::PinMismatch));
    assert_eq!(f.backend.scan_count(), 0);
    assert_eq!(f.picker.calls(), 0);
    assert_eq!(f.terminal.connect_count(), 0);
}

#[tokio::test]
async fn test_invalid_pin_does_no_io() {
    let f = single_terminal();

    let result = f.client.submit_pin("12345678901", "12345678901").await;

    assert_eq!(result, Err(ValidationError::InvalidPin { length: 11 }));
    assert_eq!(f.backend.scan_count(), 0);
}

// ============================================================================
// Failure Classification
// ============================================================================

#[tokio::test]
async fn test_locked_terminal_rejects_write() {
    let f = single_terminal();
    f.terminal.fail_writes(Some(LinkError::communication(
        "GATT Error: Not permitted.",
    )));

    let outcome = f.client.submit_pin("4321", "4321").await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::NotPermitted));
    assert_eq!(
        outcome.user_message(),
        "The terminal refused the change. Unlock the terminal and try again"
    );
    assert!(f.terminal.writes().is_empty());
}

#[tokio::test]
async fn test_discovery_failure_with_cancel_message() {
    let f = single_terminal();
    f.backend.fail_scans(Some(LinkError::communication(
        "User cancelled the requestDevice() chooser.",
    )));

    let outcome = f.client.submit_duration(10).await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::UserCancelled));
    assert_eq!(f.client.state(), SessionState::Unbound);
}

#[tokio::test]
async fn test_nothing_in_range() {
    let client = ConfigClient::new(
        MockBackend::new(),
        ScriptedPicker::select(0),
        LinkConfig::default(),
    );

    let outcome = client.submit_duration(10).await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::LinkError));
    assert!(outcome.failure_kind().unwrap().is_retryable());
}

#[tokio::test]
async fn test_connect_failure_is_link_error() {
    let f = single_terminal();
    f.terminal
        .fail_connect(Some(LinkError::communication("Page timeout")));

    let outcome = f.client.submit_duration(10).await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::LinkError));
    assert_eq!(f.client.state(), SessionState::Unbound);
}

#[tokio::test]
async fn test_platform_error_without_message() {
    let f = single_terminal();
    f.terminal.fail_writes(Some(LinkError::Unknown));

    let outcome = f.client.submit_duration(10).await.unwrap();

    assert_eq!(
        outcome,
        TransactionOutcome::failure(FailureKind::Unknown, None)
    );
}

// ============================================================================
// Session Lifecycle
// ============================================================================

#[tokio::test]
async fn test_cached_terminal_is_reconnected() {
    let f = single_terminal();
    assert!(f.client.submit_duration(10).await.unwrap().is_success());

    f.terminal.drop_link();
    let outcome = f.client.submit_duration(20).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(f.terminal.connect_count(), 2);
    assert_eq!(f.backend.scan_count(), 1);
    assert_eq!(f.picker.calls(), 1);
    assert_eq!(f.terminal.writes()[1].payload, vec![20, 0]);
}

#[tokio::test]
async fn test_replacement_disconnects_previous_terminal() {
    let (first, first_handle) = MockPeripheral::new("C8:2E:18:00:00:01");
    let (second, second_handle) = MockPeripheral::new("C8:2E:18:00:00:02");
    let backend = MockBackend::new()
        .with_peripheral(first)
        .with_peripheral(second);
    let picker = ScriptedPicker::sequence([Selection::Device(0), Selection::Device(1)]);
    let client = ConfigClient::new(backend.clone(), picker, LinkConfig::default());

    assert!(client.submit_duration(10).await.unwrap().is_success());

    // First terminal goes out of range and cannot be reconnected
    first_handle.drop_link();
    first_handle.fail_connect(Some(LinkError::communication("Page timeout")));

    let outcome = client.submit_duration(15).await.unwrap();

    assert!(outcome.is_success());
    assert_eq!(backend.scan_count(), 2);
    assert_eq!(first_handle.disconnect_count(), 1);
    assert_eq!(second_handle.writes()[0].payload, vec![15, 0]);
    assert_eq!(
        client.manager().cached_device().await.map(|d| d.id),
        Some("C8:2E:18:00:00:02".to_string())
    );
}

#[tokio::test]
async fn test_cancel_keeps_previous_handle_for_reconnect() {
    let (peripheral, terminal) = MockPeripheral::new("C8:2E:18:00:00:01");
    let backend = MockBackend::new().with_peripheral(peripheral);
    let picker = ScriptedPicker::sequence([Selection::Device(0), Selection::Cancelled]);
    let client = ConfigClient::new(backend, picker, LinkConfig::default());

    assert!(client.submit_duration(10).await.unwrap().is_success());

    terminal.drop_link();
    terminal.fail_connect(Some(LinkError::communication("Page timeout")));
    let outcome = client.submit_duration(10).await.unwrap();
    assert_eq!(outcome.failure_kind(), Some(FailureKind::UserCancelled));
    assert_eq!(client.state(), SessionState::Unbound);

    // Terminal back in range: the cached handle is reconnected without a prompt
    terminal.fail_connect(None);
    let outcome = client.submit_duration(10).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(client.state(), SessionState::Bound);
}

#[tokio::test]
async fn test_shutdown_disconnects() {
    let f = single_terminal();
    assert!(f.client.submit_duration(10).await.unwrap().is_success());

    f.client.shutdown().await.unwrap();

    assert!(!f.terminal.is_connected());
    assert_eq!(f.client.state(), SessionState::Unbound);
}

#[tokio::test]
async fn test_scan_lists_terminals() {
    let f = single_terminal();

    let found = f.client.scan().await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name.as_deref(), Some("IMP Terminal"));
    assert_eq!(found[0].rssi, Some(-58));
    assert_eq!(f.client.state(), SessionState::Unbound);
}

// ============================================================================
// Concurrency and Timeouts
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_submissions_are_serialized() {
    let f = single_terminal();
    f.terminal.set_latency(Duration::from_millis(500));

    let (pin, duration) = tokio::join!(
        f.client.submit_pin("4321", "4321"),
        f.client.submit_duration(30),
    );

    assert!(pin.unwrap().is_success());
    assert!(duration.unwrap().is_success());

    // One discovery shared by both, writes in submission order
    assert_eq!(f.backend.scan_count(), 1);
    assert_eq!(f.picker.calls(), 1);
    assert_eq!(f.terminal.connect_count(), 1);
    let writes = f.terminal.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].characteristic, ACCESS_PIN_CHARACTERISTIC_UUID);
    assert_eq!(writes[1].characteristic, DOOR_OPEN_DURATION_CHARACTERISTIC_UUID);
}

#[tokio::test(start_paused = true)]
async fn test_hung_connect_times_out() {
    let f = single_terminal();
    f.terminal.set_latency(Duration::from_secs(300));

    let outcome = f.client.submit_duration(10).await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::LinkError));
    let TransactionOutcome::Failure {
        message: Some(message),
        ..
    } = outcome
    else {
        panic!("expected a failure with a message");
    };
    assert_eq!(message, "connect timed out after 10000ms");
    assert_eq!(f.client.state(), SessionState::Unbound);
}

#[tokio::test(start_paused = true)]
async fn test_idle_picker_times_out() {
    let f = with_picker(ScriptedPicker::select(0).with_delay(Duration::from_secs(600)));

    let outcome = f.client.submit_pin("1234", "1234").await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(FailureKind::LinkError));
    assert_eq!(f.client.state(), SessionState::Unbound);
    assert_eq!(f.terminal.connect_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_operation_timeout() {
    let (peripheral, terminal) = MockPeripheral::new("C8:2E:18:00:00:01");
    let config = LinkConfig {
        operation_timeout: Duration::from_secs(2),
        ..LinkConfig::default()
    };
    let client = ConfigClient::new(
        MockBackend::new().with_peripheral(peripheral),
        ScriptedPicker::select(0),
        config,
    );
    terminal.set_latency(Duration::from_secs(3));

    let outcome = client.submit_duration(10).await.unwrap();
    assert_eq!(outcome.failure_kind(), Some(FailureKind::LinkError));

    terminal.set_latency(Duration::from_secs(1));
    let outcome = client.submit_duration(10).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(
        client.manager().cached_device().await.map(|d| d.id),
        Some("C8:2E:18:00:00:01".to_string())
    );
}

#[tokio::test]
async fn test_session_peripheral_identity() {
    let f = single_terminal();
    let session = f.client.manager().acquire_session().await.unwrap();
    assert_eq!(session.peripheral().id(), "C8:2E:18:00:00:01");
}
