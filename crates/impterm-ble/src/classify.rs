//! Classification of free-form platform diagnostics.
//!
//! Bluetooth stacks report some failures only as text (BlueZ D-Bus errors,
//! CoreBluetooth `NSError` descriptions, WinRT status strings). This module
//! folds such a message into the closed [`FailureKind`] taxonomy.
//!
//! | Message contains | Kind |
//! |------------------|------|
//! | a permission phrase | [`FailureKind::NotPermitted`] |
//! | a cancellation phrase | [`FailureKind::UserCancelled`] |
//! | anything else | [`FailureKind::LinkError`] |
//! | nothing (absent or blank) | [`FailureKind::Unknown`] |
//!
//! Permission phrases are checked first: a message such as
//! "operation cancelled: not permitted" is a permission failure.

use impterm_core::FailureKind;

/// Phrases reported when the terminal rejects a write until it is unlocked
/// or the link is authenticated.
const PERMISSION_PHRASES: &[&str] = &[
    "not permitted",
    "permission",
    "not authorized",
    "unauthorized",
    "insufficient authentication",
    "insufficient authorization",
    "insufficient encryption",
    "security",
];

/// Phrases reported when the operator dismisses a device chooser.
const CANCEL_PHRASES: &[&str] = &["cancel", "aborted by user", "user denied"];

/// Classify a platform diagnostic message.
///
/// Matching is case-insensitive and never fails.
///
/// ```
/// use impterm_ble::classify::classify_message;
/// use impterm_core::FailureKind;
///
/// assert_eq!(
///     classify_message(Some("GATT Error: Not permitted.")),
///     FailureKind::NotPermitted
/// );
/// assert_eq!(classify_message(Some("Connection lost")), FailureKind::LinkError);
/// assert_eq!(classify_message(None), FailureKind::Unknown);
/// ```
pub fn classify_message(message: Option<&str>) -> FailureKind {
    let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) else {
        return FailureKind::Unknown;
    };

    let message = message.to_lowercase();
    if PERMISSION_PHRASES.iter().any(|p| message.contains(p)) {
        FailureKind::NotPermitted
    } else if CANCEL_PHRASES.iter().any(|p| message.contains(p)) {
        FailureKind::UserCancelled
    } else {
        FailureKind::LinkError
    }
}
