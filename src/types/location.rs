//! Location record types: the raw shape delivered by pull/push transports and
//! the validated record the Location Store holds.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw Input
// ============================================================================

/// A location record as it arrives from a snapshot pull or a pushed update.
///
/// Every field is kept as loosely-typed JSON so the normalizer can tell a
/// missing field from an empty or mistyped one. Both snake_case and camelCase
/// field names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocationRecord {
    #[serde(default, alias = "orderCode", skip_serializing_if = "Option::is_none")]
    pub order_code: Option<serde_json::Value>,

    #[serde(default, alias = "locationCode", skip_serializing_if = "Option::is_none")]
    pub location_code: Option<serde_json::Value>,

    #[serde(default, alias = "deviceId", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<serde_json::Value>,

    #[serde(default, alias = "scannedAt", skip_serializing_if = "Option::is_none")]
    pub scanned_at: Option<serde_json::Value>,

    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<serde_json::Value>,

    /// Identifier of the scan that produced this record, when the server
    /// tracks one. Not required.
    #[serde(default, alias = "lastScanId", skip_serializing_if = "Option::is_none")]
    pub last_scan_id: Option<serde_json::Value>,
}

impl RawLocationRecord {
    /// Build a raw record from plain strings. Convenient for hosts and tests
    /// that already hold textual values.
    pub fn from_strings(
        order_code: &str,
        location_code: &str,
        device_id: &str,
        scanned_at: &str,
        updated_at: &str,
    ) -> Self {
        Self {
            order_code: Some(order_code.into()),
            location_code: Some(location_code.into()),
            device_id: Some(device_id.into()),
            scanned_at: Some(scanned_at.into()),
            updated_at: Some(updated_at.into()),
            last_scan_id: None,
        }
    }
}

impl From<&LocationRecord> for RawLocationRecord {
    fn from(record: &LocationRecord) -> Self {
        Self {
            order_code: Some(record.order_code.clone().into()),
            location_code: Some(record.location_code.clone().into()),
            device_id: Some(record.device_id.clone().into()),
            scanned_at: Some(record.scanned_at.to_rfc3339().into()),
            updated_at: Some(record.updated_at.to_rfc3339().into()),
            last_scan_id: record.last_scan_id.clone().map(Into::into),
        }
    }
}

// ============================================================================
// Validated Record
// ============================================================================

/// The latest known location of one tracked order.
///
/// `updated_at` orders the store's view and decides whether an incoming
/// record supersedes the stored one for the same `order_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Tracked part/order identifier, stable across updates.
    pub order_code: String,
    /// Current physical location.
    pub location_code: String,
    /// Scanning device that produced the record.
    pub device_id: String,
    /// Time of physical observation.
    pub scanned_at: DateTime<Utc>,
    /// Time of record creation or modification.
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan_id: Option<String>,
}

/// RFC 3339 in UTC with a `Z` suffix; sub-second digits only when present.
pub fn to_utc_iso(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
