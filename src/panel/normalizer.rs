//! Record Normalizer
//!
//! The only validation gate for incoming location data, whether it comes from
//! a snapshot pull or a pushed update. Failures are returned as a tagged
//! [`RejectedInput`]; nothing here panics or mutates panel state.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::types::{LocationRecord, RawLocationRecord};

/// Naive date-time layouts accepted in addition to RFC 3339. Interpreted as UTC.
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Why a raw record was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectedInput {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{0}' is empty")]
    EmptyField(&'static str),
    #[error("field '{0}' is not a string")]
    NotAString(&'static str),
    #[error("field '{field}' is not a valid timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

impl RejectedInput {
    /// Name of the offending field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField(f) | Self::EmptyField(f) | Self::NotAString(f) => f,
            Self::InvalidTimestamp { field, .. } => field,
        }
    }
}

/// Validate and shape one raw record.
pub fn normalize(raw: &RawLocationRecord) -> Result<LocationRecord, RejectedInput> {
    let order_code = required_str(raw.order_code.as_ref(), "order_code")?;
    let location_code = required_str(raw.location_code.as_ref(), "location_code")?;
    let device_id = required_str(raw.device_id.as_ref(), "device_id")?;
    let scanned_at = required_timestamp(raw.scanned_at.as_ref(), "scanned_at")?;
    let updated_at = required_timestamp(raw.updated_at.as_ref(), "updated_at")?;

    let last_scan_id = raw
        .last_scan_id
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(LocationRecord {
        order_code,
        location_code,
        device_id,
        scanned_at,
        updated_at,
        last_scan_id,
    })
}

/// Normalize a whole snapshot. The first rejection aborts the batch so a
/// snapshot is applied either completely or not at all.
pub fn normalize_all(raws: &[RawLocationRecord]) -> Result<Vec<LocationRecord>, (usize, RejectedInput)> {
    raws.iter()
        .enumerate()
        .map(|(index, raw)| normalize(raw).map_err(|e| (index, e)))
        .collect()
}

fn required_str(value: Option<&Value>, field: &'static str) -> Result<String, RejectedInput> {
    match value {
        None | Some(Value::Null) => Err(RejectedInput::MissingField(field)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(RejectedInput::EmptyField(field))
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(RejectedInput::NotAString(field)),
    }
}

fn required_timestamp(
    value: Option<&Value>,
    field: &'static str,
) -> Result<DateTime<Utc>, RejectedInput> {
    let invalid = |v: &Value| RejectedInput::InvalidTimestamp {
        field,
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Err(RejectedInput::MissingField(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(RejectedInput::EmptyField(field)),
        Some(v @ Value::String(s)) => parse_timestamp_str(s).ok_or_else(|| invalid(v)),
        Some(v @ Value::Number(n)) => n
            .as_f64()
            .and_then(epoch_seconds_to_utc)
            .ok_or_else(|| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}

/// Parse a JSON timestamp: a string in any accepted layout, or epoch seconds.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_f64().and_then(epoch_seconds_to_utc),
        _ => None,
    }
}

/// Parse a textual timestamp. RFC 3339 first (with `Z` or an offset), then
/// the naive layouts, which are taken as UTC.
pub fn parse_timestamp_str(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[allow(clippy::cast_possible_truncation)]
fn epoch_seconds_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}
