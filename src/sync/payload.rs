//! Wire format of the upload request and the collector's acknowledgment.
//!
//! Request: form body `data=<url-encoded JSON>` where the JSON is
//! `{"entries": [EntryPayload, ...]}`. Response: `{"ok": true, "acceptedIds": [..]}`.

use crate::errors::{AppError, AppResult};
use crate::models::{Entry, EntryPayload};
use serde::Serialize;
use serde_json::Value;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

const MAX_PREVIEW_CHARS: usize = 160;

#[derive(Serialize)]
struct UploadBatch<'a> {
    entries: &'a [EntryPayload],
}

pub fn build_batch(pending: &[Entry]) -> Vec<EntryPayload> {
    pending.iter().map(Entry::payload).collect()
}

/// Encode the batch as a single-field form body.
pub fn encode_form_body(entries: &[EntryPayload]) -> AppResult<String> {
    let json = serde_json::to_string(&UploadBatch { entries })?;
    serde_urlencoded::to_string([("data", json.as_str())])
        .map_err(|e| AppError::Encode(e.to_string()))
}

pub(crate) fn preview(body: &str) -> String {
    let mut out: String = body.chars().take(MAX_PREVIEW_CHARS).collect();
    if body.chars().count() > MAX_PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

fn as_id(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Parse the acknowledgment. Anything but `{ok: true, acceptedIds: [int…]}`
/// is rejected as a whole.
pub fn parse_ack(body: &str) -> AppResult<Vec<i64>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|_| AppError::protocol(format!("non-JSON response: {}", preview(body))))?;

    if value.get("ok") != Some(&Value::Bool(true)) {
        return Err(AppError::protocol(preview(&value.to_string())));
    }

    let ids = value
        .get("acceptedIds")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::protocol(preview(&value.to_string())))?;

    ids.iter()
        .map(|v| {
            as_id(v).ok_or_else(|| {
                AppError::protocol(format!("acceptedIds contains a non-integer: {v}"))
            })
        })
        .collect()
}
