//! Restoration: filling hidden fields from the live store on read.

use crate::split::{split_key, KEY, LAX_KEY};
use deconfig_store::Document;
use serde_json::Value;
use thiserror::Error;

/// Path reported when the whole record is hidden.
pub const RECORD_PATH: &str = "<record>";

/// A strict hidden field was found populated in an exported payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("hidden value found at {path}")]
pub struct HiddenValueFound {
    /// Dotted path of the field, or [`RECORD_PATH`].
    pub path: String,
}

impl HiddenValueFound {
    fn at(path: &[&str]) -> Self {
        let path = if path.is_empty() {
            RECORD_PATH.to_string()
        } else {
            path.join(".")
        };
        Self { path }
    }
}

/// Whether a value counts as empty for leak detection.
///
/// `null`, `false`, numeric zero, the empty string and empty collections are
/// empty; a hidden field holding one of them is not a leak.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn is_marker_only(doc: &Document) -> bool {
    doc.keys().all(|key| key == KEY || key == LAX_KEY)
}

/// Apply a hide specification to a payload read from the export store.
///
/// Hidden fields are copied from `active`, the live store's payload for the
/// same record. With `verify`, a strict hidden field that is already
/// populated in `payload` is reported instead of silently overwritten.
pub fn unhide(
    spec: &Value,
    payload: Document,
    active: Option<&Document>,
    verify: bool,
    lax: bool,
) -> Result<Document, HiddenValueFound> {
    let mut path = Vec::new();
    unhide_at(spec, payload, active, verify, lax, &mut path)
}

fn unhide_at<'s>(
    spec: &'s Value,
    mut payload: Document,
    active: Option<&Document>,
    verify: bool,
    lax: bool,
    path: &mut Vec<&'s str>,
) -> Result<Document, HiddenValueFound> {
    let Value::Object(spec) = spec else {
        // Whole record hidden.
        if verify && !lax && !is_marker_only(&payload) {
            return Err(HiddenValueFound::at(path));
        }
        if lax && active.map_or(true, is_marker_only) {
            return Ok(payload);
        }
        return Ok(active.cloned().unwrap_or_default());
    };

    for (key, child) in spec {
        let (real, key_lax) = split_key(key);
        let lax = lax || key_lax;
        path.push(real);

        if child.is_object() {
            let current = payload.get(real);
            if current.is_some_and(|value| !value.is_object() && !value.is_null()) {
                // A scalar where the spec expects a mapping is left alone.
                path.pop();
                continue;
            }

            let sub = current
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            let sub_active = active
                .and_then(|active| active.get(real))
                .and_then(Value::as_object);
            let restored = unhide_at(child, sub, sub_active, verify, lax, path)?;

            if !restored.is_empty() {
                payload.insert(real.to_string(), Value::Object(restored));
            } else if !lax {
                payload.shift_remove(real);
            }
        } else {
            if verify && !lax && payload.get(real).is_some_and(|value| !is_blank(value)) {
                return Err(HiddenValueFound::at(path));
            }
            if let Some(value) = active
                .and_then(|active| active.get(real))
                .filter(|value| !value.is_null())
            {
                payload.insert(real.to_string(), value.clone());
            }
        }

        path.pop();
    }

    Ok(payload)
}
