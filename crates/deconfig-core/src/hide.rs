//! Redaction: removing hidden fields before a record reaches the export store.

use crate::split::split_key;
use deconfig_store::Document;
use serde_json::Value;

/// Apply a hide specification to a payload about to be exported.
///
/// `prior` is the payload currently held by the export store (or the
/// snapshot taken when the record was deleted). It is only consulted for lax
/// fields, whose previously exported value is kept instead of the new one.
///
/// A non-mapping `spec` hides the whole record.
pub fn hide(spec: &Value, mut payload: Document, prior: Option<&Document>, lax: bool) -> Document {
    let Value::Object(spec) = spec else {
        return Document::new();
    };

    for (key, child) in spec {
        let (real, key_lax) = split_key(key);
        // Scoped to this key's subtree; siblings see the caller's `lax`.
        let lax = lax || key_lax;
        let prior_value = prior
            .and_then(|prior| prior.get(real))
            .filter(|value| !value.is_null());

        match (payload.get_mut(real), child) {
            (None | Some(Value::Null), _) => {}
            (Some(Value::Object(sub)), Value::Object(_)) => {
                let hidden = hide(
                    child,
                    std::mem::take(sub),
                    prior_value.and_then(Value::as_object),
                    lax,
                );
                if hidden.is_empty() {
                    payload.shift_remove(real);
                } else {
                    *sub = hidden;
                }
            }
            // Nothing to recurse into; a same-named scalar is not ours to drop.
            (Some(_), Value::Object(_)) => {}
            (Some(current), _) => match prior_value {
                Some(previous) if lax => *current = previous.clone(),
                _ => {
                    payload.shift_remove(real);
                }
            },
        }
    }

    payload
}
