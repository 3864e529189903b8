//! Separating a record into its hide specification and data payload.

use deconfig_store::Document;
use serde_json::Value;

/// Reserved key holding a strict hide specification.
pub const KEY: &str = "_deconfig";

/// Reserved key holding a lax hide specification.
pub const LAX_KEY: &str = "@_deconfig";

/// Prefix marking a specification key (and its subtree) as lax.
pub const LAX_PREFIX: char = '@';

/// Which reserved key a specification was stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Marker {
    /// `_deconfig`
    #[default]
    Strict,
    /// `@_deconfig`
    Lax,
}

impl Marker {
    /// Marker for a given laxness.
    pub fn for_lax(lax: bool) -> Self {
        if lax {
            Marker::Lax
        } else {
            Marker::Strict
        }
    }

    /// The exact key spelling.
    pub fn key(self) -> &'static str {
        match self {
            Marker::Strict => KEY,
            Marker::Lax => LAX_KEY,
        }
    }

    pub fn is_lax(self) -> bool {
        matches!(self, Marker::Lax)
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A record taken apart by [`split`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Split {
    /// The hide specification, if the record has one.
    pub spec: Option<Value>,
    /// The record without its marker key.
    pub payload: Document,
    /// Whether the specification was stored under `@_deconfig`.
    pub lax: bool,
}

impl Split {
    pub fn marker(&self) -> Marker {
        Marker::for_lax(self.lax)
    }

    /// Reassemble the record.
    pub fn join(self) -> Document {
        join(self.spec, self.payload, self.lax)
    }
}

/// Take the hide specification out of a record.
///
/// `_deconfig` wins over `@_deconfig` when both are present; the losing key
/// stays in the payload as ordinary data. A marker holding `null` is not a
/// specification.
pub fn split(mut doc: Document) -> Split {
    for marker in [Marker::Strict, Marker::Lax] {
        if doc.get(marker.key()).is_some_and(|spec| !spec.is_null()) {
            let spec = doc.shift_remove(marker.key());
            return Split {
                spec,
                payload: doc,
                lax: marker.is_lax(),
            };
        }
    }

    Split {
        spec: None,
        payload: doc,
        lax: false,
    }
}

/// Put a hide specification back in front of a payload.
pub fn join(spec: Option<Value>, payload: Document, lax: bool) -> Document {
    let Some(spec) = spec else {
        return payload;
    };

    let mut doc = Document::new();
    doc.insert(Marker::for_lax(lax).key().to_string(), spec);
    for (key, value) in payload {
        doc.insert(key, value);
    }
    doc
}

/// Strip the lax prefix from a specification key.
///
/// Returns the key as it appears in the payload and whether it was lax.
pub fn split_key(key: &str) -> (&str, bool) {
    match key.strip_prefix(LAX_PREFIX) {
        Some(real) => (real, true),
        None => (key, false),
    }
}
