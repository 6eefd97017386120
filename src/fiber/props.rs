//! Human-readable props previews
//!
//! The capture script encodes a component's props into [`PropValue`] with generous limits and
//! no cycles; every display limit is applied here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys that are structural or too noisy to preview
pub const PROPS_DENYLIST: &[&str] = &["children", "className", "class", "style"];

/// Strings longer than this are cut to `MAX_STRING_LEN - 3` characters plus `...`
pub const MAX_STRING_LEN: usize = 100;
pub const MAX_ARRAY_ITEMS: usize = 5;
pub const MAX_OBJECT_ENTRIES: usize = 10;
/// Arrays and objects nested deeper than this collapse to a placeholder
pub const MAX_DEPTH: usize = 3;
pub const MAX_PROPS_LEN: usize = 500;

const ELLIPSIS: &str = "...";

/// A props value as encoded by the page capture script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "lowercase")]
pub enum PropValue {
    Null,
    Undefined,
    Bool {
        v: bool,
    },
    Number {
        v: f64,
    },
    String {
        v: String,
    },
    Function {
        #[serde(default)]
        name: Option<String>,
    },
    /// A framework element; never expanded
    Element,
    Array {
        items: Vec<PropValue>,
        /// Length of the original array, which may exceed `items.len()`
        len: usize,
    },
    Object {
        entries: IndexMap<String, PropValue>,
        len: usize,
    },
    /// Nested past the capture script's own depth limit
    Deep,
    /// Symbols, bigints, non-finite numbers and anything else without a dedicated shape
    Other {
        repr: String,
    },
}

impl PropValue {
    pub fn string(value: impl Into<String>) -> Self {
        PropValue::String { v: value.into() }
    }

    pub fn number(value: f64) -> Self {
        PropValue::Number { v: value }
    }

    pub fn array(items: Vec<PropValue>) -> Self {
        let len = items.len();
        PropValue::Array { items, len }
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, PropValue)>) -> Self {
        let entries: IndexMap<String, PropValue> = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let len = entries.len();
        PropValue::Object { entries, len }
    }
}

/// Serialize a props object, skipping denylisted keys
///
/// Returns `None` when the value is not an object or nothing is left after filtering.
pub fn serialize_props(props: &PropValue) -> Option<String> {
    let PropValue::Object { entries, .. } = props else {
        return None;
    };

    let parts: Vec<String> = entries
        .iter()
        .filter(|(key, _)| !PROPS_DENYLIST.contains(&key.as_str()))
        .map(|(key, value)| format!("{}: {}", key, stringify(value, 0)))
        .collect();

    if parts.is_empty() {
        return None;
    }

    Some(truncate_chars(&format!("{{{}}}", parts.join(", ")), MAX_PROPS_LEN))
}

/// Render one value; `depth` counts enclosing arrays/objects below the props object
pub fn stringify(value: &PropValue, depth: usize) -> String {
    match value {
        PropValue::Null => "null".to_string(),
        PropValue::Undefined => "undefined".to_string(),
        PropValue::Bool { v } => v.to_string(),
        PropValue::Number { v } => v.to_string(),
        PropValue::String { v } => format!("\"{}\"", truncate_chars(v, MAX_STRING_LEN)),
        PropValue::Function { name: Some(name) } if !name.is_empty() => format!("[Function {}]", name),
        PropValue::Function { .. } => "[Function]".to_string(),
        PropValue::Element => "[Element]".to_string(),
        PropValue::Array { .. } | PropValue::Deep if depth > MAX_DEPTH => "[...]".to_string(),
        PropValue::Array { items, len } => {
            let mut parts: Vec<String> =
                items.iter().take(MAX_ARRAY_ITEMS).map(|item| stringify(item, depth + 1)).collect();
            let shown = parts.len();
            if *len > shown {
                parts.push(format!("+{} more", len - shown));
            }
            format!("[{}]", parts.join(", "))
        }
        PropValue::Object { .. } if depth > MAX_DEPTH => "{...}".to_string(),
        PropValue::Object { entries, len } => {
            let mut parts: Vec<String> = entries
                .iter()
                .take(MAX_OBJECT_ENTRIES)
                .map(|(key, value)| format!("{}: {}", key, stringify(value, depth + 1)))
                .collect();
            let shown = parts.len();
            if *len > shown {
                parts.push(format!("+{} more", len - shown));
            }
            format!("{{{}}}", parts.join(", "))
        }
        PropValue::Deep => "[...]".to_string(),
        PropValue::Other { repr } => truncate_chars(repr, MAX_STRING_LEN),
    }
}

/// Cut `text` to at most `max` characters, ending in `...` when cut
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
