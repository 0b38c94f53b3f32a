//! Response side: snake_case keys and unwrapped arrays of longs.

use crate::utils::{coerce_integer, snakize};
use serde_json::{Map, Value};

/// Key the deserializer uses to tag arrays of `xs:long`
pub const LONG_WRAPPER_KEY: &str = "long";

/// Normalizes one level of a decoded response.
///
/// Keys are rewritten to snake_case. A value that is a map holding only a
/// `long` list is replaced by that list with its items coerced to integers.
/// Entries are processed in input order, so a key collision after renaming
/// keeps the last value.
pub fn normalize_response(hash: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(hash.len());
    for (key, value) in hash {
        out.insert(snakize(&key), unwrap_longs(value));
    }
    out
}

// Seule la clé `long` est reconnue, quel que soit le type déclaré de l'élément
fn unwrap_longs(value: Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => match map.get(LONG_WRAPPER_KEY) {
            Some(Value::Array(items)) => {
                Value::Array(items.iter().map(coerce_integer).collect())
            }
            _ => Value::Object(map),
        },
        other => other,
    }
}
