//! Loose accessors over command bodies and remote payloads.

use serde_json::Value;

use crate::call_result::Payload;
use crate::fault::Fault;

/// JSON truthiness: null, false, zero and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Keys present in a body; non-mapping bodies have none.
pub fn found_keys(body: &Value) -> Vec<String> {
    body.as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

pub fn field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.as_object()?.get(key)
}

pub fn has_field(body: &Value, key: &str) -> bool {
    field(body, key).is_some()
}

/// A field holding a non-empty string.
pub fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    field(body, key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// A field holding a list of strings, or `None` when it is absent or null.
pub fn string_list(body: &Value, key: &str) -> Result<Option<Vec<String>>, Fault> {
    match field(body, key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Fault::type_mismatch(format!("'{key}' entries must be of type string"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(Fault::type_mismatch(format!(
            "'{key}' value must be of type list"
        ))),
    }
}

/// Walks a payload by key path, failing with a malformed-response fault
/// naming the path when anything along it is missing.
pub fn require<'a>(payload: &'a Payload, path: &[&str]) -> Result<&'a Value, Fault> {
    let Some((first, rest)) = path.split_first() else {
        return Err(Fault::malformed("empty lookup path"));
    };
    let mut current = payload
        .get(*first)
        .ok_or_else(|| Fault::malformed(format!("response is missing '{}'", path.join("."))))?;
    for key in rest {
        current = current
            .get(*key)
            .ok_or_else(|| Fault::malformed(format!("response is missing '{}'", path.join("."))))?;
    }
    Ok(current)
}

pub fn require_str<'a>(payload: &'a Payload, path: &[&str]) -> Result<&'a str, Fault> {
    require(payload, path)?
        .as_str()
        .ok_or_else(|| Fault::malformed(format!("'{}' is not a string", path.join("."))))
}

pub fn require_object<'a>(payload: &'a Payload, path: &[&str]) -> Result<&'a Payload, Fault> {
    require(payload, path)?
        .as_object()
        .ok_or_else(|| Fault::malformed(format!("'{}' is not a mapping", path.join("."))))
}

/// The first element of a list field, as a mapping.
pub fn require_first<'a>(payload: &'a Payload, key: &str) -> Result<&'a Payload, Fault> {
    require(payload, &[key])?
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .ok_or_else(|| Fault::malformed(format!("'{key}' holds no entries")))
}
