use crate::execute::resource::Resource;
use serde_json::{Map, Value};

/// Output shapes a transformer may produce, recognized structurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutputShape {
    /// Object with a top-level `kind`.
    Single,
    /// Object without `kind`: each entry is a resource.
    Map,
    /// Array: each element is a resource.
    List,
}

pub(crate) fn classify(output: &Value) -> Option<OutputShape> {
    match output {
        Value::Object(map) if map.contains_key("kind") => Some(OutputShape::Single),
        Value::Object(_) => Some(OutputShape::Map),
        Value::Array(_) => Some(OutputShape::List),
        _ => None,
    }
}

/// Why an output could not be decoded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The output is neither an object nor an array.
    #[error("output is a {0}, expected a resource, a map of resources or a list of resources")]
    UnrecognizedShape(&'static str),
    /// One entry of the output is not a valid resource.
    #[error("entry {entry}: {message}")]
    InvalidEntry {
        /// Entry key (`<root>`, map key, or `[index]`).
        entry: String,
        /// Failure detail.
        message: String,
    },
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Decode a transformer output into resources. All-or-nothing: any invalid entry fails the
/// whole output. Map entries keep key order, list entries keep element order.
pub(crate) fn decode_output(
    output: Value,
    component: &str,
    transformer: &str,
) -> Result<Vec<Resource>, DecodeError> {
    let Some(shape) = classify(&output) else {
        return Err(DecodeError::UnrecognizedShape(value_kind(&output)));
    };
    let entries: Vec<(String, Value)> = match (shape, output) {
        (OutputShape::Single, v) => vec![("<root>".to_string(), v)],
        (OutputShape::Map, Value::Object(map)) => map.into_iter().collect(),
        (OutputShape::List, Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (format!("[{i}]"), v))
            .collect(),
        (_, other) => return Err(DecodeError::UnrecognizedShape(value_kind(&other))),
    };

    entries
        .into_iter()
        .map(|(entry, v)| {
            decode_entry(v)
                .map(|obj| Resource::new(obj, component, transformer))
                .map_err(|message| DecodeError::InvalidEntry { entry, message })
        })
        .collect()
}

fn decode_entry(v: Value) -> Result<Map<String, Value>, String> {
    let obj = match v {
        Value::Object(obj) => obj,
        other => return Err(format!("expected an object, found {}", value_kind(&other))),
    };
    for key in ["apiVersion", "kind"] {
        match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(_) => return Err(format!("{key} must be a non-empty string")),
            None => return Err(format!("missing {key}")),
        }
    }
    match obj.get("metadata").and_then(|m| m.get("name")) {
        Some(Value::String(s)) if !s.is_empty() => {}
        _ => return Err("metadata.name must be a non-empty string".to_string()),
    }
    if let Some(ns) = obj.get("metadata").and_then(|m| m.get("namespace"))
        && !ns.is_string()
    {
        return Err("metadata.namespace must be a string".to_string());
    }
    Ok(obj)
}

#[cfg(test)]
#[path = "../../tests/unit/execute/decode.rs"]
mod tests;
