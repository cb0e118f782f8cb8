use crate::foundation::core::{ValuePath, lookup};
use crate::foundation::interp::{
    has_refs, parse_segments, render_segments, scalar_to_string, sole_ref,
};
use crate::module::schema::{ValidationError, ValidationKind};
use serde_json::{Map, Value};

/// Object key marking a whole-value reference: `{"$values": "web.replicas"}`.
pub(crate) const VALUES_REF_KEY: &str = "$values";

/// Substitute value references in a component spec and assert the result is concrete.
pub(crate) fn resolve_spec(
    spec: &Value,
    values: &Value,
    at: &ValuePath,
) -> Result<Value, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let out = resolve_node(spec, values, at, &mut errors);
    if errors.is_empty() {
        check_concrete(&out, at, &mut errors);
    }
    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

fn not_concrete(at: &ValuePath, detail: impl Into<String>) -> ValidationError {
    ValidationError::new(ValidationKind::NotConcrete, at.clone(), detail)
}

fn lookup_ref(
    values: &Value,
    path: &ValuePath,
    at: &ValuePath,
    errors: &mut Vec<ValidationError>,
) -> Value {
    match lookup(values, path) {
        Some(v) if !v.is_null() => v.clone(),
        _ => {
            errors.push(not_concrete(at, format!("reference to unset value {path}")));
            Value::Null
        }
    }
}

fn resolve_node(
    node: &Value,
    values: &Value,
    at: &ValuePath,
    errors: &mut Vec<ValidationError>,
) -> Value {
    match node {
        Value::Object(map) if map.len() == 1 && map.contains_key(VALUES_REF_KEY) => {
            let path = map
                .get(VALUES_REF_KEY)
                .and_then(Value::as_str)
                .and_then(ValuePath::parse);
            match path {
                Some(p) => lookup_ref(values, &p, at, errors),
                None => {
                    errors.push(not_concrete(at, "malformed $values reference"));
                    Value::Null
                }
            }
        }
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), resolve_node(v, values, &at.field(k), errors));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| resolve_node(v, values, &at.index(i), errors))
                .collect(),
        ),
        Value::String(s) => {
            let segs = match parse_segments(s) {
                Ok(segs) => segs,
                Err(e) => {
                    errors.push(not_concrete(at, e));
                    return Value::Null;
                }
            };
            if !has_refs(&segs) {
                return node.clone();
            }
            if let Some(p) = sole_ref(&segs) {
                return lookup_ref(values, p, at, errors);
            }
            let rendered = render_segments(&segs, |p| match lookup(values, p) {
                Some(v) if !v.is_null() => scalar_to_string(v)
                    .ok_or_else(|| format!("cannot interpolate non-scalar value {p}")),
                _ => Err(format!("reference to unset value {p}")),
            });
            match rendered {
                Ok(s) => Value::String(s),
                Err(e) => {
                    errors.push(not_concrete(at, e));
                    Value::Null
                }
            }
        }
        other => other.clone(),
    }
}

fn check_concrete(v: &Value, at: &ValuePath, errors: &mut Vec<ValidationError>) {
    match v {
        Value::Null => errors.push(not_concrete(at, "no value")),
        Value::Object(map) => {
            for (k, child) in map {
                check_concrete(child, &at.field(k), errors);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                check_concrete(child, &at.index(i), errors);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/release/resolve.rs"]
mod tests;
