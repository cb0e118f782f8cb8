use crate::foundation::core::ValuePath;
use crate::foundation::error::LoadError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// One layer of user-supplied values, tagged with where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueSource {
    /// Display name of the source (usually a file path).
    pub origin: String,
    /// Value tree.
    pub value: Value,
}

impl ValueSource {
    /// Build an in-memory value source.
    pub fn new(origin: impl Into<String>, value: Value) -> Self {
        Self {
            origin: origin.into(),
            value,
        }
    }

    /// Load a JSON or YAML (by extension) values file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LoadError::new(&origin, format!("read values: {e}")))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let value: Value = if is_yaml {
            serde_yaml::from_str(&text)
                .map_err(|e| LoadError::new(&origin, format!("parse values YAML: {e}")))?
        } else {
            serde_json::from_str(&text)
                .map_err(|e| LoadError::new(&origin, format!("parse values JSON: {e}")))?
        };
        if !value.is_object() && !value.is_null() {
            return Err(LoadError::new(&origin, "values must be a mapping at the top level"));
        }
        Ok(Self { origin, value })
    }
}

/// Values after unifying every layer, with per-path origin tracking.
#[derive(Clone, Debug, Default)]
pub(crate) struct UnifiedValues {
    value: Value,
    origins: BTreeMap<ValuePath, String>,
}

impl UnifiedValues {
    pub(crate) fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn into_value(self) -> Value {
        self.value
    }

    /// Origin of the layer that last set `path` (or its closest set ancestor).
    pub(crate) fn origin_of(&self, path: &ValuePath) -> Option<&str> {
        let mut cur = Some(path.clone());
        while let Some(p) = cur {
            if let Some(o) = self.origins.get(&p) {
                return Some(o);
            }
            cur = p.parent();
        }
        None
    }
}

/// Unify layers in order. Objects merge recursively; any other later value replaces the earlier
/// one. `null` in a later layer leaves the earlier value untouched.
pub(crate) fn unify(layers: &[ValueSource]) -> UnifiedValues {
    let mut out = UnifiedValues {
        value: Value::Object(Map::new()),
        origins: BTreeMap::new(),
    };
    for layer in layers {
        if layer.value.is_null() {
            continue;
        }
        merge_into(
            &mut out.value,
            &layer.value,
            &ValuePath::root(),
            &layer.origin,
            &mut out.origins,
        );
    }
    out
}

fn merge_into(
    dst: &mut Value,
    src: &Value,
    path: &ValuePath,
    origin: &str,
    origins: &mut BTreeMap<ValuePath, String>,
) {
    match (dst, src) {
        (Value::Object(d), Value::Object(s)) => {
            for (k, sv) in s {
                if sv.is_null() {
                    continue;
                }
                let child = path.field(k);
                match d.get_mut(k) {
                    Some(dv) => merge_into(dv, sv, &child, origin, origins),
                    None => {
                        d.insert(k.clone(), without_nulls(sv));
                        origins.insert(child, origin.to_string());
                    }
                }
            }
        }
        (dst, src) => {
            *dst = without_nulls(src);
            origins.retain(|p, _| !p.starts_with(path) || p == path);
            origins.insert(path.clone(), origin.to_string());
        }
    }
}

/// Copy of `v` with null object members removed at every depth.
fn without_nulls(v: &Value) -> Value {
    match v {
        Value::Object(m) => Value::Object(
            m.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_nulls).collect()),
        other => other.clone(),
    }
}

/// Deep-merge `src` over `dst` without origin tracking (used for component spec defaults).
pub(crate) fn deep_merge(dst: &mut Value, src: &Value) {
    match (dst, src) {
        (Value::Object(d), Value::Object(s)) => {
            for (k, sv) in s {
                match d.get_mut(k) {
                    Some(dv) => deep_merge(dv, sv),
                    None => {
                        d.insert(k.clone(), sv.clone());
                    }
                }
            }
        }
        (dst, src) => {
            if !src.is_null() {
                *dst = src.clone();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/module/values.rs"]
mod tests;
