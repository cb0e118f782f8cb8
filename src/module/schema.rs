use crate::foundation::core::ValuePath;
use crate::module::values::UnifiedValues;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Closed value-constraint tree describing the values a module accepts.
///
/// Struct schemas are closed: fields not declared are rejected.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Schema {
    /// UTF-8 string, optionally restricted to an enumeration or a regex pattern.
    String {
        /// Allowed values.
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        allowed: Option<Vec<String>>,
        /// Regex the value must match.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    /// Signed integer with optional inclusive bounds.
    Int {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// Floating-point number with optional inclusive bounds.
    Number {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Boolean.
    Bool,
    /// Closed struct with named fields.
    Struct {
        /// Declared fields.
        #[serde(default)]
        fields: BTreeMap<String, FieldSchema>,
    },
    /// Open-keyed map with uniform values.
    Map {
        /// Schema of every entry.
        values: Box<Schema>,
    },
    /// List with uniform items.
    List {
        /// Schema of every item.
        items: Box<Schema>,
    },
    /// Any value, including null.
    Any,
}

/// A struct field: its schema and whether it may be left unset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldSchema {
    /// Field value schema.
    #[serde(flatten)]
    pub schema: Schema,
    /// Optional fields may be absent after unification.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl Schema {
    /// A closed struct without fields; accepts only `{}`.
    pub fn empty_struct() -> Self {
        Self::Struct {
            fields: BTreeMap::new(),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Int { .. } => "int",
            Self::Number { .. } => "number",
            Self::Bool => "bool",
            Self::Struct { .. } => "struct",
            Self::Map { .. } => "map",
            Self::List { .. } => "list",
            Self::Any => "any",
        }
    }
}

fn value_kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "struct",
    }
}

/// Category of a [`ValidationError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// A field not declared by a closed struct schema.
    FieldNotAllowed,
    /// A value whose type or content conflicts with the schema.
    ConflictingValues,
    /// A required field left without a value.
    Incomplete,
    /// A number outside its declared bounds.
    OutOfBounds,
    /// A component spec that still references unset values after binding.
    NotConcrete,
    /// A release name or namespace that is not a valid DNS label.
    InvalidIdentity,
    /// A malformed component declaration.
    InvalidComponent,
    /// A malformed schema constraint (e.g. an invalid regex).
    InvalidSchema,
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FieldNotAllowed => "field not allowed",
            Self::ConflictingValues => "conflicting values",
            Self::Incomplete => "incomplete value",
            Self::OutOfBounds => "out of bounds",
            Self::NotConcrete => "not concrete",
            Self::InvalidIdentity => "invalid release identity",
            Self::InvalidComponent => "invalid component",
            Self::InvalidSchema => "invalid schema",
        };
        f.write_str(s)
    }
}

/// One schema violation, with user-facing path and source attribution.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
#[error(
    "{path}: {kind}{}",
    attribution(.detail, .value_origin.as_deref(), .schema_origin.as_deref())
)]
pub struct ValidationError {
    /// Violation category.
    pub kind: ValidationKind,
    /// Path relative to the user-facing value tree.
    pub path: ValuePath,
    /// Extra detail (may be empty).
    pub detail: String,
    /// Value source that supplied the offending value, when known.
    pub value_origin: Option<String>,
    /// Location of the violated schema constraint, when known.
    pub schema_origin: Option<String>,
}

impl ValidationError {
    /// Build an error without source attribution.
    pub fn new(kind: ValidationKind, path: ValuePath, detail: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            detail: detail.into(),
            value_origin: None,
            schema_origin: None,
        }
    }
}

fn attribution(detail: &str, value_origin: Option<&str>, schema_origin: Option<&str>) -> String {
    let mut out = String::new();
    if !detail.is_empty() {
        out.push_str(": ");
        out.push_str(detail);
    }
    if let Some(o) = value_origin {
        out.push_str(&format!(" (value from {o})"));
    }
    if let Some(s) = schema_origin {
        out.push_str(&format!(" (constraint at {s})"));
    }
    out
}

/// Validate unified values against `schema`, collecting every violation.
pub(crate) fn validate_values(
    schema: &Schema,
    values: &UnifiedValues,
    schema_source: Option<&str>,
) -> Vec<ValidationError> {
    let mut v = Validator {
        values,
        schema_source,
        patterns: HashMap::new(),
        errors: Vec::new(),
    };
    v.walk(schema, values.value(), &ValuePath::root());
    v.errors
}

struct Validator<'a> {
    values: &'a UnifiedValues,
    schema_source: Option<&'a str>,
    // Compiled once per pattern for the whole walk.
    patterns: HashMap<String, Result<regex::Regex, regex::Error>>,
    errors: Vec<ValidationError>,
}

impl Validator<'_> {
    fn push(&mut self, kind: ValidationKind, path: &ValuePath, detail: impl Into<String>) {
        let schema_loc = if path.is_root() {
            "schema".to_string()
        } else {
            format!("schema.{path}")
        };
        self.errors.push(ValidationError {
            kind,
            path: path.clone(),
            detail: detail.into(),
            value_origin: self.values.origin_of(path).map(str::to_string),
            schema_origin: Some(match self.schema_source {
                Some(src) => format!("{src}#{schema_loc}"),
                None => schema_loc,
            }),
        });
    }

    fn conflict(&mut self, schema: &Schema, value: &Value, path: &ValuePath) {
        self.push(
            ValidationKind::ConflictingValues,
            path,
            format!(
                "expected {}, found {}",
                schema.kind_name(),
                value_kind_name(value)
            ),
        );
    }

    fn walk(&mut self, schema: &Schema, value: &Value, path: &ValuePath) {
        if value.is_null() && !matches!(schema, Schema::Any) {
            self.push(ValidationKind::Incomplete, path, "no value set");
            return;
        }

        match schema {
            Schema::Any => {}
            Schema::Bool => {
                if !value.is_boolean() {
                    self.conflict(schema, value, path);
                }
            }
            Schema::String { allowed, pattern } => {
                let Some(s) = value.as_str() else {
                    self.conflict(schema, value, path);
                    return;
                };
                if let Some(allowed) = allowed
                    && !allowed.iter().any(|a| a == s)
                {
                    self.push(
                        ValidationKind::ConflictingValues,
                        path,
                        format!("\"{s}\" is not one of [{}]", allowed.join(", ")),
                    );
                }
                if let Some(pattern) = pattern {
                    let compiled = self
                        .patterns
                        .entry(pattern.clone())
                        .or_insert_with(|| regex::Regex::new(pattern));
                    let violation = match compiled {
                        Ok(re) if re.is_match(s) => None,
                        Ok(_) => Some((
                            ValidationKind::ConflictingValues,
                            format!("\"{s}\" does not match pattern {pattern}"),
                        )),
                        Err(e) => Some((
                            ValidationKind::InvalidSchema,
                            format!("invalid pattern {pattern}: {e}"),
                        )),
                    };
                    if let Some((kind, detail)) = violation {
                        self.push(kind, path, detail);
                    }
                }
            }
            Schema::Int { min, max } => {
                let Some(n) = value.as_i64() else {
                    self.conflict(schema, value, path);
                    return;
                };
                if let Some(min) = min
                    && n < *min
                {
                    self.push(
                        ValidationKind::OutOfBounds,
                        path,
                        format!("{n} is below minimum {min}"),
                    );
                }
                if let Some(max) = max
                    && n > *max
                {
                    self.push(
                        ValidationKind::OutOfBounds,
                        path,
                        format!("{n} is above maximum {max}"),
                    );
                }
            }
            Schema::Number { min, max } => {
                let Some(n) = value.as_f64() else {
                    self.conflict(schema, value, path);
                    return;
                };
                if let Some(min) = min
                    && n < *min
                {
                    self.push(
                        ValidationKind::OutOfBounds,
                        path,
                        format!("{n} is below minimum {min}"),
                    );
                }
                if let Some(max) = max
                    && n > *max
                {
                    self.push(
                        ValidationKind::OutOfBounds,
                        path,
                        format!("{n} is above maximum {max}"),
                    );
                }
            }
            Schema::Struct { fields } => {
                let Value::Object(map) = value else {
                    self.conflict(schema, value, path);
                    return;
                };
                for key in map.keys() {
                    if !fields.contains_key(key) {
                        self.push(ValidationKind::FieldNotAllowed, &path.field(key), "");
                    }
                }
                for (name, field) in fields {
                    match map.get(name) {
                        Some(v) => self.walk(&field.schema, v, &path.field(name)),
                        None if !field.optional => self.push(
                            ValidationKind::Incomplete,
                            &path.field(name),
                            "required field has no value",
                        ),
                        None => {}
                    }
                }
            }
            Schema::Map { values } => {
                let Value::Object(map) = value else {
                    self.conflict(schema, value, path);
                    return;
                };
                for (k, v) in map {
                    self.walk(values, v, &path.field(k));
                }
            }
            Schema::List { items } => {
                let Value::Array(list) = value else {
                    self.conflict(schema, value, path);
                    return;
                };
                for (i, v) in list.iter().enumerate() {
                    self.walk(items, v, &path.index(i));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/module/schema.rs"]
mod tests;
