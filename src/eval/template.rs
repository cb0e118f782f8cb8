use crate::foundation::core::{ValuePath, lookup};
use crate::foundation::interp::{
    Segment, has_refs, parse_segments, render_segments, scalar_to_string, sole_ref,
};
use serde_json::{Map, Value};

const REF_KEY: &str = "$ref";
const EACH_KEY: &str = "$each";
const IF_KEY: &str = "$if";
const DEFAULT_LOOP_VAR: &str = "item";

/// Template compilation or evaluation failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("template error at {at}: {message}")]
pub struct TemplateError {
    /// Location in the template (compile) or output (render).
    pub at: ValuePath,
    /// Failure detail.
    pub message: String,
}

impl TemplateError {
    fn new(at: &ValuePath, message: impl Into<String>) -> Self {
        Self {
            at: at.clone(),
            message: message.into(),
        }
    }
}

/// Compiled output template.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TemplateNode {
    Literal(Value),
    Ref(ValuePath),
    Text(Vec<Segment>),
    Object(Vec<(Vec<Segment>, TemplateNode)>),
    Array(Vec<TemplateNode>),
    Each {
        source: ValuePath,
        var: String,
        key: Option<Vec<Segment>>,
        body: Box<TemplateNode>,
    },
    If {
        cond: ValuePath,
        then: Box<TemplateNode>,
        otherwise: Option<Box<TemplateNode>>,
    },
}

pub(crate) fn compile_template(raw: &Value) -> Result<TemplateNode, TemplateError> {
    compile_node(raw, &ValuePath::root())
}

fn parse_path(v: Option<&Value>, at: &ValuePath, what: &str) -> Result<ValuePath, TemplateError> {
    v.and_then(Value::as_str)
        .and_then(ValuePath::parse)
        .ok_or_else(|| TemplateError::new(at, format!("{what} must be a reference path string")))
}

fn check_keys(map: &Map<String, Value>, allowed: &[&str], at: &ValuePath) -> Result<(), TemplateError> {
    match map.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(k) => Err(TemplateError::new(at, format!("unexpected key \"{k}\""))),
        None => Ok(()),
    }
}

fn compile_text(s: &str, at: &ValuePath) -> Result<Vec<Segment>, TemplateError> {
    parse_segments(s).map_err(|e| TemplateError::new(at, e))
}

fn compile_node(raw: &Value, at: &ValuePath) -> Result<TemplateNode, TemplateError> {
    match raw {
        Value::Object(map) if map.contains_key(REF_KEY) => {
            check_keys(map, &[REF_KEY], at)?;
            Ok(TemplateNode::Ref(parse_path(map.get(REF_KEY), at, REF_KEY)?))
        }
        Value::Object(map) if map.contains_key(EACH_KEY) => {
            check_keys(map, &[EACH_KEY, "as", "key", "template"], at)?;
            let source = parse_path(map.get(EACH_KEY), at, EACH_KEY)?;
            let var = match map.get("as") {
                None => DEFAULT_LOOP_VAR.to_string(),
                Some(Value::String(s)) if !s.is_empty() && !s.contains('.') => s.clone(),
                Some(_) => {
                    return Err(TemplateError::new(at, "\"as\" must be a plain identifier"));
                }
            };
            let key = match map.get("key") {
                None => None,
                Some(Value::String(s)) => Some(compile_text(s, &at.field("key"))?),
                Some(_) => return Err(TemplateError::new(at, "\"key\" must be a string")),
            };
            let body = map
                .get("template")
                .ok_or_else(|| TemplateError::new(at, "$each requires \"template\""))?;
            Ok(TemplateNode::Each {
                source,
                var,
                key,
                body: Box::new(compile_node(body, &at.field("template"))?),
            })
        }
        Value::Object(map) if map.contains_key(IF_KEY) => {
            check_keys(map, &[IF_KEY, "then", "else"], at)?;
            let cond = parse_path(map.get(IF_KEY), at, IF_KEY)?;
            let then = map
                .get("then")
                .ok_or_else(|| TemplateError::new(at, "$if requires \"then\""))?;
            let otherwise = match map.get("else") {
                Some(e) => Some(Box::new(compile_node(e, &at.field("else"))?)),
                None => None,
            };
            Ok(TemplateNode::If {
                cond,
                then: Box::new(compile_node(then, &at.field("then"))?),
                otherwise,
            })
        }
        Value::Object(map) => {
            let mut fields = Vec::with_capacity(map.len());
            for (k, v) in map {
                let child = at.field(k);
                fields.push((compile_text(k, &child)?, compile_node(v, &child)?));
            }
            Ok(TemplateNode::Object(fields))
        }
        Value::Array(items) => Ok(TemplateNode::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| compile_node(v, &at.index(i)))
                .collect::<Result<_, _>>()?,
        )),
        Value::String(s) => {
            let segs = compile_text(s, at)?;
            if let Some(p) = sole_ref(&segs) {
                return Ok(TemplateNode::Ref(p.clone()));
            }
            if has_refs(&segs) {
                return Ok(TemplateNode::Text(segs));
            }
            // Escapes already folded into the literal.
            let lit = render_segments(&segs, |_| Ok(String::new())).unwrap_or_default();
            Ok(TemplateNode::Literal(Value::String(lit)))
        }
        other => Ok(TemplateNode::Literal(other.clone())),
    }
}

/// Variables visible while rendering: `spec`, `context`, and loop variables (innermost first).
pub(crate) struct Scope<'a> {
    spec: &'a Value,
    context: &'a Value,
    locals: Vec<(String, Value)>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(spec: &'a Value, context: &'a Value) -> Self {
        Self {
            spec,
            context,
            locals: Vec::new(),
        }
    }

    fn resolve(&self, path: &ValuePath) -> Option<&Value> {
        let head = path.head_field()?;
        let rest = path.strip_prefix(1);
        let root = match self.locals.iter().rev().find(|(name, _)| name == head) {
            Some((_, v)) => v,
            None => match head {
                "spec" => self.spec,
                "context" => self.context,
                _ => return None,
            },
        };
        lookup(root, &rest)
    }

    fn resolve_text(&self, segs: &[Segment], at: &ValuePath) -> Result<String, TemplateError> {
        render_segments(segs, |p| match self.resolve(p) {
            Some(v) if !v.is_null() => {
                scalar_to_string(v).ok_or_else(|| format!("cannot interpolate non-scalar {p}"))
            }
            _ => Err(format!("undefined reference {p}")),
        })
        .map_err(|e| TemplateError::new(at, e))
    }

    /// Render `node`; `None` means the node was omitted by a false `$if`.
    pub(crate) fn render(
        &mut self,
        node: &TemplateNode,
        at: &ValuePath,
    ) -> Result<Option<Value>, TemplateError> {
        match node {
            TemplateNode::Literal(v) => Ok(Some(v.clone())),
            TemplateNode::Ref(p) => match self.resolve(p) {
                Some(v) if !v.is_null() => Ok(Some(v.clone())),
                _ => Err(TemplateError::new(at, format!("undefined reference {p}"))),
            },
            TemplateNode::Text(segs) => Ok(Some(Value::String(self.resolve_text(segs, at)?))),
            TemplateNode::Object(fields) => {
                let mut out = Map::with_capacity(fields.len());
                for (key, child) in fields {
                    let k = self.resolve_text(key, at)?;
                    let child_at = at.field(&k);
                    if let Some(v) = self.render(child, &child_at)? {
                        out.insert(k, v);
                    }
                }
                Ok(Some(Value::Object(out)))
            }
            TemplateNode::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, child) in items.iter().enumerate() {
                    if let Some(v) = self.render(child, &at.index(i))? {
                        out.push(v);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            TemplateNode::Each {
                source,
                var,
                key,
                body,
            } => self.render_each(source, var, key.as_deref(), body, at).map(Some),
            TemplateNode::If {
                cond,
                then,
                otherwise,
            } => {
                let truthy = matches!(self.resolve(cond), Some(v) if !v.is_null() && v != &Value::Bool(false));
                if truthy {
                    self.render(then, at)
                } else if let Some(e) = otherwise {
                    self.render(e, at)
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn render_each(
        &mut self,
        source: &ValuePath,
        var: &str,
        key: Option<&[Segment]>,
        body: &TemplateNode,
        at: &ValuePath,
    ) -> Result<Value, TemplateError> {
        // Missing collections iterate as empty so optional lists need no guard.
        let bindings: Vec<Value> = match self.resolve(source) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| serde_json::json!({ "index": i, "value": v }))
                .collect(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| serde_json::json!({ "key": k, "value": v }))
                .collect(),
            Some(_) => {
                return Err(TemplateError::new(
                    at,
                    format!("{source} is neither a list nor a map"),
                ));
            }
        };

        let mut keyed = Map::new();
        let mut listed = Vec::new();
        for (i, binding) in bindings.into_iter().enumerate() {
            self.locals.push((var.to_string(), binding));
            let res = self.render_binding(key, body, at, i);
            self.locals.pop();
            match res? {
                (Some(k), Some(v)) => {
                    if keyed.insert(k.clone(), v).is_some() {
                        return Err(TemplateError::new(at, format!("duplicate key \"{k}\"")));
                    }
                }
                (None, Some(v)) => listed.push(v),
                (_, None) => {}
            }
        }
        Ok(match key {
            Some(_) => Value::Object(keyed),
            None => Value::Array(listed),
        })
    }

    fn render_binding(
        &mut self,
        key: Option<&[Segment]>,
        body: &TemplateNode,
        at: &ValuePath,
        i: usize,
    ) -> Result<(Option<String>, Option<Value>), TemplateError> {
        match key {
            Some(segs) => {
                let k = self.resolve_text(segs, at)?;
                let v = self.render(body, &at.field(&k))?;
                Ok((Some(k), v))
            }
            None => Ok((None, self.render(body, &at.index(i))?)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/template.rs"]
mod tests;
