//! `${path}` string interpolation shared by value references and output templates.

use crate::foundation::core::ValuePath;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Lit(String),
    Ref(ValuePath),
}

/// Split `s` into literal and `${ref}` segments. `$${` escapes a literal `${`.
pub(crate) fn parse_segments(s: &str) -> Result<Vec<Segment>, String> {
    let mut out = Vec::new();
    let mut lit = String::new();
    let mut rest = s;
    while let Some(i) = rest.find('$') {
        lit.push_str(&rest[..i]);
        let tail = &rest[i..];
        if let Some(after) = tail.strip_prefix("$${") {
            lit.push_str("${");
            rest = after;
            continue;
        }
        let Some(body) = tail.strip_prefix("${") else {
            lit.push('$');
            rest = &tail[1..];
            continue;
        };
        let close = body
            .find('}')
            .ok_or_else(|| format!("unterminated reference in \"{s}\""))?;
        let inner = body[..close].trim();
        let path = ValuePath::parse(inner)
            .ok_or_else(|| format!("invalid reference \"${{{inner}}}\" in \"{s}\""))?;
        if !lit.is_empty() {
            out.push(Segment::Lit(std::mem::take(&mut lit)));
        }
        out.push(Segment::Ref(path));
        rest = &body[close + 1..];
    }
    lit.push_str(rest);
    if !lit.is_empty() || out.is_empty() {
        out.push(Segment::Lit(lit));
    }
    Ok(out)
}

/// When the whole string is a single reference, return it so callers can substitute a typed value.
pub(crate) fn sole_ref(segs: &[Segment]) -> Option<&ValuePath> {
    match segs {
        [Segment::Ref(p)] => Some(p),
        _ => None,
    }
}

pub(crate) fn has_refs(segs: &[Segment]) -> bool {
    segs.iter().any(|s| matches!(s, Segment::Ref(_)))
}

pub(crate) fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Join segments, resolving each reference through `resolve`.
pub(crate) fn render_segments<F>(segs: &[Segment], mut resolve: F) -> Result<String, String>
where
    F: FnMut(&ValuePath) -> Result<String, String>,
{
    let mut out = String::new();
    for seg in segs {
        match seg {
            Segment::Lit(s) => out.push_str(s),
            Segment::Ref(p) => out.push_str(&resolve(p)?),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/interp.rs"]
mod tests;
