use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// String key/value labels (sorted for deterministic output).
pub type Labels = BTreeMap<String, String>;

/// One step of a [`ValuePath`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathElem {
    /// Object field.
    Field(String),
    /// List index.
    Index(usize),
}

/// Path into a user-facing value tree, rendered as `a.b[0].c`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValuePath(Vec<PathElem>);

impl ValuePath {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted reference such as `web.ports[0].name`.
    ///
    /// Returns `None` for empty segments or malformed indices.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let mut elems = Vec::new();
        for seg in s.split('.') {
            let (field, mut rest) = match seg.find('[') {
                Some(i) => (&seg[..i], &seg[i..]),
                None => (seg, ""),
            };
            if field.is_empty() && (elems.is_empty() || rest.is_empty()) {
                return None;
            }
            if !field.is_empty() {
                elems.push(PathElem::Field(field.to_string()));
            }
            while !rest.is_empty() {
                let close = rest.find(']')?;
                let idx: usize = rest.get(1..close)?.parse().ok()?;
                elems.push(PathElem::Index(idx));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return None;
                }
            }
        }
        Some(Self(elems))
    }

    /// Path elements from the root.
    pub fn elems(&self) -> &[PathElem] {
        &self.0
    }

    /// Return `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a copy extended by a field step.
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.0.push(PathElem::Field(name.into()));
        out
    }

    /// Return a copy extended by an index step.
    pub fn index(&self, i: usize) -> Self {
        let mut out = self.clone();
        out.0.push(PathElem::Index(i));
        out
    }

    /// Return the path without its first `n` elements.
    pub fn strip_prefix(&self, n: usize) -> Self {
        Self(self.0.iter().skip(n).cloned().collect())
    }

    /// Return `true` when `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &ValuePath) -> bool {
        self.0.starts_with(&other.0)
    }

    /// The parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// First element when it is a field name (used for scoped lookups).
    pub fn head_field(&self) -> Option<&str> {
        match self.0.first() {
            Some(PathElem::Field(f)) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, p) in self.0.iter().enumerate() {
            match p {
                PathElem::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{name}")?;
                }
                PathElem::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// Look up `path` inside `value`.
pub fn lookup<'a>(value: &'a Value, path: &ValuePath) -> Option<&'a Value> {
    let mut cur = value;
    for p in path.elems() {
        cur = match (p, cur) {
            (PathElem::Field(name), Value::Object(map)) => map.get(name)?,
            (PathElem::Index(i), Value::Array(items)) => items.get(*i)?,
            _ => return None,
        };
    }
    Some(cur)
}

/// Return `true` when `s` is a valid RFC 1123 DNS label (lowercase, max 63 chars).
pub fn is_dns_label(s: &str) -> bool {
    if s.is_empty() || s.len() > 63 {
        return false;
    }
    let bytes = s.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) {
        return false;
    }
    bytes.iter().all(|&b| edge_ok(b) || b == b'-')
}

/// Pipeline phase, used for logging and cancellation reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Module and provider loading.
    Preparation,
    /// Release construction.
    Build,
    /// Component/transformer matching.
    Matching,
    /// Unhandled-trait warning collection.
    Warnings,
    /// Transformer execution and decoding.
    Generate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Preparation => "preparation",
            Self::Build => "build",
            Self::Matching => "matching",
            Self::Warnings => "warnings",
            Self::Generate => "generate",
        };
        f.write_str(s)
    }
}

/// Marker error returned when a [`CancelToken`] has been triggered.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cancelled")]
pub struct Cancelled;

/// Cooperative cancellation flag shared between a caller and a running render.
///
/// Cancellation is only observed at explicit check points (between phases and before each
/// match); it never interrupts a transformer mid-evaluation.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Return `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` when cancellation has been signalled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
