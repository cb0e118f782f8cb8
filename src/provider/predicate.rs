use crate::release::model::ComponentDescriptor;
use anyhow::Context as _;

/// Custom match predicate over a read-only component descriptor.
///
/// An `Err` is treated as a non-match by the matcher, with the error recorded as the reason.
pub trait MatchPredicate: Send + Sync {
    /// Decide whether the transformer applies to `component`.
    fn evaluate(&self, component: &ComponentDescriptor<'_>) -> anyhow::Result<bool>;

    /// Short description used in match reasons.
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

/// Adapter turning a closure into a [`MatchPredicate`].
pub struct FnPredicate<F>(pub F);

impl<F> MatchPredicate for FnPredicate<F>
where
    F: Fn(&ComponentDescriptor<'_>) -> anyhow::Result<bool> + Send + Sync,
{
    fn evaluate(&self, component: &ComponentDescriptor<'_>) -> anyhow::Result<bool> {
        (self.0)(component)
    }
}

/// Declarative predicate expression, as written in provider files.
///
/// ```json
/// { "all": [ { "hasResource": "platen.dev/resources/workload@v0#Container" },
///            { "not": { "labelEquals": { "key": "tier", "value": "batch" } } } ] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PredicateExpr {
    /// Every sub-expression holds (vacuously true when empty).
    All(Vec<PredicateExpr>),
    /// At least one sub-expression holds.
    Any(Vec<PredicateExpr>),
    /// Negation.
    Not(Box<PredicateExpr>),
    /// The component carries label key.
    HasLabel(String),
    /// The component carries label key with exactly this value.
    LabelEquals {
        /// Label key.
        key: String,
        /// Expected value.
        value: String,
    },
    /// The label value matches a regex; fails when the label is absent.
    LabelMatches {
        /// Label key.
        key: String,
        /// Regex pattern.
        pattern: String,
    },
    /// The component declares resource capability.
    HasResource(String),
    /// The component declares trait capability.
    HasTrait(String),
    /// The component name matches a regex.
    NameMatches(String),
}

fn compile_regex(pattern: &str) -> anyhow::Result<regex::Regex> {
    regex::Regex::new(pattern).with_context(|| format!("invalid pattern {pattern}"))
}

impl PredicateExpr {
    fn eval(&self, c: &ComponentDescriptor<'_>) -> anyhow::Result<bool> {
        Ok(match self {
            Self::All(items) => {
                for item in items {
                    if !item.eval(c)? {
                        return Ok(false);
                    }
                }
                true
            }
            Self::Any(items) => {
                for item in items {
                    if item.eval(c)? {
                        return Ok(true);
                    }
                }
                false
            }
            Self::Not(inner) => !inner.eval(c)?,
            Self::HasLabel(key) => c.labels().contains_key(key),
            Self::LabelEquals { key, value } => c.labels().get(key) == Some(value),
            Self::LabelMatches { key, pattern } => {
                let label = c
                    .labels()
                    .get(key)
                    .with_context(|| format!("label {key} is not set"))?;
                compile_regex(pattern)?.is_match(label)
            }
            Self::HasResource(fqn) => c.has_resource(fqn),
            Self::HasTrait(fqn) => c.has_trait(fqn),
            Self::NameMatches(pattern) => compile_regex(pattern)?.is_match(c.name()),
        })
    }
}

impl MatchPredicate for PredicateExpr {
    fn evaluate(&self, component: &ComponentDescriptor<'_>) -> anyhow::Result<bool> {
        self.eval(component)
    }

    fn describe(&self) -> String {
        "predicate expression".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/predicate.rs"]
mod tests;
