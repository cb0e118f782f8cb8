use crate::eval::context::EvalContext;
use crate::foundation::core::Labels;
use crate::provider::predicate::{FnPredicate, MatchPredicate};
use crate::release::model::ComponentDescriptor;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Everything a transformer learns about the release and component it runs for.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformContext {
    /// Release name.
    pub release_name: String,
    /// Release namespace.
    pub namespace: String,
    /// Release identity.
    pub release_uuid: Uuid,
    /// Release labels.
    pub release_labels: Labels,
    /// Module name.
    pub module_name: String,
    /// Module version.
    pub module_version: String,
    /// Component name.
    pub component_name: String,
    /// Component labels.
    pub component_labels: Labels,
    /// Component annotations.
    pub component_annotations: Labels,
}

/// Generation logic of a transformer: component spec and context in, output tree out.
///
/// Implementations must be pure functions of their inputs.
pub trait Generate: Send + Sync {
    /// Produce the output tree for one component.
    fn generate(
        &self,
        eval: &mut EvalContext,
        spec: &Value,
        ctx: &TransformContext,
    ) -> anyhow::Result<Value>;
}

/// Adapter turning a closure into a [`Generate`] implementation.
pub struct FnGenerator<F>(pub F);

impl<F> Generate for FnGenerator<F>
where
    F: Fn(&Value, &TransformContext) -> anyhow::Result<Value> + Send + Sync,
{
    fn generate(
        &self,
        _eval: &mut EvalContext,
        spec: &Value,
        ctx: &TransformContext,
    ) -> anyhow::Result<Value> {
        (self.0)(spec, ctx)
    }
}

/// Generator backed by a JSON output template (see [`EvalContext::render_template`]).
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateGenerator {
    key: String,
    template: Value,
}

impl TemplateGenerator {
    /// Template cached under `key` (normally the transformer FQN).
    pub fn new(key: impl Into<String>, template: Value) -> Self {
        Self {
            key: key.into(),
            template,
        }
    }
}

impl Generate for TemplateGenerator {
    fn generate(
        &self,
        eval: &mut EvalContext,
        spec: &Value,
        ctx: &TransformContext,
    ) -> anyhow::Result<Value> {
        Ok(eval.render_template(&self.key, &self.template, spec, ctx)?)
    }
}

/// How a transformer decides whether it applies to a component.
#[derive(Clone)]
pub enum MatchStrategy {
    /// Subset checks over required labels, resources and traits.
    Structural,
    /// A custom predicate over the component descriptor.
    Predicate(Arc<dyn MatchPredicate>),
}

impl fmt::Debug for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural => f.write_str("Structural"),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A pluggable generation rule.
#[derive(Clone)]
pub struct Transformer {
    /// Fully-qualified transformer name.
    pub fqn: String,
    /// Optional description.
    pub description: Option<String>,
    /// Labels the component must carry with identical values.
    pub required_labels: Labels,
    /// Resource capabilities the component must declare.
    pub required_resources: BTreeSet<String>,
    /// Trait capabilities the component must declare.
    pub required_traits: BTreeSet<String>,
    /// Traits handled when present but not required.
    pub optional_traits: BTreeSet<String>,
    /// Structural or predicate matching.
    pub strategy: MatchStrategy,
    /// Generation logic; `None` fails at execution time.
    pub generator: Option<Arc<dyn Generate>>,
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transformer")
            .field("fqn", &self.fqn)
            .field("required_labels", &self.required_labels)
            .field("required_resources", &self.required_resources)
            .field("required_traits", &self.required_traits)
            .field("optional_traits", &self.optional_traits)
            .field("strategy", &self.strategy)
            .field("has_generator", &self.generator.is_some())
            .finish()
    }
}

impl Transformer {
    /// A structural transformer with no requirements and no generator.
    pub fn new(fqn: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            description: None,
            required_labels: Labels::new(),
            required_resources: BTreeSet::new(),
            required_traits: BTreeSet::new(),
            optional_traits: BTreeSet::new(),
            strategy: MatchStrategy::Structural,
            generator: None,
        }
    }

    /// Require a label with an exact value.
    pub fn require_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_labels.insert(key.into(), value.into());
        self
    }

    /// Require a resource capability.
    pub fn require_resource(mut self, fqn: impl Into<String>) -> Self {
        self.required_resources.insert(fqn.into());
        self
    }

    /// Require a trait capability.
    pub fn require_trait(mut self, fqn: impl Into<String>) -> Self {
        self.required_traits.insert(fqn.into());
        self
    }

    /// Declare a trait as handled without requiring it.
    pub fn optional_trait(mut self, fqn: impl Into<String>) -> Self {
        self.optional_traits.insert(fqn.into());
        self
    }

    /// Match with `predicate` instead of the structural checks.
    pub fn with_predicate(mut self, predicate: impl MatchPredicate + 'static) -> Self {
        self.strategy = MatchStrategy::Predicate(Arc::new(predicate));
        self
    }

    /// Match with a closure predicate.
    pub fn with_predicate_fn<F>(self, f: F) -> Self
    where
        F: Fn(&ComponentDescriptor<'_>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.with_predicate(FnPredicate(f))
    }

    /// Use `generator` as generation logic.
    pub fn with_generator(mut self, generator: impl Generate + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Use a closure as generation logic.
    pub fn with_generator_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &TransformContext) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.with_generator(FnGenerator(f))
    }

    /// Return `true` when the transformer requires or optionally handles trait `fqn`.
    pub fn handles_trait(&self, fqn: &str) -> bool {
        self.required_traits.contains(fqn) || self.optional_traits.contains(fqn)
    }
}

/// A named, versioned set of transformers.
#[derive(Clone, Debug)]
pub struct Provider {
    /// Provider name.
    pub name: String,
    /// Optional provider version.
    pub version: Option<String>,
    /// Transformers in declaration order.
    pub transformers: Vec<Transformer>,
}

impl Provider {
    /// Empty provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            transformers: Vec::new(),
        }
    }

    /// Append a transformer.
    pub fn with_transformer(mut self, t: Transformer) -> Self {
        self.transformers.push(t);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/transformer.rs"]
mod tests;
