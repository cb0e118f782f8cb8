use crate::eval::template::{Scope, TemplateError, TemplateNode, compile_template};
use crate::foundation::core::ValuePath;
use crate::provider::transformer::TransformContext;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Counters describing the work one [`EvalContext`] has done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Template evaluations performed.
    pub evaluations: u64,
    /// Templates compiled.
    pub compiled: u64,
    /// Evaluations served from the compiled-template cache.
    pub cache_hits: u64,
}

#[derive(Debug)]
struct CachedTemplate {
    raw: Value,
    node: Rc<TemplateNode>,
}

/// Evaluation state for one render.
///
/// Holds the compiled-template cache shared by every transformer invocation of a render. It is
/// neither `Send` nor `Sync`: create one per render and pass it by `&mut` into
/// [`crate::MatchPlan::execute`].
#[derive(Debug, Default)]
pub struct EvalContext {
    templates: HashMap<String, CachedTemplate>,
    stats: EvalStats,
}

impl EvalContext {
    /// Fresh context with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Work counters so far.
    pub fn stats(&self) -> EvalStats {
        self.stats
    }

    // A key reused for a different template recompiles and replaces the entry.
    fn compiled(&mut self, key: &str, raw: &Value) -> Result<Rc<TemplateNode>, TemplateError> {
        if let Some(cached) = self.templates.get(key)
            && cached.raw == *raw
        {
            self.stats.cache_hits += 1;
            return Ok(cached.node.clone());
        }
        let node = Rc::new(compile_template(raw)?);
        self.stats.compiled += 1;
        self.templates.insert(
            key.to_string(),
            CachedTemplate {
                raw: raw.clone(),
                node: node.clone(),
            },
        );
        Ok(node)
    }

    /// Evaluate the template `raw` (cached under `key` while `raw` stays the same) for one component.
    ///
    /// `spec` and `ctx` are visible to the template as `spec.*` and `context.*`. A template
    /// omitted entirely by a false `$if` yields an empty map.
    pub fn render_template(
        &mut self,
        key: &str,
        raw: &Value,
        spec: &Value,
        ctx: &TransformContext,
    ) -> Result<Value, TemplateError> {
        let node = self.compiled(key, raw)?;
        self.stats.evaluations += 1;
        let root = ValuePath::root();
        let context = serde_json::to_value(ctx)
            .map_err(|e| TemplateError {
                at: root.clone(),
                message: format!("serialize context: {e}"),
            })?;
        let mut scope = Scope::new(spec, &context);
        Ok(scope
            .render(&node, &root)?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/context.rs"]
mod tests;
