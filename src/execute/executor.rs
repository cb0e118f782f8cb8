use crate::eval::context::EvalContext;
use crate::execute::decode::{DecodeError, decode_output};
use crate::execute::resource::Resource;
use crate::foundation::core::{CancelToken, Cancelled};
use crate::matcher::plan::{Match, MatchPlan};
use crate::provider::transformer::TransformContext;
use crate::release::model::{Component, Release};

/// Why one match failed to produce resources.
#[derive(thiserror::Error, Debug)]
pub enum TransformCause {
    /// The transformer declares no generation logic.
    #[error("transformer has no generation logic")]
    MissingGenerator,
    /// The generation logic returned an error.
    #[error("generation failed: {0:#}")]
    Generate(anyhow::Error),
    /// The output could not be decoded into resources.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// A failed match, recorded while execution continues with the next one.
#[derive(thiserror::Error, Debug)]
#[error("component {component}: transformer {transformer}: {cause}")]
pub struct TransformError {
    /// Component name.
    pub component: String,
    /// Transformer FQN.
    pub transformer: String,
    /// Failure detail.
    pub cause: TransformCause,
}

pub(crate) fn transform_context(release: &Release, component: &Component) -> TransformContext {
    let meta = release.metadata();
    TransformContext {
        release_name: meta.name.clone(),
        namespace: meta.namespace.clone(),
        release_uuid: meta.uuid,
        release_labels: meta.labels.clone(),
        module_name: release.module().name.clone(),
        module_version: release.module().version.clone(),
        component_name: component.name.clone(),
        component_labels: component.labels.clone(),
        component_annotations: component.annotations.clone(),
    }
}

impl MatchPlan<'_> {
    /// Run every match in order and decode the outputs.
    ///
    /// Matches are processed one at a time with the same `eval`. Cancellation is checked before
    /// each match; once observed, execution stops and `Err(Cancelled)` is returned with no
    /// partial output. Transform failures are collected and execution continues.
    #[tracing::instrument(
        skip_all,
        fields(release = %release.metadata().name, matches = self.matches.len())
    )]
    pub fn execute(
        &self,
        eval: &mut EvalContext,
        release: &Release,
        cancel: &CancelToken,
    ) -> Result<(Vec<Resource>, Vec<TransformError>), Cancelled> {
        let mut resources = Vec::new();
        let mut errors = Vec::new();

        for m in &self.matches {
            cancel.check()?;
            let ctx = transform_context(release, m.component);
            match run_match(m, eval, &ctx) {
                Ok(mut out) => {
                    tracing::debug!(
                        component = %m.component.name,
                        transformer = %m.transformer.fqn,
                        resources = out.len(),
                        "transformer produced resources"
                    );
                    resources.append(&mut out);
                }
                Err(cause) => {
                    tracing::warn!(
                        component = %m.component.name,
                        transformer = %m.transformer.fqn,
                        error = %cause,
                        "transformer failed"
                    );
                    errors.push(TransformError {
                        component: m.component.name.clone(),
                        transformer: m.transformer.fqn.clone(),
                        cause,
                    });
                }
            }
        }

        Ok((resources, errors))
    }
}

fn run_match(
    m: &Match<'_>,
    eval: &mut EvalContext,
    ctx: &TransformContext,
) -> Result<Vec<Resource>, TransformCause> {
    let generator = m
        .transformer
        .generator
        .as_ref()
        .ok_or(TransformCause::MissingGenerator)?;
    let output = generator
        .generate(eval, &m.component.spec, ctx)
        .map_err(TransformCause::Generate)?;
    Ok(decode_output(output, &m.component.name, &m.transformer.fqn)?)
}

#[cfg(test)]
#[path = "../../tests/unit/execute/executor.rs"]
mod tests;
