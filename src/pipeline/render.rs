use crate::eval::context::EvalContext;
use crate::execute::executor::TransformError;
use crate::execute::resource::Resource;
use crate::foundation::core::{CancelToken, Phase};
use crate::foundation::error::{PlatenError, PlatenResult};
use crate::matcher::matching::match_components;
use crate::matcher::plan::MatchSummary;
use crate::matcher::warnings::{UnhandledTrait, collect_unhandled};
use crate::module::loader::ModuleLoader;
use crate::module::model::{Module, ModuleMetadata};
use crate::module::values::ValueSource;
use crate::pipeline::order::sort_resources;
use crate::provider::loader::ProviderLoader;
use crate::provider::transformer::Provider;
use crate::release::builder::build_release;
use crate::release::model::ReleaseMetadata;

/// Options controlling pipeline behavior.
#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    /// Promote unhandled-trait warnings to errors.
    pub strict: bool,
}

/// Inputs of one render, resolved by the caller (e.g. from CLI flags).
#[derive(Clone, Debug, Default)]
pub struct RenderRequest {
    /// Module location handed to the [`ModuleLoader`].
    pub module: String,
    /// Value overlays, unified in order over the module defaults.
    pub values: Vec<ValueSource>,
    /// Release name.
    pub release_name: String,
    /// Target namespace; empty falls back to the module default.
    pub namespace: String,
    /// Provider reference handed to the [`ProviderLoader`].
    pub provider: String,
}

/// A component no transformer matched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("component {component}: no transformer matched")]
pub struct UnmatchedComponentError {
    /// Component name.
    pub component: String,
}

/// Recoverable problem aggregated into [`RenderResult::errors`].
#[derive(thiserror::Error, Debug)]
pub enum RenderIssue {
    /// A component matched no transformer.
    #[error(transparent)]
    Unmatched(#[from] UnmatchedComponentError),
    /// A matched transformer failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// A trait no matched transformer handles (strict mode only).
    #[error(transparent)]
    UnhandledTrait(#[from] UnhandledTrait),
}

/// Output of a completed render.
#[derive(Debug)]
pub struct RenderResult {
    /// Resources in canonical order.
    pub resources: Vec<Resource>,
    /// Release identity.
    pub release: ReleaseMetadata,
    /// Module identity.
    pub module: ModuleMetadata,
    /// Match diagnostics.
    pub match_plan: MatchSummary,
    /// Aggregated recoverable errors.
    pub errors: Vec<RenderIssue>,
    /// Unhandled-trait warnings (non-strict mode).
    pub warnings: Vec<String>,
}

impl RenderResult {
    /// Return `true` when any recoverable error was aggregated.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Render pipeline bound to a module loader, a provider loader and options.
pub struct Pipeline<M, P> {
    modules: M,
    providers: P,
    opts: RenderOpts,
}

impl<M: ModuleLoader, P: ProviderLoader> Pipeline<M, P> {
    /// Create a pipeline.
    pub fn new(modules: M, providers: P, opts: RenderOpts) -> Self {
        Self {
            modules,
            providers,
            opts,
        }
    }

    /// Load the module and provider named by `req`, then render.
    ///
    /// Load failures, validation failures and cancellation are fatal and return `Err`.
    #[tracing::instrument(
        skip_all,
        fields(module = %req.module, provider = %req.provider, release = %req.release_name)
    )]
    pub fn render(&self, req: &RenderRequest, cancel: &CancelToken) -> PlatenResult<RenderResult> {
        tracing::debug!(phase = %Phase::Preparation, "loading inputs");
        let module = self.modules.load(&req.module)?;
        let provider = self.providers.load(&req.provider)?;
        render_module(
            &module,
            &provider,
            &req.values,
            &req.release_name,
            &req.namespace,
            &self.opts,
            cancel,
        )
    }
}

fn checkpoint(cancel: &CancelToken, phase: Phase) -> PlatenResult<()> {
    cancel.check().map_err(|_| PlatenError::Cancelled(phase))
}

/// Run BUILD → MATCHING → WARNINGS → GENERATE for an already loaded module and provider.
#[tracing::instrument(
    skip_all,
    fields(module = %module.metadata.fqn, provider = %provider.name, release = release_name)
)]
pub fn render_module(
    module: &Module,
    provider: &Provider,
    overlays: &[ValueSource],
    release_name: &str,
    namespace: &str,
    opts: &RenderOpts,
    cancel: &CancelToken,
) -> PlatenResult<RenderResult> {
    checkpoint(cancel, Phase::Build)?;
    let release = build_release(module, overlays, release_name, namespace)?;

    checkpoint(cancel, Phase::Matching)?;
    let plan = match_components(release.components(), &provider.transformers);
    let mut errors: Vec<RenderIssue> = plan
        .unmatched
        .iter()
        .map(|c| {
            UnmatchedComponentError {
                component: c.clone(),
            }
            .into()
        })
        .collect();

    checkpoint(cancel, Phase::Warnings)?;
    let unhandled = collect_unhandled(&plan);
    let mut warnings = Vec::new();
    if opts.strict {
        errors.extend(unhandled.into_iter().map(RenderIssue::from));
    } else {
        for u in unhandled {
            tracing::warn!(component = %u.component, trait_fqn = %u.trait_fqn, "unhandled trait");
            warnings.push(u.to_string());
        }
    }

    checkpoint(cancel, Phase::Generate)?;
    let mut eval = EvalContext::new();
    let (mut resources, transform_errors) = plan
        .execute(&mut eval, &release, cancel)
        .map_err(|_| PlatenError::Cancelled(Phase::Generate))?;
    errors.extend(transform_errors.into_iter().map(RenderIssue::from));
    sort_resources(&mut resources);

    tracing::info!(
        resources = resources.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        evaluations = eval.stats().evaluations,
        "render complete"
    );

    Ok(RenderResult {
        resources,
        release: release.metadata().clone(),
        module: release.module().clone(),
        match_plan: plan.summary(),
        errors,
        warnings,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/render.rs"]
mod tests;
