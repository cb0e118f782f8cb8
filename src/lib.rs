//! Platen renders a module release into an ordered set of platform resources.
//!
//! A module declares a closed values schema, default values and a set of components; a provider
//! contributes transformers that turn matched components into resources.
//!
//! # Pipeline overview
//!
//! - PREPARATION: load the [`Module`] and the [`Provider`]
//! - BUILD: unify value overlays, validate them against the [`Schema`] and resolve every
//!   component into a concrete [`Release`] with a deterministic identity
//! - MATCHING: pair components with transformers into a [`MatchPlan`]
//! - WARNINGS: report traits no matched transformer handles (errors in strict mode)
//! - GENERATE: execute the plan sequentially, decode outputs into [`Resource`]s and sort them
//!   by `(weight, group, kind, namespace, name)`
//!
//! [`render_module`] runs the phases for values already in memory; [`Pipeline`] adds loading.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod eval;
pub(crate) mod execute;
pub(crate) mod matcher;
pub(crate) mod module;
pub(crate) mod pipeline;
pub(crate) mod provider;
pub(crate) mod release;

pub use crate::foundation::core::{
    CancelToken, Cancelled, Labels, PathElem, Phase, ValuePath, is_dns_label, lookup,
};
pub use crate::foundation::error::{LoadError, PlatenError, PlatenResult};

pub use crate::eval::context::{EvalContext, EvalStats};
pub use crate::eval::template::TemplateError;
pub use crate::execute::decode::DecodeError;
pub use crate::execute::executor::{TransformCause, TransformError};
pub use crate::execute::resource::Resource;
pub use crate::matcher::matching::match_components;
pub use crate::matcher::plan::{Match, MatchPlan, MatchRecord, MatchSummary, Rejection};
pub use crate::matcher::warnings::{UnhandledTrait, collect_unhandled, collect_warnings};
pub use crate::module::loader::{FsModuleLoader, ModuleLoader, ModuleSet};
pub use crate::module::model::{ComponentDef, Module, ModuleMetadata};
pub use crate::module::schema::{FieldSchema, Schema, ValidationError, ValidationKind};
pub use crate::module::values::ValueSource;
pub use crate::pipeline::order::{DEFAULT_WEIGHT, kind_weight, sort_resources, sort_resources_by};
pub use crate::pipeline::render::{
    Pipeline, RenderIssue, RenderOpts, RenderRequest, RenderResult, UnmatchedComponentError,
    render_module,
};
pub use crate::provider::loader::{
    FsProviderLoader, ProviderLoader, ProviderRegistry, provider_from_reader,
};
pub use crate::provider::predicate::{FnPredicate, MatchPredicate, PredicateExpr};
pub use crate::provider::transformer::{
    FnGenerator, Generate, MatchStrategy, Provider, TemplateGenerator, TransformContext,
    Transformer,
};
pub use crate::release::builder::{BuildError, DEFAULT_NAMESPACE, build_release};
pub use crate::release::identity::{
    LABEL_MANAGED_BY, LABEL_MODULE_NAME, LABEL_MODULE_VERSION, LABEL_RELEASE_NAME,
    LABEL_RELEASE_UUID, release_uuid,
};
pub use crate::release::model::{Component, ComponentDescriptor, Release, ReleaseMetadata};
