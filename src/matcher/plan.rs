use crate::provider::transformer::Transformer;
use crate::release::model::Component;
use std::collections::BTreeSet;

/// One transformer applied to one component.
#[derive(Clone, Debug)]
pub struct Match<'a> {
    /// Matched component.
    pub component: &'a Component,
    /// Matching transformer.
    pub transformer: &'a Transformer,
    /// Why the pair matched.
    pub reason: String,
    /// Component traits this transformer neither requires nor optionally handles.
    pub unhandled_traits: BTreeSet<String>,
}

/// A (component, transformer) pair that did not match, with the reason.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    /// Component name.
    pub component: String,
    /// Transformer FQN.
    pub transformer: String,
    /// Why the pair did not match.
    pub reason: String,
}

/// Result of matching a release's components against a transformer set.
///
/// Borrows components and transformers; both outlive the plan for the duration of a render.
#[derive(Clone, Debug, Default)]
pub struct MatchPlan<'a> {
    /// Matches ordered by component name, then transformer FQN.
    pub matches: Vec<Match<'a>>,
    /// Components that matched no transformer, in name order.
    pub unmatched: Vec<String>,
    /// Non-matching pairs, for diagnostics.
    pub rejections: Vec<Rejection>,
}

/// Owned, serializable copy of a [`Match`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Component name.
    pub component: String,
    /// Transformer FQN.
    pub transformer: String,
    /// Why the pair matched.
    pub reason: String,
    /// Traits this transformer does not handle.
    pub unhandled_traits: BTreeSet<String>,
}

/// Owned, serializable copy of a [`MatchPlan`], kept in the render result for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    /// Matched pairs.
    pub matches: Vec<MatchRecord>,
    /// Unmatched component names.
    pub unmatched: Vec<String>,
    /// Non-matching pairs.
    pub rejections: Vec<Rejection>,
}

impl<'a> MatchPlan<'a> {
    /// Matches for component `name`.
    pub fn matches_for<'p>(&'p self, name: &'p str) -> impl Iterator<Item = &'p Match<'a>> + 'p {
        self.matches.iter().filter(move |m| m.component.name == name)
    }

    /// Return `true` when nothing matched and nothing was left unmatched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.unmatched.is_empty()
    }

    /// Owned diagnostic copy.
    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            matches: self
                .matches
                .iter()
                .map(|m| MatchRecord {
                    component: m.component.name.clone(),
                    transformer: m.transformer.fqn.clone(),
                    reason: m.reason.clone(),
                    unhandled_traits: m.unhandled_traits.clone(),
                })
                .collect(),
            unmatched: self.unmatched.clone(),
            rejections: self.rejections.clone(),
        }
    }
}
