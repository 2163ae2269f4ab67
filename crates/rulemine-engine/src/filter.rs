//! Direction filter: keep only influencer → user rules.

use rulemine_core::rule::{AssociationRule, RuleDirection};
use rulemine_core::schema::Schema;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether every antecedent feature is influencer-side and every consequent
/// feature is user-side.
pub fn is_influencer_to_user(rule: &AssociationRule, schema: &Schema) -> bool {
    RuleDirection::classify(&rule.antecedent, &rule.consequent, schema)
        == RuleDirection::InfluencerToUser
}

/// Counts of discarded rules per direction class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardCounts {
    pub user_to_influencer: usize,
    pub same_namespace: usize,
    pub mixed: usize,
}

impl DiscardCounts {
    pub fn total(&self) -> usize {
        self.user_to_influencer + self.same_namespace + self.mixed
    }
}

/// A rule that survived the filter, tagged with its direction class.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectedRule {
    pub rule: AssociationRule,
    pub direction: RuleDirection,
}

#[derive(Debug, Clone, Default)]
pub struct FilteredRules {
    pub kept: Vec<DirectedRule>,
    pub discarded: DiscardCounts,
}

/// Applies the influencer → user predicate to a batch of rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionFilter;

impl DirectionFilter {
    pub fn apply(&self, rules: Vec<AssociationRule>, schema: &Schema) -> FilteredRules {
        let mut out = FilteredRules::default();
        for rule in rules {
            let direction = RuleDirection::classify(&rule.antecedent, &rule.consequent, schema);
            match direction {
                RuleDirection::InfluencerToUser => out.kept.push(DirectedRule { rule, direction }),
                RuleDirection::UserToInfluencer => out.discarded.user_to_influencer += 1,
                RuleDirection::SameNamespace => out.discarded.same_namespace += 1,
                RuleDirection::Mixed => out.discarded.mixed += 1,
            }
        }
        debug!(
            kept = out.kept.len(),
            discarded = out.discarded.total(),
            "direction filter applied"
        );
        out
    }
}
