use crate::core::models::synthon::Synthon;
use std::fmt;
use std::sync::Arc;

/// A single reaction rule that can join two synthons.
pub trait ReactionRule: Send + Sync {
    /// Short label recorded on every product of this rule.
    fn tag(&self) -> &str;

    /// Whether this rule applies to the ordered pair `(first, second)`.
    fn matches_pair(&self, first: &Synthon, second: &Synthon) -> bool;

    /// Whether this rule could involve `synthon` with some partner.
    fn matches_one(&self, synthon: &Synthon) -> bool;

    /// Applies the rule to the pair. Failures produce an empty list or invalid synthons,
    /// never a panic.
    fn apply(&self, first: &Synthon, second: &Synthon) -> Vec<Synthon>;
}

/// The set of reaction rules available to a synthon node.
pub trait ReactionUniverse: Send + Sync {
    /// Rules applicable to the ordered pair, in the universe's rule order.
    fn matching_rules(&self, first: &Synthon, second: &Synthon) -> Vec<Arc<dyn ReactionRule>>;

    /// Whether any rule could apply to `synthon` at all.
    fn can_react(&self, synthon: &Synthon) -> bool;
}

/// A reaction universe backed by an ordered list of rules.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn ReactionRule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Arc<dyn ReactionRule>>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: Arc<dyn ReactionRule>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.tag())
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.tags().collect::<Vec<_>>())
            .finish()
    }
}

impl ReactionUniverse for RuleSet {
    fn matching_rules(&self, first: &Synthon, second: &Synthon) -> Vec<Arc<dyn ReactionRule>> {
        self.rules
            .iter()
            .filter(|rule| rule.matches_pair(first, second))
            .cloned()
            .collect()
    }

    fn can_react(&self, synthon: &Synthon) -> bool {
        self.rules.iter().any(|rule| rule.matches_one(synthon))
    }
}
