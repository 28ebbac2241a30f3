//! Toy collaborators shared by the unit tests.

use crate::core::chem::attachment;
use crate::core::chem::reaction::ReactionRule;
use crate::core::chem::toolkit::StructureToolkit;
use crate::core::models::item::{Item, Marked};
use crate::core::models::synthon::{Mark, Synthon};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Treats representations as already canonical and fuses by deleting paired `[*:N]` tokens.
///
/// Anything containing `!` is rejected as unparsable, and a label that appears more than
/// twice makes fusion fail.
#[derive(Debug, Default)]
pub(crate) struct ToyToolkit {
    pub fusions: AtomicUsize,
}

impl ToyToolkit {
    pub fn fusion_calls(&self) -> usize {
        self.fusions.load(Ordering::SeqCst)
    }
}

impl StructureToolkit for ToyToolkit {
    fn canonicalize(&self, repr: &str) -> Option<String> {
        let trimmed = repr.trim();
        if trimmed.is_empty() || trimmed.contains('!') {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn fuse_on_attachment_mapping(&self, joined: &str) -> Option<String> {
        self.fusions.fetch_add(1, Ordering::SeqCst);
        if joined.contains('!') {
            return None;
        }
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for label in attachment::attachment_labels(joined) {
            *counts.entry(label).or_default() += 1;
        }
        if counts.values().any(|&n| n > 2) {
            return None;
        }
        let mut fused = joined.replace('.', "");
        for (label, n) in counts {
            if n == 2 {
                fused = fused.replace(&format!("[*:{label}]"), "");
            }
        }
        Some(fused)
    }
}

pub(crate) fn synthon(key: &str, marks: &[&str], compatible: &[&str]) -> Synthon {
    Synthon::new(key)
        .with_marks(marks.iter().copied())
        .with_compatible_marks(compatible.iter().copied())
}

/// Joins `first` and `second` when `first` is compatible with `mark` and `second` carries it.
#[derive(Debug)]
pub(crate) struct JoinRule {
    tag: String,
    mark: Mark,
    products: Vec<String>,
    product_marks: Vec<Mark>,
}

impl JoinRule {
    pub fn new(tag: &str, mark: &str) -> Self {
        Self {
            tag: tag.to_string(),
            mark: Mark::from(mark),
            products: vec!["{a}-{b}".to_string()],
            product_marks: Vec::new(),
        }
    }

    /// Overrides the product patterns; `{a}` and `{b}` are replaced by the reactant keys.
    pub fn with_products(mut self, products: &[&str]) -> Self {
        self.products = products.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Gives every product these marks, both exhibited and compatible.
    pub fn with_product_marks(mut self, marks: &[&str]) -> Self {
        self.product_marks = marks.iter().map(|m| Mark::from(*m)).collect();
        self
    }
}

impl ReactionRule for JoinRule {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn matches_pair(&self, first: &Synthon, second: &Synthon) -> bool {
        first.compatible_marks().contains(&self.mark) && second.marks().contains(&self.mark)
    }

    fn matches_one(&self, synthon: &Synthon) -> bool {
        synthon.marks().contains(&self.mark) || synthon.compatible_marks().contains(&self.mark)
    }

    fn apply(&self, first: &Synthon, second: &Synthon) -> Vec<Synthon> {
        self.products
            .iter()
            .map(|pattern| {
                let key = pattern.replace("{a}", first.key()).replace("{b}", second.key());
                Synthon::new(key)
                    .with_marks(self.product_marks.clone())
                    .with_compatible_marks(self.product_marks.clone())
                    .with_functional_groups(
                        (first.functional_groups() + second.functional_groups())
                            .saturating_sub(2),
                    )
            })
            .collect()
    }
}
