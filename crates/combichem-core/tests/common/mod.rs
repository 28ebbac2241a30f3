#![allow(dead_code)]

use combichem::core::chem::attachment;
use combichem::core::chem::reaction::{ReactionRule, ReactionUniverse, RuleSet};
use combichem::core::chem::toolkit::StructureToolkit;
use combichem::core::models::item::{Item, Marked};
use combichem::core::models::structure::Structure;
use combichem::core::models::synthon::{Mark, Synthon};
use combichem::core::pools::Pool;
use combichem::engine::context::PoolMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Joins fragments by deleting every `[*:N]` label that occurs exactly twice.
#[derive(Debug, Default)]
pub struct LabelToolkit {
    calls: AtomicUsize,
}

impl LabelToolkit {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StructureToolkit for LabelToolkit {
    fn canonicalize(&self, repr: &str) -> Option<String> {
        let repr = repr.trim();
        (!repr.is_empty() && !repr.contains('?')).then(|| repr.to_string())
    }

    fn fuse_on_attachment_mapping(&self, joined: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for label in attachment::attachment_labels(joined) {
            *counts.entry(label).or_default() += 1;
        }
        if joined.contains('?') || counts.values().any(|&n| n > 2) {
            return None;
        }
        let mut fused = joined.replace('.', "");
        for (label, _) in counts.iter().filter(|(_, n)| **n == 2) {
            fused = fused.replace(&format!("[*:{label}]"), "");
        }
        Some(fused)
    }
}

pub fn structures(entries: &[(&str, &[&str])]) -> PoolMap<Structure> {
    entries
        .iter()
        .map(|(name, keys)| {
            let pool = Pool::from_items(keys.iter().map(|k| Structure::from_canonical(*k)));
            (name.to_string(), pool)
        })
        .collect()
}

pub fn synthons(entries: Vec<(&str, Vec<Synthon>)>) -> PoolMap<Synthon> {
    entries
        .into_iter()
        .map(|(name, items)| (name.to_string(), Pool::from_items(items)))
        .collect()
}

pub fn reactive(key: &str, mark: &str) -> Synthon {
    Synthon::new(key)
        .with_marks([mark])
        .with_compatible_marks([mark])
}

/// Couples a synthon compatible with `mark` to a partner carrying it, concatenating keys
/// around `link`. Products keep `mark` and lose one functional group per side.
#[derive(Debug)]
pub struct Coupling {
    tag: String,
    mark: Mark,
    link: String,
}

impl Coupling {
    pub fn new(tag: &str, mark: &str, link: &str) -> Self {
        Self {
            tag: tag.to_string(),
            mark: Mark::from(mark),
            link: link.to_string(),
        }
    }
}

impl ReactionRule for Coupling {
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
        let product = Synthon::new(format!("{}{}{}", first.key(), self.link, second.key()))
            .with_marks([self.mark.clone()])
            .with_compatible_marks([self.mark.clone()])
            .with_functional_groups(
                (first.functional_groups() + second.functional_groups()).saturating_sub(2),
            );
        vec![product]
    }
}

pub fn rules(rules: Vec<Coupling>) -> Arc<dyn ReactionUniverse> {
    Arc::new(RuleSet::new(
        rules
            .into_iter()
            .map(|rule| Arc::new(rule) as Arc<dyn ReactionRule>)
            .collect(),
    ))
}
