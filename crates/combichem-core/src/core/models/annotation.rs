use crate::core::chem::template::TemplateResult;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A single entry in an item's annotation bag.
#[derive(Debug)]
pub enum Annotation<T> {
    /// Outcome of a node's acceptance screen on this item.
    Template { node: String, result: TemplateResult },
    /// Name of the node that produced this item.
    SourceNode(String),
    /// The upstream items this item was fused from, in input order.
    SourceItems(Vec<Arc<T>>),
    /// The joined representation handed to the fusion collaborator.
    InputRepresentation(String),
    /// Tags of the reaction rules that produced this item.
    ReactionTags(Vec<String>),
}

impl<T> Clone for Annotation<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Template { node, result } => Self::Template {
                node: node.clone(),
                result: result.clone(),
            },
            Self::SourceNode(name) => Self::SourceNode(name.clone()),
            Self::SourceItems(items) => Self::SourceItems(items.clone()),
            Self::InputRepresentation(repr) => Self::InputRepresentation(repr.clone()),
            Self::ReactionTags(tags) => Self::ReactionTags(tags.clone()),
        }
    }
}

/// Append-only annotation bag attached to every item.
///
/// Entries can be appended through a shared reference so that items held behind `Arc` in
/// several pools can still be annotated by the node currently screening them. Entries are
/// never removed.
#[derive(Debug)]
pub struct Annotations<T> {
    entries: Mutex<Vec<Annotation<T>>>,
}

impl<T> Default for Annotations<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Clone for Annotations<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Mutex::new(self.lock().clone()),
        }
    }
}

impl<T> Annotations<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Annotation<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, annotation: Annotation<T>) {
        self.lock().push(annotation);
    }

    /// Records `node`'s screen outcome unless that node already screened this item.
    ///
    /// Returns whether the entry was added. Leaf items outlive a run, so screening them again
    /// must not stack duplicate outcomes.
    pub fn record_template(&self, node: &str, result: TemplateResult) -> bool {
        let mut entries = self.lock();
        let seen = entries
            .iter()
            .any(|entry| matches!(entry, Annotation::Template { node: n, .. } if n == node));
        if !seen {
            entries.push(Annotation::Template {
                node: node.to_string(),
                result,
            });
        }
        !seen
    }

    pub fn extend(&self, annotations: impl IntoIterator<Item = Annotation<T>>) {
        self.lock().extend(annotations);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a copy of every entry in insertion order.
    pub fn snapshot(&self) -> Vec<Annotation<T>> {
        self.lock().clone()
    }

    /// The template outcome recorded by `node`, if that node screened this item.
    pub fn template_result(&self, node: &str) -> Option<TemplateResult> {
        self.lock().iter().rev().find_map(|entry| match entry {
            Annotation::Template { node: n, result } if n == node => Some(result.clone()),
            _ => None,
        })
    }

    pub fn passed(&self, node: &str) -> Option<bool> {
        self.template_result(node).map(|result| result.passed)
    }

    pub fn source_node(&self) -> Option<String> {
        self.lock().iter().rev().find_map(|entry| match entry {
            Annotation::SourceNode(name) => Some(name.clone()),
            _ => None,
        })
    }

    pub fn source_items(&self) -> Vec<Arc<T>> {
        self.lock()
            .iter()
            .rev()
            .find_map(|entry| match entry {
                Annotation::SourceItems(items) => Some(items.clone()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn input_representation(&self) -> Option<String> {
        self.lock().iter().rev().find_map(|entry| match entry {
            Annotation::InputRepresentation(repr) => Some(repr.clone()),
            _ => None,
        })
    }

    /// Union of every recorded reaction tag, in first-seen order.
    pub fn reaction_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for entry in self.lock().iter() {
            if let Annotation::ReactionTags(entry_tags) = entry {
                for tag in entry_tags {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }
            }
        }
        tags
    }
}
