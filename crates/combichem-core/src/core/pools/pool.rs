use crate::core::executor::Executor;
use crate::core::models::item::Item;
use std::fmt;
use std::sync::Arc;

/// An ordered, immutable-once-built sequence of items.
///
/// Items are shared through `Arc` so that a pool can be snapshotted into the provenance log
/// and fused items can point back at their sources without copying.
pub struct Pool<T> {
    items: Vec<Arc<T>>,
}

impl<T> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pool: {} items", self.items.len())
    }
}

impl<T: Item> Pool<T> {
    pub fn new(items: Vec<Arc<T>>) -> Self {
        Self { items }
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<T>> {
        self.items.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<T>> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Arc<T>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Arc<T>> {
        self.items
    }

    pub fn keys(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.key()).collect()
    }

    /// Keeps the items for which `predicate` holds, in their original order.
    ///
    /// The predicate is evaluated once per item through `executor`. It must not panic;
    /// anything it cannot evaluate should count as a rejection.
    pub fn filter<F>(&self, predicate: F, executor: &Executor) -> Self
    where
        F: Fn(&T) -> bool + Sync + Send,
    {
        let keep = executor.map(&self.items, |item| predicate(item));
        Self {
            items: self
                .items
                .iter()
                .zip(keep)
                .filter_map(|(item, keep)| keep.then(|| Arc::clone(item)))
                .collect(),
        }
    }
}

impl<T> FromIterator<Arc<T>> for Pool<T> {
    fn from_iter<I: IntoIterator<Item = Arc<T>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Pool<T> {
    type Item = &'a Arc<T>;
    type IntoIter = std::slice::Iter<'a, Arc<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
