use super::pool::Pool;
use crate::core::executor::Executor;
use crate::core::models::item::Marked;
use crate::core::models::synthon::Mark;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A pool with an inverted index from compatibility mark to the items exhibiting it.
///
/// The index is built once from the full item list and never updated; filtering returns a
/// freshly indexed pool. An item with `k` distinct marks sits in exactly `k` buckets.
pub struct IndexedPool<T> {
    pool: Pool<T>,
    index: HashMap<Mark, Vec<usize>>,
}

impl<T> fmt::Debug for IndexedPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedPool")
            .field("pool", &self.pool)
            .field("marks", &self.index.len())
            .finish()
    }
}

impl<T: Marked> IndexedPool<T> {
    pub fn new(pool: Pool<T>) -> Self {
        let mut index: HashMap<Mark, Vec<usize>> = HashMap::new();
        for (idx, item) in pool.iter().enumerate() {
            let mut seen: HashSet<&Mark> = HashSet::new();
            for mark in item.marks() {
                if seen.insert(mark) {
                    index.entry(mark.clone()).or_default().push(idx);
                }
            }
        }
        Self { pool, index }
    }

    pub fn pool(&self) -> &Pool<T> {
        &self.pool
    }

    pub fn into_pool(self) -> Pool<T> {
        self.pool
    }

    /// Every mark present in the pool, in no particular order.
    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.index.keys()
    }

    /// Items exhibiting `mark`, in pool order.
    pub fn bucket(&self, mark: &Mark) -> Vec<&Arc<T>> {
        self.index
            .get(mark)
            .map(|indices| indices.iter().map(|&idx| &self.pool.items()[idx]).collect())
            .unwrap_or_default()
    }

    /// Items compatible with `query`.
    ///
    /// Buckets are visited in the order of `query`'s compatible marks and concatenated;
    /// items reached through several marks are kept once, at their first position, keyed by
    /// identity key.
    pub fn get_matching(&self, query: &T) -> Vec<Arc<T>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut matching = Vec::new();
        for mark in query.compatible_marks() {
            let Some(indices) = self.index.get(mark) else {
                continue;
            };
            for &idx in indices {
                let item = &self.pool.items()[idx];
                if seen.insert(item.key()) {
                    matching.push(Arc::clone(item));
                }
            }
        }
        matching
    }

    /// Filters the underlying pool and re-indexes the result.
    pub fn filter<F>(&self, predicate: F, executor: &Executor) -> Self
    where
        F: Fn(&T) -> bool + Sync + Send,
    {
        Self::new(self.pool.filter(predicate, executor))
    }
}

impl<T: Marked> From<Pool<T>> for IndexedPool<T> {
    fn from(pool: Pool<T>) -> Self {
        Self::new(pool)
    }
}

impl<T> Deref for IndexedPool<T> {
    type Target = Pool<T>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
