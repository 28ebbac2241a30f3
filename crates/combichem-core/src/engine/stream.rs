use crate::core::models::item::Item;
use crate::core::pools::Pool;
use itertools::Itertools;
use std::sync::Arc;

/// A finite, non-restartable sequence consumed one chunk at a time.
///
/// Nothing beyond the requested chunk is generated, so the consumer controls how much of a
/// combinatorial space is ever materialized.
pub trait ChunkSource {
    type Item;

    /// Returns at most `size` items. An empty vector means the source is exhausted.
    fn next_chunk(&mut self, size: usize) -> Vec<Self::Item>;
}

#[derive(Debug)]
pub struct LazySeq<I> {
    iter: I,
    exhausted: bool,
}

impl<I: Iterator> LazySeq<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            exhausted: false,
        }
    }
}

impl<I: Iterator> ChunkSource for LazySeq<I> {
    type Item = I::Item;

    fn next_chunk(&mut self, size: usize) -> Vec<I::Item> {
        if self.exhausted {
            return Vec::new();
        }
        let size = size.max(1);
        let chunk: Vec<I::Item> = self.iter.by_ref().take(size).collect();
        if chunk.len() < size {
            self.exhausted = true;
        }
        chunk
    }
}

/// Lazily enumerates the cartesian product of `pools` in lexicographic order.
///
/// The first pool varies slowest and the last fastest. Any empty pool makes the product
/// empty.
pub fn cartesian_product<T: Item>(pools: &[Pool<T>]) -> impl Iterator<Item = Vec<Arc<T>>> + '_ {
    pools
        .iter()
        .map(|pool| pool.iter().cloned())
        .multi_cartesian_product()
}
