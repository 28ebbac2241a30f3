//! Ordered item containers.
//!
//! A [`Pool`] is immutable once built: filtering produces a new pool and never reorders
//! the retained items. An [`IndexedPool`] additionally maps every compatibility mark to the
//! items exhibiting it, so partner lookup costs the size of the relevant buckets instead of
//! a scan over the whole pool.

mod indexed;
mod pool;

pub use indexed::IndexedPool;
pub use pool::Pool;
