use crate::engine::error::EngineError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "parallel")]
use std::sync::Arc;

/// The data-parallel capability injected into an assembly run.
///
/// Every filter and fuse step goes through [`Executor::map`], which joins synchronously and
/// returns results in submission order whichever implementation runs the work.
#[derive(Debug, Clone, Default)]
pub enum Executor {
    /// Runs every call on the caller's thread.
    #[default]
    Sequential,
    /// Fans calls out over a dedicated worker pool.
    #[cfg(feature = "parallel")]
    Parallel(Arc<rayon::ThreadPool>),
}

impl Executor {
    pub fn sequential() -> Self {
        Self::Sequential
    }

    /// Builds a dedicated worker pool with `num_threads` workers.
    #[cfg(feature = "parallel")]
    pub fn with_threads(num_threads: usize) -> Result<Self, EngineError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|idx| format!("combichem-worker-{idx}"))
            .build()
            .map(|pool| Self::Parallel(Arc::new(pool)))
            .map_err(|e| EngineError::Executor(e.to_string()))
    }

    /// Without the `parallel` feature every executor is sequential.
    #[cfg(not(feature = "parallel"))]
    pub fn with_threads(_num_threads: usize) -> Result<Self, EngineError> {
        Ok(Self::Sequential)
    }

    pub fn num_workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            #[cfg(feature = "parallel")]
            Self::Parallel(pool) => pool.current_num_threads(),
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.num_workers() > 1
    }

    /// Applies `f` to every input and returns the outputs in input order.
    pub fn map<T, R, F>(&self, inputs: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        match self {
            Self::Sequential => inputs.iter().map(f).collect(),
            #[cfg(feature = "parallel")]
            Self::Parallel(pool) => pool.install(|| inputs.par_iter().map(f).collect()),
        }
    }
}
