use super::config::AssemblyConfig;
use super::error::EngineError;
use super::progress::ProgressReporter;
use super::provenance::ProvenanceLog;
use crate::core::executor::Executor;
use crate::core::models::ids::NodeId;
use crate::core::models::item::Item;
use crate::core::pools::Pool;
use std::collections::HashMap;

pub type PoolMap<T> = HashMap<String, Pool<T>>;

pub struct AssemblyContext<'a, T> {
    pub config: &'a AssemblyConfig,
    pub pools: &'a PoolMap<T>,
    pub executor: &'a Executor,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a, T: Item> AssemblyContext<'a, T> {
    pub fn new(
        config: &'a AssemblyConfig,
        pools: &'a PoolMap<T>,
        executor: &'a Executor,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            config,
            pools,
            executor,
            reporter,
        }
    }

    pub fn input_pool(&self, name: &str) -> Result<&'a Pool<T>, EngineError> {
        self.pools.get(name).ok_or_else(|| EngineError::MissingPool {
            name: name.to_string(),
        })
    }
}

#[derive(Debug)]
struct Memo<T> {
    pool: Pool<T>,
    pending: usize,
}

/// Mutable state of one run: outputs of shared nodes and the optional provenance log.
#[derive(Debug)]
pub struct RunState<T> {
    memo: HashMap<NodeId, Memo<T>>,
    log: Option<ProvenanceLog<T>>,
}

impl<T: Item> RunState<T> {
    pub fn new(log_provenance: bool) -> Self {
        Self {
            memo: HashMap::new(),
            log: log_provenance.then(ProvenanceLog::new),
        }
    }

    pub fn cached(&self, id: NodeId) -> Option<Pool<T>> {
        self.memo.get(&id).map(|memo| memo.pool.clone())
    }

    /// Keeps `pool` for the `consumers - 1` consumers after the current one. Nothing is
    /// kept for a node with a single consumer.
    pub fn remember(&mut self, id: NodeId, pool: &Pool<T>, consumers: usize) {
        if consumers > 1 {
            self.memo.insert(
                id,
                Memo {
                    pool: pool.clone(),
                    pending: consumers - 1,
                },
            );
        }
    }

    /// Hands a remembered output to one more consumer, releasing it after the last.
    pub fn reuse(&mut self, id: NodeId) -> Option<Pool<T>> {
        let memo = self.memo.get_mut(&id)?;
        memo.pending = memo.pending.saturating_sub(1);
        if memo.pending == 0 {
            self.memo.remove(&id).map(|memo| memo.pool)
        } else {
            Some(memo.pool.clone())
        }
    }

    pub fn record(&mut self, node: &str, inputs: Vec<Pool<T>>, outputs: Pool<T>) {
        if let Some(log) = self.log.as_mut() {
            log.record(node, inputs, outputs);
        }
    }

    pub fn log(&self) -> Option<&ProvenanceLog<T>> {
        self.log.as_ref()
    }

    pub fn into_log(self) -> Option<ProvenanceLog<T>> {
        self.log
    }
}
