use crate::core::executor::Executor;
use crate::core::pools::Pool;
use crate::engine::config::AssemblyConfig;
use crate::engine::context::{AssemblyContext, PoolMap, RunState};
use crate::engine::error::EngineError;
use crate::engine::graph::AssemblyGraph;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::provenance::ProvenanceLog;
use tracing::{info, instrument};

/// Accepted items of the root node plus, when enabled, every node's inputs and outputs.
#[derive(Debug)]
pub struct AssemblyResult<T> {
    pub pool: Pool<T>,
    pub log: Option<ProvenanceLog<T>>,
}

/// Enumerates `graph` from its named input `pools`.
///
/// Fails before any node runs if the configuration is invalid or a leaf has no input pool.
#[instrument(skip_all, name = "enumeration_workflow")]
pub fn run<G: AssemblyGraph>(
    graph: &G,
    pools: &PoolMap<G::Item>,
    config: &AssemblyConfig,
    executor: &Executor,
    reporter: &ProgressReporter,
) -> Result<AssemblyResult<G::Item>, EngineError> {
    config.validate()?;
    if let Some(name) = graph
        .leaf_names()
        .into_iter()
        .find(|name| !pools.contains_key(*name))
    {
        return Err(EngineError::MissingPool {
            name: name.to_string(),
        });
    }

    info!(
        leaves = graph.leaf_names().len(),
        chunk_size = config.chunk_size,
        max_per_node = config.max_per_node,
        workers = executor.num_workers(),
        "Starting enumeration."
    );
    reporter.report(Progress::Message(format!(
        "Enumerating with {} worker(s)",
        executor.num_workers()
    )));

    let ctx = AssemblyContext::new(config, pools, executor, reporter);
    let mut state = RunState::new(config.log_provenance);
    let pool = graph.assemble(&ctx, &mut state)?;

    info!(accepted = pool.len(), "Enumeration finished.");
    Ok(AssemblyResult {
        pool,
        log: state.into_log(),
    })
}
