use super::context::AssemblyContext;
use super::progress::Progress;
use super::stream::ChunkSource;
use crate::core::chem::template::{Template, TemplateResult};
use crate::core::executor::Executor;
use crate::core::models::item::Item;
use crate::core::pools::Pool;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub struct NodeCore<T> {
    name: String,
    template: Option<Arc<dyn Template<T>>>,
}

impl<T> fmt::Debug for NodeCore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCore")
            .field("name", &self.name)
            .field("has_template", &self.template.is_some())
            .finish()
    }
}

impl<T: Item> NodeCore<T> {
    pub fn new(name: impl Into<String>, template: Option<Arc<dyn Template<T>>>) -> Self {
        Self {
            name: name.into(),
            template,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    /// Runs the template (an automatic pass without one) and records the outcome on the item.
    ///
    /// Invalid items fail without reaching the template.
    pub fn screen(&self, item: &T) -> bool {
        let result = if !item.is_valid() {
            TemplateResult::fail("invalid item")
        } else {
            match &self.template {
                Some(template) => template.evaluate(item),
                None => TemplateResult::pass(),
            }
        };
        self.record(item, result)
    }

    /// Rejects `item` without running the template, recording `reason` as the outcome.
    pub fn reject(&self, item: &T, reason: &str) -> bool {
        self.record(item, TemplateResult::fail(reason))
    }

    fn record(&self, item: &T, result: TemplateResult) -> bool {
        let passed = result.passed;
        if !passed {
            trace!(node = %self.name, key = item.key(), details = ?result.details, "Item rejected.");
        }
        item.annotations().record_template(&self.name, result);
        passed
    }
}

/// A vertex of a composition tree: screens items and fuses upstream combinations into new
/// items.
pub trait CompositionNode: Sync {
    type Item: Item;
    /// One combination of upstream items.
    type Input: Sync;
    /// Everything fused from one input.
    type Fused: IntoIterator<Item = Self::Item> + Send;

    fn core(&self) -> &NodeCore<Self::Item>;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn screen(&self, item: &Self::Item) -> bool {
        self.core().screen(item)
    }

    /// Fuses one input. Must be pure and must report failures as invalid items.
    fn fuse_one(&self, input: &Self::Input) -> Self::Fused;

    /// Fuses every input through `executor`, keeping submission order.
    fn fuse(&self, inputs: &[Self::Input], executor: &Executor) -> Pool<Self::Item> {
        executor
            .map(inputs, |input| self.fuse_one(input))
            .into_iter()
            .flatten()
            .map(Arc::new)
            .collect()
    }
}

/// Pulls chunks from `source`, fusing and screening each before drawing the next.
///
/// Generation stops once the accepted count reaches the configured cap. The check runs
/// after a whole chunk, so the final chunk may overshoot.
pub(crate) fn expand<N, S>(
    node: &N,
    source: &mut S,
    ctx: &AssemblyContext<'_, N::Item>,
) -> Pool<N::Item>
where
    N: CompositionNode,
    S: ChunkSource<Item = N::Input>,
{
    let chunk_size = ctx.config.chunk_size;
    let cap = ctx.config.max_per_node;
    let mut accepted: Vec<Arc<N::Item>> = Vec::new();
    let mut chunk_idx = 0usize;

    loop {
        let inputs = source.next_chunk(chunk_size);
        if inputs.is_empty() {
            break;
        }
        chunk_idx += 1;

        let fused = node.fuse(&inputs, ctx.executor);
        let passed = fused.filter(|item| node.screen(item), ctx.executor);
        debug!(
            chunk = chunk_idx,
            inputs = inputs.len(),
            fused = fused.len(),
            accepted = passed.len(),
            total = accepted.len() + passed.len(),
            "Processed chunk."
        );
        ctx.reporter.report_with(|| Progress::ChunkFinish {
            node: node.name().to_string(),
            accepted: passed.len(),
        });
        accepted.extend(passed.into_items());

        if accepted.len() >= cap {
            debug!(cap, accepted = accepted.len(), "Per-node cap reached.");
            ctx.reporter.report(Progress::CapReached {
                name: node.name().to_string(),
                accepted: accepted.len(),
            });
            break;
        }
    }

    Pool::new(accepted)
}
