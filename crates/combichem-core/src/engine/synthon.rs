use super::context::{AssemblyContext, RunState};
use super::error::{EngineError, TreeError};
use super::graph::AssemblyGraph;
use super::node::{CompositionNode, NodeCore, expand};
use super::progress::Progress;
use super::stream::{ChunkSource, LazySeq};
use crate::core::chem::reaction::{ReactionRule, ReactionUniverse};
use crate::core::chem::template::Template;
use crate::core::executor::Executor;
use crate::core::models::annotation::Annotation;
use crate::core::models::ids::NodeId;
use crate::core::models::item::{Item, Marked};
use crate::core::models::synthon::Synthon;
use crate::core::pools::{IndexedPool, Pool};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

/// A compatible pair together with every rule that applies to it, in rule order.
#[derive(Clone)]
pub struct ReactionAssembly {
    pub first: Arc<Synthon>,
    pub second: Arc<Synthon>,
    pub rules: Vec<Arc<dyn ReactionRule>>,
}

impl fmt::Debug for ReactionAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionAssembly")
            .field("first", &self.first.key())
            .field("second", &self.second.key())
            .field("rules", &self.rules.iter().map(|r| r.tag()).collect::<Vec<_>>())
            .finish()
    }
}

/// Lazily pairs every incoming item with its compatible partners in `next`.
///
/// Pairs come incoming-major: all partners of the first incoming item, in the order
/// [`IndexedPool::get_matching`] returns them, before any partner of the second.
pub fn make_pairs<'a, T: Marked>(
    incoming: &'a Pool<T>,
    next: &'a IndexedPool<T>,
) -> impl Iterator<Item = (Arc<T>, Arc<T>)> + 'a {
    incoming.iter().flat_map(move |first| {
        next.get_matching(first)
            .into_iter()
            .map(move |second| (Arc::clone(first), second))
    })
}

/// Attaches matching reaction rules to streamed pairs and re-batches the survivors.
///
/// Pairs no rule applies to are dropped before they reach fusion, so every returned chunk
/// is full until the pairs run out.
pub struct ReactionMatcher<'a, P> {
    pairs: LazySeq<P>,
    universe: &'a dyn ReactionUniverse,
    executor: &'a Executor,
    buffer: VecDeque<ReactionAssembly>,
}

impl<'a, P> ReactionMatcher<'a, P>
where
    P: Iterator<Item = (Arc<Synthon>, Arc<Synthon>)>,
{
    pub fn new(pairs: P, universe: &'a dyn ReactionUniverse, executor: &'a Executor) -> Self {
        Self {
            pairs: LazySeq::new(pairs),
            universe,
            executor,
            buffer: VecDeque::new(),
        }
    }
}

impl<P> ChunkSource for ReactionMatcher<'_, P>
where
    P: Iterator<Item = (Arc<Synthon>, Arc<Synthon>)>,
{
    type Item = ReactionAssembly;

    fn next_chunk(&mut self, size: usize) -> Vec<ReactionAssembly> {
        let size = size.max(1);
        let universe = self.universe;
        while self.buffer.len() < size {
            let pairs = self.pairs.next_chunk(size);
            if pairs.is_empty() {
                break;
            }
            let matched = self
                .executor
                .map(&pairs, |(first, second)| universe.matching_rules(first, second));
            let before = self.buffer.len();
            self.buffer.extend(
                pairs
                    .into_iter()
                    .zip(matched)
                    .filter(|(_, rules)| !rules.is_empty())
                    .map(|((first, second), rules)| ReactionAssembly {
                        first,
                        second,
                        rules,
                    }),
            );
            trace!(matched = self.buffer.len() - before, "Matched reaction rules to pairs.");
        }
        let take = size.min(self.buffer.len());
        self.buffer.drain(..take).collect()
    }
}

pub enum SynthonKind {
    Leaf,
    Product {
        incoming: NodeId,
        next: NodeId,
        universe: Arc<dyn ReactionUniverse>,
    },
}

impl fmt::Debug for SynthonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => f.write_str("Leaf"),
            Self::Product { incoming, next, .. } => f
                .debug_struct("Product")
                .field("incoming", incoming)
                .field("next", next)
                .finish_non_exhaustive(),
        }
    }
}

/// A vertex of a synthon graph.
///
/// Product nodes join one item from `incoming` with one from `next` through a reaction
/// universe; leaves screen a named input pool.
#[derive(Debug)]
pub struct SynthonNode {
    core: NodeCore<Synthon>,
    kind: SynthonKind,
    functional_groups: BTreeSet<usize>,
    ordinal: usize,
}

impl SynthonNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, SynthonKind::Leaf)
    }

    pub fn kind(&self) -> &SynthonKind {
        &self.kind
    }

    pub fn upstream(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            SynthonKind::Leaf => None,
            SynthonKind::Product { incoming, next, .. } => Some((incoming, next)),
        }
    }

    pub fn universe(&self) -> Option<&Arc<dyn ReactionUniverse>> {
        match &self.kind {
            SynthonKind::Leaf => None,
            SynthonKind::Product { universe, .. } => Some(universe),
        }
    }

    pub fn functional_groups(&self) -> &BTreeSet<usize> {
        &self.functional_groups
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether any rule of this node's universe could involve `synthon`. Nodes without a
    /// universe pass everything.
    pub fn reaction_screen(&self, synthon: &Synthon) -> bool {
        self.universe()
            .is_none_or(|universe| universe.can_react(synthon))
    }

    #[instrument(skip_all, name = "synthon_leaf", fields(node = %self.name()))]
    fn assemble_leaf(
        &self,
        ctx: &AssemblyContext<'_, Synthon>,
        state: &mut RunState<Synthon>,
    ) -> Result<Pool<Synthon>, EngineError> {
        ctx.reporter.report(Progress::NodeStart {
            name: self.name().to_string(),
        });
        let input = ctx.input_pool(self.name())?;
        let output = input.filter(|item| self.screen(item), ctx.executor);
        info!(
            input = input.len(),
            accepted = output.len(),
            "Leaf pool screened."
        );

        ctx.reporter.report(Progress::NodeFinish {
            name: self.name().to_string(),
            accepted: output.len(),
        });
        state.record(self.name(), vec![input.clone()], output.clone());
        Ok(output)
    }

    #[instrument(skip_all, name = "synthon_node", fields(node = %self.name()))]
    fn assemble_from(
        &self,
        incoming: Pool<Synthon>,
        next: Pool<Synthon>,
        universe: &dyn ReactionUniverse,
        ctx: &AssemblyContext<'_, Synthon>,
        state: &mut RunState<Synthon>,
    ) -> Pool<Synthon> {
        ctx.reporter.report(Progress::NodeStart {
            name: self.name().to_string(),
        });
        let incoming = incoming.filter(|item| self.reaction_screen(item), ctx.executor);
        let next = IndexedPool::new(next.filter(|item| self.reaction_screen(item), ctx.executor));
        debug!(
            incoming = incoming.len(),
            next = next.len(),
            "Reaction-screened upstream pools."
        );

        let output = {
            let mut source = ReactionMatcher::new(make_pairs(&incoming, &next), universe, ctx.executor);
            expand(self, &mut source, ctx)
        };
        info!(accepted = output.len(), "Synthon node assembled.");

        ctx.reporter.report(Progress::NodeFinish {
            name: self.name().to_string(),
            accepted: output.len(),
        });
        state.record(self.name(), vec![incoming, next.into_pool()], output.clone());
        output
    }
}

impl fmt::Display for SynthonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SynthonKind::Leaf => write!(f, "Synthon Leaf: {}", self.name()),
            SynthonKind::Product { .. } => write!(f, "Synthon Product: {}", self.name()),
        }
    }
}

impl CompositionNode for SynthonNode {
    type Item = Synthon;
    type Input = ReactionAssembly;
    type Fused = Vec<Synthon>;

    fn core(&self) -> &NodeCore<Synthon> {
        &self.core
    }

    fn screen(&self, item: &Synthon) -> bool {
        if item.is_valid()
            && !self.functional_groups.is_empty()
            && !self.functional_groups.contains(&item.functional_groups())
        {
            return self
                .core
                .reject(item, "functional group count outside expected set");
        }
        self.core.screen(item)
    }

    /// Applies every rule and keeps one product per key, merging the reaction tags of
    /// duplicates into the first occurrence.
    fn fuse_one(&self, input: &ReactionAssembly) -> Vec<Synthon> {
        let mut products: Vec<Synthon> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for rule in &input.rules {
            for product in rule.apply(&input.first, &input.second) {
                let mut tags = product.annotations().reaction_tags();
                if !tags.iter().any(|tag| tag == rule.tag()) {
                    tags.push(rule.tag().to_string());
                }
                match positions.get(product.key()) {
                    Some(&idx) => products[idx]
                        .annotations()
                        .push(Annotation::ReactionTags(tags)),
                    None => {
                        product.annotations().push(Annotation::ReactionTags(tags));
                        positions.insert(product.key().to_string(), products.len());
                        products.push(product);
                    }
                }
            }
        }

        for product in &products {
            product.annotations().extend([
                Annotation::SourceNode(self.name().to_string()),
                Annotation::SourceItems(vec![
                    Arc::clone(&input.first),
                    Arc::clone(&input.second),
                ]),
            ]);
        }
        products
    }
}

struct SynthonDraft {
    name: String,
    template: Option<Arc<dyn Template<Synthon>>>,
    functional_groups: BTreeSet<usize>,
    kind: SynthonKind,
}

/// Collects synthon nodes bottom-up. Upstream nodes may be shared by several products.
#[derive(Default)]
pub struct SynthonGraphBuilder {
    drafts: SlotMap<NodeId, SynthonDraft>,
}

impl SynthonGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf(
        &mut self,
        name: impl Into<String>,
        functional_groups: impl IntoIterator<Item = usize>,
        template: Option<Arc<dyn Template<Synthon>>>,
    ) -> NodeId {
        self.drafts.insert(SynthonDraft {
            name: name.into(),
            template,
            functional_groups: functional_groups.into_iter().collect(),
            kind: SynthonKind::Leaf,
        })
    }

    pub fn node(
        &mut self,
        name: impl Into<String>,
        incoming: NodeId,
        next: NodeId,
        universe: Arc<dyn ReactionUniverse>,
        functional_groups: impl IntoIterator<Item = usize>,
        template: Option<Arc<dyn Template<Synthon>>>,
    ) -> Result<NodeId, TreeError> {
        if !self.drafts.contains_key(incoming) || !self.drafts.contains_key(next) {
            return Err(TreeError::UnknownNode);
        }
        Ok(self.drafts.insert(SynthonDraft {
            name: name.into(),
            template,
            functional_groups: functional_groups.into_iter().collect(),
            kind: SynthonKind::Product {
                incoming,
                next,
                universe,
            },
        }))
    }

    /// Builds the graph rooted at `root`. Nodes not reachable from `root` are discarded.
    pub fn build(mut self, root: NodeId) -> Result<SynthonGraph, TreeError> {
        if !self.drafts.contains_key(root) {
            return Err(TreeError::UnknownNode);
        }

        let mut order: Vec<NodeId> = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut names: HashSet<String> = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let draft = self.drafts.get(id).ok_or(TreeError::UnknownNode)?;
            if !names.insert(draft.name.clone()) {
                return Err(TreeError::DuplicateName {
                    name: draft.name.clone(),
                });
            }
            order.push(id);
            if let SynthonKind::Product { incoming, next, .. } = draft.kind {
                stack.push(next);
                stack.push(incoming);
            }
        }

        let mut nodes: SecondaryMap<NodeId, SynthonNode> = SecondaryMap::new();
        for (idx, &id) in order.iter().enumerate() {
            let draft = self.drafts.remove(id).ok_or(TreeError::UnknownNode)?;
            nodes.insert(
                id,
                SynthonNode {
                    core: NodeCore::new(draft.name, draft.template),
                    kind: draft.kind,
                    functional_groups: draft.functional_groups,
                    ordinal: idx + 1,
                },
            );
        }
        if !self.drafts.is_empty() {
            debug!(
                discarded = self.drafts.len(),
                "Discarding nodes unreachable from the root."
            );
        }

        let mut fan_in: SecondaryMap<NodeId, usize> =
            order.iter().map(|&id| (id, 0)).collect();
        for (incoming, next) in nodes.values().filter_map(SynthonNode::upstream) {
            for upstream in [incoming, next] {
                if let Some(count) = fan_in.get_mut(upstream) {
                    *count += 1;
                }
            }
        }

        Ok(SynthonGraph {
            root,
            order,
            nodes,
            fan_in,
        })
    }
}

/// A validated synthon graph. Shared upstream nodes are assembled once per run.
#[derive(Debug)]
pub struct SynthonGraph {
    root: NodeId,
    order: Vec<NodeId>,
    nodes: SecondaryMap<NodeId, SynthonNode>,
    fan_in: SecondaryMap<NodeId, usize>,
}

impl SynthonGraph {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&SynthonNode> {
        self.nodes.get(id)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SynthonNode)> {
        self.order
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|node| (id, node)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn leaf_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(_, node)| node.name())
            .collect()
    }

    /// One line per node, upstream nodes indented by a tab. A shared node is expanded at
    /// its first occurrence only.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        let mut seen = HashSet::new();
        self.render_into(self.root, 0, &mut seen, &mut lines);
        lines.join("\n")
    }

    fn render_into(
        &self,
        id: NodeId,
        depth: usize,
        seen: &mut HashSet<NodeId>,
        lines: &mut Vec<String>,
    ) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let indent = "\t".repeat(depth);
        if !seen.insert(id) {
            lines.push(format!("{indent}{node} (shared)"));
            return;
        }
        lines.push(format!("{indent}{node}"));
        if let Some((incoming, next)) = node.upstream() {
            self.render_into(incoming, depth + 1, seen, lines);
            self.render_into(next, depth + 1, seen, lines);
        }
    }

    fn assemble_node(
        &self,
        id: NodeId,
        ctx: &AssemblyContext<'_, Synthon>,
        state: &mut RunState<Synthon>,
    ) -> Result<Pool<Synthon>, EngineError> {
        let node = self.nodes.get(id).ok_or(TreeError::UnknownNode)?;
        if let Some(pool) = state.reuse(id) {
            debug!(node = %node.name(), "Reusing assembled upstream pool.");
            return Ok(pool);
        }

        let output = match &node.kind {
            SynthonKind::Leaf => node.assemble_leaf(ctx, state)?,
            SynthonKind::Product {
                incoming,
                next,
                universe,
            } => {
                let incoming_pool = self.assemble_node(*incoming, ctx, state)?;
                let next_pool = self.assemble_node(*next, ctx, state)?;
                node.assemble_from(incoming_pool, next_pool, universe.as_ref(), ctx, state)
            }
        };
        state.remember(id, &output, self.fan_in.get(id).copied().unwrap_or(0));
        Ok(output)
    }
}

impl fmt::Display for SynthonGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl AssemblyGraph for SynthonGraph {
    type Item = Synthon;

    fn root(&self) -> NodeId {
        self.root
    }

    fn leaf_names(&self) -> Vec<&str> {
        SynthonGraph::leaf_names(self)
    }

    fn assemble(
        &self,
        ctx: &AssemblyContext<'_, Synthon>,
        state: &mut RunState<Synthon>,
    ) -> Result<Pool<Synthon>, EngineError> {
        self.assemble_node(self.root, ctx, state)
    }
}
