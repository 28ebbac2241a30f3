use super::context::{AssemblyContext, RunState};
use super::error::{EngineError, TreeError};
use super::graph::AssemblyGraph;
use super::node::{CompositionNode, NodeCore, expand};
use super::progress::Progress;
use super::stream::{LazySeq, cartesian_product};
use crate::core::chem::attachment;
use crate::core::chem::template::Template;
use crate::core::chem::toolkit::StructureToolkit;
use crate::core::models::annotation::Annotation;
use crate::core::models::ids::NodeId;
use crate::core::models::item::Item;
use crate::core::models::structure::Structure;
use crate::core::pools::Pool;
use itertools::Itertools;
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Attachment points a subtree leaves open after all of its internal fusions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape {
    pub exposed: Vec<u32>,
    pub joined: Vec<u32>,
}

impl Shape {
    fn leaf(node: &str, mapping: &[u32]) -> Result<Self, TreeError> {
        let mut exposed = mapping.to_vec();
        exposed.sort_unstable();
        if let Some(pair) = exposed.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(TreeError::DuplicateAttachment {
                node: node.to_string(),
                index: pair[0],
            });
        }
        Ok(Self {
            exposed,
            joined: Vec::new(),
        })
    }

    /// Labels exposed by exactly one child stay open; labels exposed by two are fused.
    fn combine(node: &str, children: &[&Shape]) -> Result<Self, TreeError> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for &index in children.iter().flat_map(|shape| &shape.exposed) {
            *counts.entry(index).or_default() += 1;
        }

        let mut shape = Self::default();
        for (index, count) in counts {
            match count {
                1 => shape.exposed.push(index),
                2 => shape.joined.push(index),
                _ => {
                    return Err(TreeError::AttachmentConflict {
                        node: node.to_string(),
                        index,
                    });
                }
            }
        }
        Ok(shape)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentKind {
    Leaf,
    Internal { children: Vec<NodeId> },
}

/// A vertex of a fragment tree.
///
/// Internal nodes fuse one item from every child on shared attachment labels; leaves screen
/// a named input pool.
pub struct FragmentNode {
    core: NodeCore<Structure>,
    kind: FragmentKind,
    ordinal: usize,
    shape: Shape,
    toolkit: Arc<dyn StructureToolkit>,
}

impl fmt::Debug for FragmentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentNode")
            .field("name", &self.core.name())
            .field("kind", &self.kind)
            .field("ordinal", &self.ordinal)
            .field("shape", &self.shape)
            .finish()
    }
}

impl FragmentNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, FragmentKind::Leaf)
    }

    pub fn kind(&self) -> &FragmentKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            FragmentKind::Leaf => &[],
            FragmentKind::Internal { children } => children,
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn signature(&self) -> &[u32] {
        &self.shape.exposed
    }

    /// Labels `structure`'s attachment points with this node's signature in every distinct
    /// way and keeps the labelings that pass [`screen`](CompositionNode::screen).
    ///
    /// A structure whose attachment count differs from the signature length yields nothing.
    pub fn map_and_screen(&self, structure: &Structure) -> Vec<Structure> {
        if structure.attachment_count() != self.signature().len() {
            return Vec::new();
        }
        attachment::mapping_permutations(structure.key(), self.signature(), true)
            .into_iter()
            .map(|repr| Structure::parse(&repr, self.toolkit.as_ref()))
            .filter(|candidate| self.screen(candidate))
            .collect()
    }

    #[instrument(skip_all, name = "fragment_leaf", fields(node = %self.name()))]
    fn assemble_leaf(
        &self,
        ctx: &AssemblyContext<'_, Structure>,
        state: &mut RunState<Structure>,
    ) -> Result<Pool<Structure>, EngineError> {
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

    #[instrument(skip_all, name = "fragment_node", fields(node = %self.name(), children = child_pools.len()))]
    fn assemble_from(
        &self,
        child_pools: Vec<Pool<Structure>>,
        ctx: &AssemblyContext<'_, Structure>,
        state: &mut RunState<Structure>,
    ) -> Pool<Structure> {
        ctx.reporter.report(Progress::NodeStart {
            name: self.name().to_string(),
        });
        // None when the product does not fit in a usize.
        let combinations = child_pools
            .iter()
            .map(Pool::len)
            .try_fold(1usize, |acc, len| acc.checked_mul(len));
        debug!(combinations = ?combinations, "Enumerating child product.");

        let output = {
            let mut source = LazySeq::new(cartesian_product(&child_pools));
            expand(self, &mut source, ctx)
        };
        info!(accepted = output.len(), "Fragment node assembled.");

        ctx.reporter.report(Progress::NodeFinish {
            name: self.name().to_string(),
            accepted: output.len(),
        });
        state.record(self.name(), child_pools, output.clone());
        output
    }
}

impl CompositionNode for FragmentNode {
    type Item = Structure;
    type Input = Vec<Arc<Structure>>;
    type Fused = std::iter::Once<Structure>;

    fn core(&self) -> &NodeCore<Structure> {
        &self.core
    }

    /// Rejects valid structures whose mapped attachment points differ from the signature
    /// before the template runs.
    fn screen(&self, item: &Structure) -> bool {
        if item.is_valid() && !item.matches_signature(self.signature()) {
            return self.core.reject(item, "attachment signature mismatch");
        }
        self.core.screen(item)
    }

    fn fuse_one(&self, input: &Self::Input) -> Self::Fused {
        let joined = input.iter().map(|item| item.key()).join(".");
        let fused = match self.toolkit.fuse_on_attachment_mapping(&joined) {
            Some(repr) => Structure::parse(&repr, self.toolkit.as_ref()),
            None => {
                debug!(node = %self.name(), input = %joined, "Fusion failed; product marked invalid.");
                Structure::invalid(joined.clone())
            }
        };
        fused.annotations().extend([
            Annotation::SourceNode(self.name().to_string()),
            Annotation::SourceItems(input.clone()),
            Annotation::InputRepresentation(joined),
        ]);
        std::iter::once(fused)
    }
}

enum Draft {
    Leaf { mapping: Vec<u32> },
    Internal { children: Vec<NodeId> },
}

struct DraftNode {
    name: String,
    template: Option<Arc<dyn Template<Structure>>>,
    draft: Draft,
}

/// Collects fragment nodes bottom-up; [`build`](Self::build) validates the tree and
/// computes every node's shape.
pub struct FragmentTreeBuilder {
    toolkit: Arc<dyn StructureToolkit>,
    drafts: SlotMap<NodeId, DraftNode>,
}

impl FragmentTreeBuilder {
    pub fn new(toolkit: Arc<dyn StructureToolkit>) -> Self {
        Self {
            toolkit,
            drafts: SlotMap::with_key(),
        }
    }

    /// Adds a leaf fed by the input pool called `name`, exposing the labels in `mapping`.
    pub fn leaf(
        &mut self,
        name: impl Into<String>,
        mapping: &[u32],
        template: Option<Arc<dyn Template<Structure>>>,
    ) -> NodeId {
        self.drafts.insert(DraftNode {
            name: name.into(),
            template,
            draft: Draft::Leaf {
                mapping: mapping.to_vec(),
            },
        })
    }

    pub fn node(
        &mut self,
        name: impl Into<String>,
        children: &[NodeId],
        template: Option<Arc<dyn Template<Structure>>>,
    ) -> Result<NodeId, TreeError> {
        let name = name.into();
        if children.is_empty() {
            return Err(TreeError::EmptyChildren { node: name });
        }
        if children.iter().any(|&child| !self.drafts.contains_key(child)) {
            return Err(TreeError::UnknownNode);
        }
        Ok(self.drafts.insert(DraftNode {
            name,
            template,
            draft: Draft::Internal {
                children: children.to_vec(),
            },
        }))
    }

    /// Builds the tree rooted at `root`. Nodes not reachable from `root` are discarded.
    pub fn build(mut self, root: NodeId) -> Result<FragmentTree, TreeError> {
        if !self.drafts.contains_key(root) {
            return Err(TreeError::UnknownNode);
        }

        let mut order: Vec<NodeId> = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut names: HashSet<String> = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let draft = self.drafts.get(id).ok_or(TreeError::UnknownNode)?;
            if !visited.insert(id) {
                return Err(TreeError::ChildReused {
                    node: draft.name.clone(),
                });
            }
            if !names.insert(draft.name.clone()) {
                return Err(TreeError::DuplicateName {
                    name: draft.name.clone(),
                });
            }
            order.push(id);
            if let Draft::Internal { children } = &draft.draft {
                stack.extend(children.iter().rev().copied());
            }
        }

        // Reverse pre-order visits every child before its parent.
        let mut shapes: SecondaryMap<NodeId, Shape> = SecondaryMap::new();
        for &id in order.iter().rev() {
            let draft = self.drafts.get(id).ok_or(TreeError::UnknownNode)?;
            let shape = match &draft.draft {
                Draft::Leaf { mapping } => Shape::leaf(&draft.name, mapping)?,
                Draft::Internal { children } => {
                    let child_shapes = children
                        .iter()
                        .map(|&child| shapes.get(child).ok_or(TreeError::UnknownNode))
                        .collect::<Result<Vec<_>, _>>()?;
                    Shape::combine(&draft.name, &child_shapes)?
                }
            };
            shapes.insert(id, shape);
        }

        let mut nodes: SecondaryMap<NodeId, FragmentNode> = SecondaryMap::new();
        for (idx, &id) in order.iter().enumerate() {
            let (Some(draft), Some(shape)) = (self.drafts.remove(id), shapes.remove(id)) else {
                return Err(TreeError::UnknownNode);
            };
            let kind = match draft.draft {
                Draft::Leaf { .. } => FragmentKind::Leaf,
                Draft::Internal { children } => FragmentKind::Internal { children },
            };
            nodes.insert(
                id,
                FragmentNode {
                    core: NodeCore::new(draft.name, draft.template),
                    kind,
                    ordinal: idx + 1,
                    shape,
                    toolkit: Arc::clone(&self.toolkit),
                },
            );
        }
        if !self.drafts.is_empty() {
            debug!(
                discarded = self.drafts.len(),
                "Discarding nodes unreachable from the root."
            );
        }

        Ok(FragmentTree { root, order, nodes })
    }
}

#[derive(Debug)]
pub struct FragmentTree {
    root: NodeId,
    order: Vec<NodeId>,
    nodes: SecondaryMap<NodeId, FragmentNode>,
}

impl FragmentTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&FragmentNode> {
        self.nodes.get(id)
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .find(|(_, node)| node.name() == name)
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FragmentNode)> {
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

    /// One line per node with its ordinal and exposed labels, children indented by a tab.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        self.render_into(self.root, 0, &mut lines);
        lines.join("\n")
    }

    fn render_into(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        lines.push(format!(
            "{}{} (#{}) exposes {:?}",
            "\t".repeat(depth),
            node.name(),
            node.ordinal(),
            node.signature()
        ));
        for &child in node.children() {
            self.render_into(child, depth + 1, lines);
        }
    }

    fn assemble_node(
        &self,
        id: NodeId,
        ctx: &AssemblyContext<'_, Structure>,
        state: &mut RunState<Structure>,
    ) -> Result<Pool<Structure>, EngineError> {
        let node = self.nodes.get(id).ok_or(TreeError::UnknownNode)?;
        match &node.kind {
            FragmentKind::Leaf => node.assemble_leaf(ctx, state),
            FragmentKind::Internal { children } => {
                let child_pools = children
                    .iter()
                    .map(|&child| self.assemble_node(child, ctx, state))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(node.assemble_from(child_pools, ctx, state))
            }
        }
    }
}

impl fmt::Display for FragmentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl AssemblyGraph for FragmentTree {
    type Item = Structure;

    fn root(&self) -> NodeId {
        self.root
    }

    fn leaf_names(&self) -> Vec<&str> {
        FragmentTree::leaf_names(self)
    }

    fn assemble(
        &self,
        ctx: &AssemblyContext<'_, Structure>,
        state: &mut RunState<Structure>,
    ) -> Result<Pool<Structure>, EngineError> {
        self.assemble_node(self.root, ctx, state)
    }
}
