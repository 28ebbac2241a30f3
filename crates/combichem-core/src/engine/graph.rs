use super::context::{AssemblyContext, RunState};
use super::error::EngineError;
use crate::core::models::ids::NodeId;
use crate::core::models::item::Item;
use crate::core::pools::Pool;

/// A built composition tree that can be assembled from its root.
pub trait AssemblyGraph {
    type Item: Item;

    fn root(&self) -> NodeId;

    /// Names of every leaf, each of which needs an entry in the input-pool map.
    fn leaf_names(&self) -> Vec<&str>;

    /// Assembles the root, assembling upstream nodes first.
    fn assemble(
        &self,
        ctx: &AssemblyContext<'_, Self::Item>,
        state: &mut RunState<Self::Item>,
    ) -> Result<Pool<Self::Item>, EngineError>;
}
