use crate::core::models::item::Item;
use crate::core::pools::Pool;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug)]
pub struct NodeRecord<T> {
    pub node: String,
    pub inputs: Vec<Pool<T>>,
    pub outputs: Pool<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub node: String,
    pub input_sizes: Vec<usize>,
    pub output_size: usize,
}

/// Per-run record of every node's inputs and outputs, in completion order.
///
/// Used for auditing only; nothing in the engine reads it back.
#[derive(Debug)]
pub struct ProvenanceLog<T> {
    records: Vec<NodeRecord<T>>,
}

impl<T> Default for ProvenanceLog<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Item> ProvenanceLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a node's pools. A node is recorded at most once; later records are dropped.
    pub fn record(&mut self, node: &str, inputs: Vec<Pool<T>>, outputs: Pool<T>) {
        if self.get(node).is_some() {
            warn!(node, "Provenance for node already recorded; ignoring duplicate.");
            return;
        }
        self.records.push(NodeRecord {
            node: node.to_string(),
            inputs,
            outputs,
        });
    }

    pub fn get(&self, node: &str) -> Option<&NodeRecord<T>> {
        self.records.iter().find(|record| record.node == node)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeRecord<T>> {
        self.records.iter()
    }

    pub fn nodes(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.node.as_str()).collect()
    }

    pub fn summary(&self) -> Vec<NodeSummary> {
        self.records
            .iter()
            .map(|record| NodeSummary {
                node: record.node.clone(),
                input_sizes: record.inputs.iter().map(Pool::len).collect(),
                output_size: record.outputs.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::structure::Structure;

    fn pool_of(keys: &[&str]) -> Pool<Structure> {
        Pool::from_items(keys.iter().map(|k| Structure::from_canonical(*k)))
    }

    #[test]
    fn summary_lists_pool_sizes_in_completion_order() {
        let mut log = ProvenanceLog::new();
        log.record("a", vec![pool_of(&["C", "N"])], pool_of(&["C"]));
        log.record("root", vec![pool_of(&["C"]), pool_of(&["O"])], pool_of(&["CO"]));

        assert_eq!(log.nodes(), vec!["a", "root"]);
        assert_eq!(
            log.summary(),
            vec![
                NodeSummary {
                    node: "a".to_string(),
                    input_sizes: vec![2],
                    output_size: 1,
                },
                NodeSummary {
                    node: "root".to_string(),
                    input_sizes: vec![1, 1],
                    output_size: 1,
                },
            ]
        );
    }

    #[test]
    fn duplicate_record_keeps_first_entry() {
        let mut log = ProvenanceLog::new();
        log.record("a", vec![], pool_of(&["C"]));
        log.record("a", vec![], pool_of(&["N", "O"]));

        assert_eq!(log.len(), 1);
        assert_eq!(log.get("a").unwrap().outputs.keys(), vec!["C"]);
    }
}
