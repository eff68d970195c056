use crate::data::{BatchDataset, Dataset};
use crate::error::TreeError;
use crate::tree::{Node, TupleLeaf};
use crate::value::{Value, ValueKind};

/// An index-based dataset over a tree of numeric payloads.
///
/// Every leaf is indexed along dim 0, so one item is a single-row slice of
/// the whole tree and one batch is a multi-row slice, both with the tree's
/// topology.
pub struct TreeDataset {
    tree: TupleLeaf<Value>,
    len: usize,
}

impl TreeDataset {
    /// Wraps a tree, validating that every leaf shares one representation
    /// and one dim-0 length.
    pub fn new(tree: TupleLeaf<Value>) -> Result<Self, TreeError> {
        if tree.kind()? == ValueKind::Shape {
            return Err(TreeError::UnsupportedPayload {
                op: "dataset",
                kind: ValueKind::Shape,
            });
        }
        let lens = tree.lens()?.flatten();
        let len = match lens.get_if_all_equal() {
            Some(Node::Leaf(len)) => *len,
            _ => {
                return Err(TreeError::TopologyMismatch(
                    "leaves disagree on their dim-0 length".to_string(),
                ))
            }
        };
        Ok(Self { tree, len })
    }

    /// The underlying tree.
    pub fn tree(&self) -> &TupleLeaf<Value> {
        &self.tree
    }
}

impl Dataset<TupleLeaf<Value>> for TreeDataset {
    fn get(&self, index: usize) -> Option<TupleLeaf<Value>> {
        if index >= self.len {
            return None;
        }
        self.tree.iloc().get(vec![index]).ok()
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl BatchDataset<TupleLeaf<Value>> for TreeDataset {
    fn get_batch(&self, indices: &[usize]) -> Result<TupleLeaf<Value>, TreeError> {
        self.tree.iloc().get(indices)
    }

    fn len(&self) -> usize {
        self.len
    }
}
