use crate::error::TreeError;
use crate::tree::TupleLeaf;
use crate::value::Value;
use std::ops::Range;

/// A row index applied uniformly to every leaf payload along dim 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIndex {
    /// A single row; drops the batch dimension.
    Index(usize),
    /// A contiguous range of rows, clamped like a slice.
    Range(Range<usize>),
    /// An explicit list of rows, gathered in order.
    Indices(Vec<usize>),
}

impl From<usize> for RowIndex {
    fn from(index: usize) -> Self {
        RowIndex::Index(index)
    }
}

impl From<Range<usize>> for RowIndex {
    fn from(range: Range<usize>) -> Self {
        RowIndex::Range(range)
    }
}

impl From<Vec<usize>> for RowIndex {
    fn from(indices: Vec<usize>) -> Self {
        RowIndex::Indices(indices)
    }
}

impl From<&[usize]> for RowIndex {
    fn from(indices: &[usize]) -> Self {
        RowIndex::Indices(indices.to_vec())
    }
}

/// Row-wise positional indexing view bound to a tree, like a dataframe's
/// `iloc`: indexing applies the row index to every leaf, returning a new
/// tree of the same topology.
pub struct Iloc<'a> {
    tree: &'a TupleLeaf<Value>,
}

impl<'a> Iloc<'a> {
    pub(crate) fn new(tree: &'a TupleLeaf<Value>) -> Self {
        Self { tree }
    }

    /// Applies the index to every leaf payload.
    pub fn get(&self, index: impl Into<RowIndex>) -> Result<TupleLeaf<Value>, TreeError> {
        let index = index.into();
        self.tree.try_map(|value| value.select(&index))
    }
}

impl TupleLeaf<Value> {
    /// Row-wise positional indexing over every leaf payload.
    pub fn iloc(&self) -> Iloc<'_> {
        Iloc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuplefy;
    use crate::value::{ArrayData, Shape};

    fn tree() -> TupleLeaf<Value> {
        let x: Value = ArrayData::from_vec(vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0], [3, 2]).into();
        let y: Value = ArrayData::from_vec(vec![10i64, 11, 12], [3]).into();
        tuplefy![x, [y]]
    }

    #[test]
    fn iloc_applies_to_every_leaf() {
        let batch = tree().iloc().get(vec![0, 2]).unwrap();
        let shapes = batch.shapes().unwrap();
        assert_eq!(shapes, tuplefy![Shape::from([2, 2]), [Shape::from([2])]]);
    }

    #[test]
    fn iloc_single_index_drops_batch_dim() {
        let row = tree().iloc().get(1).unwrap();
        assert_eq!(
            row.shapes().unwrap(),
            tuplefy![Shape::from([2]), [Shape::from([])]]
        );
    }

    #[test]
    fn iloc_range_slices_rows() {
        let sliced = tree().iloc().get(1..3).unwrap();
        assert_eq!(
            sliced.shapes().unwrap(),
            tuplefy![Shape::from([2, 2]), [Shape::from([2])]]
        );
    }
}
