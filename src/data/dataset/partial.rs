use crate::data::BatchDataset;
use crate::error::TreeError;
use std::sync::Arc;

/// A contiguous sub-range view over another dataset, used to split work
/// across dataloader workers.
pub struct PartialDataset<O> {
    dataset: Arc<dyn BatchDataset<O>>,
    start_index: usize,
    end_index: usize,
}

impl<O> PartialDataset<O> {
    /// Creates a view over the rows `start_index..end_index`.
    pub fn new(dataset: Arc<dyn BatchDataset<O>>, start_index: usize, end_index: usize) -> Self {
        Self {
            dataset,
            start_index,
            end_index,
        }
    }

    /// Splits the dataset into `num` contiguous partials; the last partial
    /// takes the remainder. Zero partials make no sense, so `num` is
    /// clamped to at least one.
    pub fn split(dataset: Arc<dyn BatchDataset<O>>, num: usize) -> Vec<PartialDataset<O>> {
        let num = num.max(1);
        let chunk = dataset.len() / num;
        let mut partials = Vec::with_capacity(num);
        let mut current = 0;

        for worker in 0..num {
            let end = if worker + 1 == num {
                dataset.len()
            } else {
                current + chunk
            };
            partials.push(PartialDataset::new(dataset.clone(), current, end));
            current = end;
        }

        partials
    }
}

impl<O> BatchDataset<O> for PartialDataset<O>
where
    O: Send + Sync,
{
    fn get_batch(&self, indices: &[usize]) -> Result<O, TreeError> {
        let indices: Vec<usize> = indices
            .iter()
            .map(|index| index + self.start_index)
            .collect();
        for &index in indices.iter() {
            if index >= self.end_index {
                return Err(TreeError::IndexOutOfBounds {
                    index: index - self.start_index,
                    len: self.len(),
                });
            }
        }
        self.dataset.get_batch(&indices)
    }

    fn len(&self) -> usize {
        self.end_index - self.start_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TreeDataset;
    use crate::tuplefy;
    use crate::value::{ArrayData, Value};

    fn dataset() -> Arc<dyn BatchDataset<crate::TupleLeaf<Value>>> {
        let x: Value = ArrayData::from_vec((0..10).map(|v| v as f32).collect(), [10]).into();
        Arc::new(TreeDataset::new(tuplefy![x]).unwrap())
    }

    #[test]
    fn split_covers_all_rows() {
        let partials = PartialDataset::split(dataset(), 3);
        assert_eq!(partials.len(), 3);
        assert_eq!(partials.iter().map(|p| p.len()).sum::<usize>(), 10);
        assert_eq!(partials[2].len(), 4);
    }

    #[test]
    fn split_clamps_zero_partitions() {
        let partials = PartialDataset::split(dataset(), 0);
        assert_eq!(partials.len(), 1);
        assert_eq!(partials[0].len(), 10);
    }

    #[test]
    fn get_batch_offsets_indices() {
        let partials = PartialDataset::split(dataset(), 2);
        let batch = partials[1].get_batch(&[0]).unwrap();
        let expected: Value = ArrayData::from_vec(vec![5.0f32], [1]).into();
        assert_eq!(batch, tuplefy![expected]);
        assert!(partials[1].get_batch(&[5]).is_err());
    }
}
