use crate::data::DatasetIterator;
use crate::error::TreeError;
use std::sync::Arc;

/// A basic collection of items with a predefined size.
pub trait Dataset<I>: Send + Sync {
    /// Gets the item at the given index.
    fn get(&self, index: usize) -> Option<I>;

    /// Gets the number of items in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the dataset.
    fn iter(&self) -> DatasetIterator<'_, I>
    where
        Self: Sized,
    {
        DatasetIterator::new(self)
    }
}

/// A dataset that can materialize a whole mini-batch from row indices at
/// once, the way a dataloader consumes it.
pub trait BatchDataset<O>: Send + Sync {
    /// Builds the batch for the given row indices.
    fn get_batch(&self, indices: &[usize]) -> Result<O, TreeError>;

    /// Gets the number of rows in the dataset.
    fn len(&self) -> usize;

    /// Checks if the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D, I> Dataset<I> for Arc<D>
where
    D: Dataset<I>,
{
    fn get(&self, index: usize) -> Option<I> {
        self.as_ref().get(index)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

impl<I> Dataset<I> for Arc<dyn Dataset<I>> {
    fn get(&self, index: usize) -> Option<I> {
        self.as_ref().get(index)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

impl<D, O> BatchDataset<O> for Arc<D>
where
    D: BatchDataset<O>,
{
    fn get_batch(&self, indices: &[usize]) -> Result<O, TreeError> {
        self.as_ref().get_batch(indices)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

impl<O> BatchDataset<O> for Arc<dyn BatchDataset<O>> {
    fn get_batch(&self, indices: &[usize]) -> Result<O, TreeError> {
        self.as_ref().get_batch(indices)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}

impl<O> BatchDataset<O> for Box<dyn BatchDataset<O>> {
    fn get_batch(&self, indices: &[usize]) -> Result<O, TreeError> {
        self.as_ref().get_batch(indices)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }
}
