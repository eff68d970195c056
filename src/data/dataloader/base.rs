use serde::{Deserialize, Serialize};

/// The progress of a dataloader iteration.
#[derive(new, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// The number of items processed so far.
    pub items_processed: usize,
    /// The total number of items to process.
    pub items_total: usize,
}

/// An iterator over mini-batches that reports its progress.
pub trait DataLoaderIterator<O>: Iterator<Item = O> {
    /// The progress through the current iteration.
    fn progress(&self) -> Progress;
}

/// A data loader yielding mini-batches over a dataset.
pub trait DataLoader<O>: Send + Sync {
    /// Returns an iterator over the batches of one pass.
    fn iter(&self) -> Box<dyn DataLoaderIterator<O> + '_>;

    /// The number of items in the underlying dataset.
    fn len(&self) -> usize;

    /// Checks if the underlying dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
