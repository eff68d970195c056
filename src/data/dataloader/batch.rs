use crate::data::{BatchDataset, BatchStrategy, DataLoader, DataLoaderIterator, Progress};
use rand::prelude::SliceRandom;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex, PoisonError};

/// A data loader that yields mini-batches by slicing a batch dataset with
/// fixed-size groups of row indices.
///
/// Every index handed to the dataset is below `dataset.len()`, so a dataset
/// honoring its length contract never fails a batch. If one fails anyway,
/// the error is logged and the iteration ends instead of panicking.
pub struct BatchDataLoader<O> {
    strategy: Box<dyn BatchStrategy<usize>>,
    dataset: Arc<dyn BatchDataset<O>>,
    rng: Option<Mutex<StdRng>>,
}

impl<O> BatchDataLoader<O> {
    /// Creates a new batch data loader.
    ///
    /// When an rng is given, the row order is reshuffled every time a new
    /// iterator is created.
    pub fn new(
        strategy: Box<dyn BatchStrategy<usize>>,
        dataset: Arc<dyn BatchDataset<O>>,
        rng: Option<StdRng>,
    ) -> Self {
        Self {
            strategy,
            dataset,
            rng: rng.map(Mutex::new),
        }
    }
}

struct BatchDataLoaderIterator<'a, O> {
    current_index: usize,
    items_processed: usize,
    indices: Vec<usize>,
    strategy: Box<dyn BatchStrategy<usize>>,
    dataset: &'a dyn BatchDataset<O>,
}

impl<O> DataLoader<O> for BatchDataLoader<O>
where
    O: Send + Sync,
{
    fn iter(&self) -> Box<dyn DataLoaderIterator<O> + '_> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if let Some(lock) = &self.rng {
            let mut rng = lock.lock().unwrap_or_else(PoisonError::into_inner);
            indices.shuffle(&mut *rng);
        }

        Box::new(BatchDataLoaderIterator {
            current_index: 0,
            items_processed: 0,
            indices,
            strategy: self.strategy.clone_dyn(),
            dataset: self.dataset.as_ref(),
        })
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl<O> BatchDataLoaderIterator<'_, O> {
    fn load(&mut self, batch_indices: Vec<usize>) -> Option<O> {
        self.items_processed += batch_indices.len();
        match self.dataset.get_batch(&batch_indices) {
            Ok(batch) => Some(batch),
            Err(err) => {
                // Only reachable when the dataset breaks its length contract.
                log::error!("failed to load batch: {err}");
                None
            }
        }
    }
}

impl<O> Iterator for BatchDataLoaderIterator<'_, O> {
    type Item = O;

    fn next(&mut self) -> Option<O> {
        while self.current_index < self.indices.len() {
            self.strategy.add(self.indices[self.current_index]);
            self.current_index += 1;

            if let Some(batch_indices) = self.strategy.batch(false) {
                return self.load(batch_indices);
            }
        }

        let batch_indices = self.strategy.batch(true)?;
        self.load(batch_indices)
    }
}

impl<O> DataLoaderIterator<O> for BatchDataLoaderIterator<'_, O> {
    fn progress(&self) -> Progress {
        Progress::new(self.items_processed, self.indices.len())
    }
}
