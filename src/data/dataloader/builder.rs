use crate::data::{
    BatchDataLoader, BatchDataset, BatchStrategy, DataLoader, FixBatchStrategy,
    MultiThreadDataLoader, PartialDataset, TreeDataset,
};
use crate::error::TreeError;
use crate::tree::TupleLeaf;
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;

/// A builder for data loaders.
pub struct DataLoaderBuilder<O> {
    strategy: Option<Box<dyn BatchStrategy<usize>>>,
    num_threads: Option<usize>,
    shuffle: Option<u64>,
    _p: std::marker::PhantomData<O>,
}

impl<O> Default for DataLoaderBuilder<O>
where
    O: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<O> DataLoaderBuilder<O>
where
    O: Send + Sync + 'static,
{
    /// Creates a new builder with a batch size of one, no shuffling and no
    /// worker threads.
    pub fn new() -> Self {
        Self {
            strategy: None,
            num_threads: None,
            shuffle: None,
            _p: std::marker::PhantomData,
        }
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.strategy = Some(Box::new(FixBatchStrategy::new(batch_size)));
        self
    }

    /// Shuffles the rows with the given seed on every pass.
    pub fn shuffle(mut self, seed: u64) -> Self {
        self.shuffle = Some(seed);
        self
    }

    /// Sets the number of background worker threads.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_threads = Some(num_workers);
        self
    }

    /// Builds the data loader.
    pub fn build<D>(self, dataset: D) -> Arc<dyn DataLoader<O>>
    where
        D: BatchDataset<O> + 'static,
    {
        let dataset: Arc<dyn BatchDataset<O>> = Arc::new(dataset);
        let strategy = self
            .strategy
            .unwrap_or_else(|| Box::new(FixBatchStrategy::new(1)));
        let mut rng = self.shuffle.map(StdRng::seed_from_u64);

        // Zero workers means no background threads at all.
        if let Some(num_threads) = self.num_threads.filter(|&num| num > 0) {
            log::debug!("building a data loader with {num_threads} workers");
            let dataloaders = PartialDataset::split(dataset, num_threads)
                .into_iter()
                .map(|partial| {
                    let rng = rng.as_mut().map(|rng| StdRng::seed_from_u64(rng.next_u64()));
                    Arc::new(BatchDataLoader::new(
                        strategy.clone_dyn(),
                        Arc::new(partial),
                        rng,
                    ))
                })
                .collect();
            return Arc::new(MultiThreadDataLoader::new(dataloaders));
        }

        Arc::new(BatchDataLoader::new(strategy, dataset, rng))
    }
}

/// Builds a data loader over the rows of a value tree.
///
/// When `to_tensor` is set, array payloads are first promoted to tensors on
/// the default device, so every batch comes out as a tensor tree. With
/// `shuffle`, the row order is redrawn from a random seed on every pass.
pub fn make_dataloader(
    data: &TupleLeaf<Value>,
    batch_size: usize,
    shuffle: bool,
    num_workers: usize,
    to_tensor: bool,
) -> Result<Arc<dyn DataLoader<TupleLeaf<Value>>>, TreeError> {
    make_dataloader_with(data, batch_size, shuffle, num_workers, to_tensor, TreeDataset::new)
}

/// Like [`make_dataloader`], but the canonicalized tree is wrapped by
/// `factory` instead of [`TreeDataset`].
pub fn make_dataloader_with<D, F>(
    data: &TupleLeaf<Value>,
    batch_size: usize,
    shuffle: bool,
    num_workers: usize,
    to_tensor: bool,
    factory: F,
) -> Result<Arc<dyn DataLoader<TupleLeaf<Value>>>, TreeError>
where
    D: BatchDataset<TupleLeaf<Value>> + 'static,
    F: FnOnce(TupleLeaf<Value>) -> Result<D, TreeError>,
{
    let data = if to_tensor { data.to_tensor()? } else { data.clone() };
    let dataset = factory(data)?;

    let mut builder = DataLoaderBuilder::new().batch_size(batch_size);
    if shuffle {
        builder = builder.shuffle(rand::random());
    }
    if num_workers > 0 {
        builder = builder.num_workers(num_workers);
    }

    Ok(builder.build(dataset))
}

impl TupleLeaf<Value> {
    /// Builds a data loader over the rows of this tree, promoting arrays to
    /// tensors first.
    pub fn make_dataloader(
        &self,
        batch_size: usize,
        shuffle: bool,
        num_workers: usize,
    ) -> Result<Arc<dyn DataLoader<TupleLeaf<Value>>>, TreeError> {
        make_dataloader(self, batch_size, shuffle, num_workers, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuplefy;
    use crate::value::{ArrayData, Value, ValueKind};

    fn data() -> TupleLeaf<Value> {
        let x: Value = ArrayData::from_vec((0..6).map(|v| v as f32).collect(), [6]).into();
        let y: Value = ArrayData::from_vec(vec![0i64, 1, 0, 1, 0, 1], [6]).into();
        tuplefy![x, y]
    }

    #[test]
    fn builder_defaults_to_single_row_batches() {
        let dataset = TreeDataset::new(data()).unwrap();
        let dataloader: Arc<dyn DataLoader<TupleLeaf<Value>>> =
            DataLoaderBuilder::new().build(dataset);
        assert_eq!(dataloader.iter().count(), 6);
    }

    #[test]
    fn make_dataloader_promotes_to_tensors() {
        let dataloader = make_dataloader(&data(), 2, false, 0, true).unwrap();
        assert_eq!(dataloader.len(), 6);

        let batches: Vec<_> = dataloader.iter().collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].kind().unwrap(), ValueKind::Tensor);
        assert_eq!(
            batches[0].lens().unwrap().get_if_all_equal(),
            Some(&crate::Node::Leaf(2))
        );
    }

    #[test]
    fn make_dataloader_keeps_arrays_without_promotion() {
        let dataloader = make_dataloader(&data(), 3, false, 0, false).unwrap();
        let batch = dataloader.iter().next().unwrap();
        assert_eq!(batch.kind().unwrap(), ValueKind::Array);
    }

    #[test]
    fn zero_workers_loads_on_the_calling_thread() {
        let dataset = TreeDataset::new(data()).unwrap();
        let dataloader: Arc<dyn DataLoader<TupleLeaf<Value>>> = DataLoaderBuilder::new()
            .batch_size(2)
            .num_workers(0)
            .build(dataset);
        assert_eq!(dataloader.iter().count(), 3);
    }

    #[test]
    fn factory_override_wraps_the_tree() {
        let dataloader =
            make_dataloader_with(&data(), 2, false, 0, false, |tree| {
                TreeDataset::new(tree.flatten())
            })
            .unwrap();
        assert_eq!(dataloader.len(), 6);
    }

    #[test]
    fn multi_worker_loader_covers_every_row() {
        let dataloader = data().make_dataloader(2, true, 2).unwrap();
        assert_eq!(dataloader.len(), 6);

        let total: usize = dataloader
            .iter()
            .map(|batch| *batch.lens().unwrap().leaf_values()[0])
            .sum();
        assert_eq!(total, 6);
    }
}
