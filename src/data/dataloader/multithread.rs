use crate::data::{BatchDataLoader, DataLoader, DataLoaderIterator, Progress};
use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;

const MAX_QUEUED_BATCHES: usize = 100;

/// A data loader that loads batches on multiple background threads, one per
/// partition of the underlying dataset.
pub struct MultiThreadDataLoader<O> {
    dataloaders: Vec<Arc<BatchDataLoader<O>>>,
}

/// A message sent by a worker thread.
#[derive(Debug)]
pub enum Message<O> {
    /// A batch from the worker with the given id, with its local progress.
    Batch(usize, O, Progress),
    /// The worker with the given id has exhausted its partition.
    Done(usize),
}

struct MultiThreadDataLoaderIterator<O> {
    workers: Vec<thread::JoinHandle<()>>,
    receiver: mpsc::Receiver<Message<O>>,
    num_done: usize,
    progresses: HashMap<usize, Progress>,
}

impl<O> MultiThreadDataLoader<O> {
    /// Creates a new multi-threaded data loader from the given workers.
    pub fn new(dataloaders: Vec<Arc<BatchDataLoader<O>>>) -> Self {
        Self { dataloaders }
    }
}

impl<O> DataLoader<O> for MultiThreadDataLoader<O>
where
    O: Send + Sync + 'static,
{
    fn iter(&self) -> Box<dyn DataLoaderIterator<O> + '_> {
        let (sender, receiver) = mpsc::sync_channel(MAX_QUEUED_BATCHES);

        let workers = self
            .dataloaders
            .iter()
            .enumerate()
            .map(|(index, dataloader)| {
                let dataloader = dataloader.clone();
                let sender = sender.clone();

                thread::spawn(move || {
                    let mut iterator = dataloader.iter();
                    while let Some(batch) = iterator.next() {
                        let progress = iterator.progress();
                        if sender.send(Message::Batch(index, batch, progress)).is_err() {
                            return;
                        }
                    }
                    // The receiver may already be dropped when the consumer
                    // stops iterating early.
                    sender.send(Message::Done(index)).ok();
                })
            })
            .collect();

        Box::new(MultiThreadDataLoaderIterator {
            workers,
            receiver,
            num_done: 0,
            progresses: HashMap::new(),
        })
    }

    fn len(&self) -> usize {
        self.dataloaders
            .iter()
            .map(|dataloader| dataloader.len())
            .sum()
    }
}

impl<O> Iterator for MultiThreadDataLoaderIterator<O> {
    type Item = O;

    fn next(&mut self) -> Option<O> {
        if self.num_done == self.workers.len() {
            return None;
        }

        loop {
            let message = self.receiver.recv().ok()?;

            match message {
                Message::Batch(index, batch, progress) => {
                    self.progresses.insert(index, progress);
                    return Some(batch);
                }
                Message::Done(_) => {
                    self.num_done += 1;
                    if self.num_done == self.workers.len() {
                        for worker in self.workers.drain(..) {
                            worker.join().expect("worker thread panicked");
                        }
                        return None;
                    }
                }
            }
        }
    }
}

impl<O> DataLoaderIterator<O> for MultiThreadDataLoaderIterator<O> {
    fn progress(&self) -> Progress {
        let mut items_processed = 0;
        let mut items_total = 0;
        for progress in self.progresses.values() {
            items_processed += progress.items_processed;
            items_total += progress.items_total;
        }
        Progress::new(items_processed, items_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BatchDataset, FixBatchStrategy, PartialDataset, TreeDataset};
    use crate::tree::TupleLeaf;
    use crate::tuplefy;
    use crate::value::{ArrayData, Value};
    use crate::Node;

    #[test]
    fn yields_every_row_across_workers() {
        let x: Value = ArrayData::from_vec((0..12).map(|v| v as f32).collect(), [12]).into();
        let dataset: Arc<dyn BatchDataset<TupleLeaf<Value>>> =
            Arc::new(TreeDataset::new(tuplefy![x]).unwrap());

        let dataloaders = PartialDataset::split(dataset, 3)
            .into_iter()
            .map(|partial| {
                Arc::new(BatchDataLoader::new(
                    Box::new(FixBatchStrategy::new(2)),
                    Arc::new(partial),
                    None,
                ))
            })
            .collect();
        let dataloader = MultiThreadDataLoader::new(dataloaders);
        assert_eq!(dataloader.len(), 12);

        let mut values: Vec<f32> = dataloader
            .iter()
            .flat_map(|batch| match &batch[0] {
                Node::Leaf(Value::Array(array)) => array.as_slice::<f32>().unwrap().to_vec(),
                _ => unreachable!(),
            })
            .collect();
        values.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..12).map(|v| v as f32).collect();
        assert_eq!(values, expected);
    }
}
