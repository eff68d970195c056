/// A strategy to batch items.
pub trait BatchStrategy<I>: Send + Sync {
    /// Adds an item to the strategy.
    fn add(&mut self, item: I);

    /// Emits a batch if one is ready; `force` flushes whatever is pending.
    fn batch(&mut self, force: bool) -> Option<Vec<I>>;

    /// Creates a fresh strategy of the same type.
    fn clone_dyn(&self) -> Box<dyn BatchStrategy<I>>;
}

/// A strategy to batch items with a fixed batch size.
pub struct FixBatchStrategy<I> {
    items: Vec<I>,
    batch_size: usize,
}

impl<I> FixBatchStrategy<I> {
    /// Creates a new strategy emitting batches of `batch_size` items.
    pub fn new(batch_size: usize) -> Self {
        Self {
            items: Vec::with_capacity(batch_size),
            batch_size,
        }
    }
}

impl<I: Send + Sync + 'static> BatchStrategy<I> for FixBatchStrategy<I> {
    fn add(&mut self, item: I) {
        self.items.push(item);
    }

    fn batch(&mut self, force: bool) -> Option<Vec<I>> {
        let ready = self.items.len() >= self.batch_size;
        if self.items.is_empty() || !(ready || force) {
            return None;
        }

        let fresh = Vec::with_capacity(self.batch_size);
        Some(std::mem::replace(&mut self.items, fresh))
    }

    fn clone_dyn(&self) -> Box<dyn BatchStrategy<I>> {
        Box::new(Self::new(self.batch_size))
    }
}
