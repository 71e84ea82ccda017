use std::collections::VecDeque;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkId(pub u64);

/// First-in first-out queue of pending work.
///
/// Items pop in arrival order across separate pushes, and every item gets a
/// monotonically increasing [`WorkId`] for tracing.
#[derive(Debug)]
pub struct WorkQueue<T> {
    next_id: u64,
    items: VecDeque<(WorkId, T)>,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: VecDeque::new(),
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, payload: T) -> WorkId {
        let id = WorkId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.items.push_back((id, payload));
        id
    }

    /// Appends a batch to the tail, keeping the batch's own order.
    pub fn extend<I>(&mut self, payloads: I) -> Vec<WorkId>
    where
        I: IntoIterator<Item = T>,
    {
        payloads.into_iter().map(|p| self.push(p)).collect()
    }

    pub fn pop_next(&mut self) -> Option<(WorkId, T)> {
        self.items.pop_front()
    }

}
