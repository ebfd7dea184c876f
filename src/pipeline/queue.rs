use crate::models::{QueueEntry, QueueStatus};
use std::collections::VecDeque;

/// Bounded FIFO of pending requests. Only the head can be inspected or removed.
#[derive(Debug)]
pub struct RequestQueue {
    entries: VecDeque<QueueEntry>,
    capacity: usize,
}

impl RequestQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Hands the entry back if the queue is already at capacity.
    pub fn push_back(&mut self, entry: QueueEntry) -> Result<(), QueueEntry> {
        if self.is_full() {
            return Err(entry);
        }
        self.entries.push_back(entry);
        Ok(())
    }

    pub fn front(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    /// Flags the head as processing and returns it. `None` if the queue is empty.
    pub fn begin_head(&mut self) -> Option<&QueueEntry> {
        let head = self.entries.front_mut()?;
        head.status = QueueStatus::Processing;
        Some(head)
    }

    pub fn pop_front(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    /// Drops every entry that has not started. The in-flight head stays for its
    /// dispatcher to pop. Returns how many were dropped.
    pub fn drop_waiting(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.status == QueueStatus::Processing);
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub fn processing_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == QueueStatus::Processing)
            .count()
    }
}
