use crate::{
    error::GenerationError,
    models::{HistoryEntry, HistoryStatus, RequestId},
};
use std::collections::VecDeque;

/// Session gallery, newest first. Entries are only ever removed all at once.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    pub fn get(&self, id: RequestId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.get(id).is_some()
    }

    /// Records the terminal outcome for `id`. Returns false if the entry is gone (history
    /// was cleared) or already terminal; neither case changes anything.
    pub fn finish(&mut self, id: RequestId, outcome: &Result<String, GenerationError>) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id() == id) else {
            return false;
        };
        if entry.status.is_terminal() {
            return false;
        }

        match outcome {
            Ok(data_uri) => {
                entry.status = HistoryStatus::Completed;
                entry.result_image = Some(data_uri.clone());
            }
            Err(err) => {
                entry.status = HistoryStatus::Failed;
                entry.error = Some(err.to_string());
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
