use super::request::{GenerationRequest, RequestId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Queued,
    Processing,
}

/// A request waiting in (or currently at the head of) the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub request: GenerationRequest,
    pub status: QueueStatus,
}

impl QueueEntry {
    pub fn queued(request: GenerationRequest) -> Self {
        Self {
            request,
            status: QueueStatus::Queued,
        }
    }

    pub fn id(&self) -> RequestId {
        self.request.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Processing,
    Completed,
    Failed,
}

impl HistoryStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, HistoryStatus::Processing)
    }
}

/// Gallery record for a request. `result_image` is set iff completed, `error` iff failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub request: GenerationRequest,
    pub status: HistoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryEntry {
    pub fn processing(request: GenerationRequest) -> Self {
        Self {
            request,
            status: HistoryStatus::Processing,
            result_image: None,
            error: None,
        }
    }

    pub fn id(&self) -> RequestId {
        self.request.id
    }
}
