pub mod admission;
pub mod clock;
mod engine;
pub mod history;
pub mod queue;
pub mod validator;

use crate::{
    config::QueueConfig,
    error::{AdmissionError, GenerationError, Result},
    generation::{GenerationClient, ImageProvider},
    models::{
        GenerationRequest, HistoryEntry, PromptInput, QueueEntry, RequestId, User,
        ValidatedPrompt,
    },
};
use admission::AdmissionController;
use chrono::Utc;
use engine::{EngineSignal, ExecutionEngine};
use futures::stream::Stream;
use history::HistoryStore;
use queue::RequestQueue;
use serde::Serialize;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, Notify};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

pub use clock::{Clock, ManualClock, SystemClock};

const EVENT_BUFFER: usize = 256;

/// State changes pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Queued { id: RequestId },
    Started { id: RequestId },
    Completed { id: RequestId },
    Failed { id: RequestId, error: String },
    HistoryCleared,
}

/// Read-only copy of everything a presentation layer renders.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub user: Option<User>,
    pub queue: Vec<QueueEntry>,
    pub history: Vec<HistoryEntry>,
    pub latest: Option<HistoryEntry>,
    pub processing: bool,
}

pub(crate) struct PipelineState {
    user: Option<User>,
    queue: RequestQueue,
    history: HistoryStore,
    latest: Option<RequestId>,
    admission: AdmissionController,
    busy: bool,
}

impl PipelineState {
    fn new(config: &QueueConfig) -> Self {
        Self {
            user: None,
            queue: RequestQueue::new(config.max_queue_size),
            history: HistoryStore::new(),
            latest: None,
            admission: AdmissionController::new(config.debounce),
            busy: false,
        }
    }

    fn admit(
        &mut self,
        validated: ValidatedPrompt,
        now: Instant,
    ) -> std::result::Result<GenerationRequest, AdmissionError> {
        self.admission.check(now, &self.queue)?;

        let request = GenerationRequest::from_validated(validated, Utc::now());
        let capacity = self.queue.capacity();
        self.queue
            .push_back(QueueEntry::queued(request.clone()))
            .map_err(|_| AdmissionError::QueueFull { capacity })?;
        self.history.insert(HistoryEntry::processing(request.clone()));
        self.latest = Some(request.id);
        self.admission.record_acceptance(now);

        Ok(request)
    }

    fn clear_history(&mut self) {
        self.history.clear();
        self.latest = None;
    }

    fn is_idle(&self) -> bool {
        !self.busy && self.queue.is_empty()
    }

    fn latest_entry(&self) -> Option<HistoryEntry> {
        self.latest.and_then(|id| self.history.get(id)).cloned()
    }
}

pub(crate) struct Core {
    state: Mutex<PipelineState>,
    config: QueueConfig,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<PipelineEvent>,
    idle: Notify,
}

impl Core {
    fn state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: PipelineEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Idle and non-empty: flag the head as processing, set busy and hand out its request.
    pub(crate) fn begin_dispatch(&self) -> Option<GenerationRequest> {
        let mut state = self.state();
        if state.busy {
            return None;
        }
        let request = state.queue.begin_head()?.request.clone();
        state.busy = true;
        if state.history.contains(request.id) {
            state.latest = Some(request.id);
        }
        drop(state);

        log::info!(
            "Dispatching {} ({}, {})",
            request.id,
            request.model,
            request.aspect_ratio
        );
        self.emit(PipelineEvent::Started { id: request.id });
        Some(request)
    }

    /// Records the outcome, then removes the head and clears busy, in that order.
    pub(crate) fn finish_dispatch(
        &self,
        request: &GenerationRequest,
        outcome: std::result::Result<String, GenerationError>,
        elapsed: Duration,
    ) {
        let mut state = self.state();
        if state.history.finish(request.id, &outcome) {
            state.latest = Some(request.id);
        }
        match state.queue.pop_front() {
            Some(entry) if entry.id() != request.id => {
                log::error!(
                    "Queue head {} did not match finished request {}",
                    entry.id(),
                    request.id
                );
            }
            None => log::error!("Queue was empty when {} finished", request.id),
            Some(_) => {}
        }
        state.busy = false;
        let idle = state.queue.is_empty();
        drop(state);

        match outcome {
            Ok(_) => {
                log::info!("Completed {} in {}ms", request.id, elapsed.as_millis());
                self.emit(PipelineEvent::Completed { id: request.id });
            }
            Err(err) => {
                log::error!("Failed {} after {}ms: {}", request.id, elapsed.as_millis(), err);
                self.emit(PipelineEvent::Failed {
                    id: request.id,
                    error: err.to_string(),
                });
            }
        }

        if idle {
            self.idle.notify_waiters();
        }
    }
}

/// Handle to the request pipeline. Cheap to clone; the engine task stops once every clone
/// has been dropped.
#[derive(Clone)]
pub struct ImageQueue {
    core: Arc<Core>,
    signals: mpsc::UnboundedSender<EngineSignal>,
}

impl ImageQueue {
    /// Spawns the execution engine, so this must be called inside a tokio runtime.
    pub fn new(config: QueueConfig, client: GenerationClient) -> Self {
        Self::with_clock(config, client, Arc::new(SystemClock))
    }

    /// Builds the generation client from `config.retry`.
    pub fn from_provider(config: QueueConfig, provider: Arc<dyn ImageProvider>) -> Self {
        let client = GenerationClient::new(provider, config.retry.clone());
        Self::new(config, client)
    }

    pub fn with_clock(config: QueueConfig, client: GenerationClient, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (signals, receiver) = mpsc::unbounded_channel();

        let core = Arc::new(Core {
            state: Mutex::new(PipelineState::new(&config)),
            config,
            clock,
            events,
            idle: Notify::new(),
        });

        tokio::spawn(ExecutionEngine::new(core.clone(), client, receiver).run());

        Self { core, signals }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.core.config
    }

    pub fn sign_in(&self, user: User) {
        log::info!("Signed in as {} ({})", user.email, user.provider);
        self.core.state().user = Some(user);
    }

    /// Forgets the user, their gallery and their waiting requests. A request already in flight
    /// runs to completion but its result is discarded.
    pub fn sign_out(&self) {
        let mut state = self.core.state();
        state.user = None;
        state.clear_history();
        let dropped = state.queue.drop_waiting();
        let idle = state.is_idle();
        drop(state);

        log::info!("Signed out; dropped {} queued request(s)", dropped);
        self.core.emit(PipelineEvent::HistoryCleared);
        if idle {
            self.core.idle.notify_waiters();
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.core.state().user.is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.core.state().user.clone()
    }

    /// Auth gate, validation, then rate limit and capacity. Rejections leave the queue and
    /// history untouched.
    pub fn submit(&self, input: PromptInput) -> Result<GenerationRequest> {
        let mut state = self.core.state();
        if state.user.is_none() {
            return Err(AdmissionError::NotAuthenticated.into());
        }

        let validated = validator::validate(&input, self.core.config.default_model)?;
        let request = match state.admit(validated, self.core.clock.now()) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("Submission rejected: {}", err);
                return Err(err.into());
            }
        };
        let depth = state.queue.len();
        drop(state);

        log::info!("Queued {} (queue depth {})", request.id, depth);
        self.core.emit(PipelineEvent::Queued { id: request.id });
        if self.signals.send(EngineSignal::Enqueued(request.id)).is_err() {
            log::error!("Execution engine is not running; {} will wait", request.id);
        }

        Ok(request)
    }

    /// Empties the gallery and the latest pointer. Does not touch the queue.
    pub fn clear_history(&self) {
        self.core.state().clear_history();
        log::info!("History cleared");
        self.core.emit(PipelineEvent::HistoryCleared);
    }

    pub fn queue(&self) -> Vec<QueueEntry> {
        self.core.state().queue.iter().cloned().collect()
    }

    pub fn queue_len(&self) -> usize {
        self.core.state().queue.len()
    }

    /// Newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.core.state().history.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<HistoryEntry> {
        self.core.state().latest_entry()
    }

    pub fn is_processing(&self) -> bool {
        self.core.state().busy
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let state = self.core.state();
        PipelineSnapshot {
            user: state.user.clone(),
            queue: state.queue.iter().cloned().collect(),
            history: state.history.iter().cloned().collect(),
            latest: state.latest_entry(),
            processing: state.busy,
        }
    }

    /// Events published after this call. Slow subscribers silently skip what they missed.
    pub fn subscribe(&self) -> Pin<Box<dyn Stream<Item = PipelineEvent> + Send>> {
        let stream = BroadcastStream::new(self.core.events.subscribe())
            .filter_map(|event| event.ok());
        Box::pin(stream)
    }

    /// Resolves once nothing is queued and nothing is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.core.idle.notified();
            if self.core.state().is_idle() {
                return;
            }
            notified.await;
        }
    }
}
