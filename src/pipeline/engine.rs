use super::Core;
use crate::{generation::GenerationClient, logger, models::RequestId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Messages that ask the engine to re-run its dispatch check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineSignal {
    Enqueued(RequestId),
}

/// Single consumer of the work channel. Runs one generation at a time, head of queue first.
pub(crate) struct ExecutionEngine {
    core: Arc<Core>,
    client: GenerationClient,
    signals: mpsc::UnboundedReceiver<EngineSignal>,
}

impl ExecutionEngine {
    pub(crate) fn new(
        core: Arc<Core>,
        client: GenerationClient,
        signals: mpsc::UnboundedReceiver<EngineSignal>,
    ) -> Self {
        Self {
            core,
            client,
            signals,
        }
    }

    /// Ends when every `ImageQueue` handle has been dropped.
    pub(crate) async fn run(mut self) {
        log::debug!(
            "Execution engine started (provider: {})",
            self.client.provider_name()
        );

        while let Some(signal) = self.signals.recv().await {
            match signal {
                EngineSignal::Enqueued(id) => log::trace!("Dispatch check after enqueue of {}", id),
            }
            self.drain().await;
        }

        log::debug!("Execution engine stopped");
    }

    /// Dispatches until the queue is empty. The dispatch check runs again right after each
    /// item finishes, which is the same check an enqueue signal triggers.
    async fn drain(&self) {
        while let Some(request) = self.core.begin_dispatch() {
            let timer = logger::timer(&format!("generation {}", request.id));
            let outcome = self.client.generate(&request).await;
            let elapsed = timer.finish();
            self.core.finish_dispatch(&request, outcome, elapsed);
        }
    }
}
