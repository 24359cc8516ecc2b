use std::sync::Arc;

use mise_client::SuggestionBackend;

use crate::controller::SuggestionThread;
use crate::error::{FlowError, Operation};

/// Loads or starts threads and hands back a controller bound to them
#[derive(Clone)]
pub struct ThreadFetcher {
    backend: Arc<dyn SuggestionBackend>,
    persist_rejections: bool,
}

impl ThreadFetcher {
    pub fn new(backend: Arc<dyn SuggestionBackend>) -> Self {
        Self {
            backend,
            persist_rejections: false,
        }
    }

    /// Controllers created by this fetcher record passed-over suggestions
    pub fn with_persisted_rejections(mut self, enabled: bool) -> Self {
        self.persist_rejections = enabled;
        self
    }

    /// Fetch an existing thread by id
    pub async fn load(&self, thread_id: &str) -> Result<SuggestionThread, FlowError> {
        tracing::info!(thread_id = %thread_id, "Loading thread");
        let thread = self.backend.get_thread(thread_id).await.map_err(|e| {
            tracing::warn!(thread_id = %thread_id, error = %e, "Failed to load thread");
            FlowError::new(Operation::Load, e)
        })?;
        Ok(self.bind(thread))
    }

    /// Start a new thread for `prompt`
    pub async fn start(&self, prompt: &str) -> Result<SuggestionThread, FlowError> {
        tracing::info!(prompt_len = prompt.len(), "Starting thread");
        let thread = self.backend.start_thread(prompt).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to start thread");
            FlowError::new(Operation::Start, e)
        })?;
        tracing::debug!(thread_id = %thread.id, "Thread started");
        Ok(self.bind(thread))
    }

    fn bind(&self, thread: mise_types::ThreadState) -> SuggestionThread {
        SuggestionThread::new(self.backend.clone(), thread)
            .with_persisted_rejections(self.persist_rejections)
    }
}
