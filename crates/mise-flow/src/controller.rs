use std::sync::{Arc, Mutex, MutexGuard};

use mise_client::{ClientError, SuggestionBackend};
use mise_types::{Suggestion, ThreadState, UserRecipe};

use crate::error::{FlowError, Operation};
use crate::view::ThreadView;

/// Result of [`SuggestionThread::reject`]
#[derive(Debug, Clone)]
pub enum RejectOutcome {
    /// Moved to a suggestion that was already held locally
    Advanced { index: usize },
    /// Fetched a new suggestion and moved onto it
    Fetched { index: usize },
    /// A fetch is already in flight; nothing happened
    Busy,
    Failed(FlowError),
}

/// Result of [`SuggestionThread::accept`]
#[derive(Debug, Clone)]
pub enum AcceptOutcome {
    Accepted(UserRecipe),
    /// An accept is already in flight; nothing happened
    Busy,
    Failed(FlowError),
}

#[derive(Debug)]
struct ThreadCursor {
    thread: ThreadState,
    current_index: usize,
    rejecting: bool,
    accepting: bool,
    reject_error: Option<FlowError>,
    accept_error: Option<FlowError>,
    last_failed: Option<Operation>,
    accepted_recipe_id: Option<String>,
}

impl ThreadCursor {
    fn new(thread: ThreadState) -> Self {
        let current_index = thread.first_open_index();
        Self {
            thread,
            current_index,
            rejecting: false,
            accepting: false,
            reject_error: None,
            accept_error: None,
            last_failed: None,
            accepted_recipe_id: None,
        }
    }

    fn current(&self) -> Option<&Suggestion> {
        self.thread.suggestions.get(self.current_index)
    }

    fn last_index(&self) -> Option<usize> {
        self.thread.suggestions.len().checked_sub(1)
    }

    fn record_failure(&mut self, error: FlowError) {
        self.last_failed = Some(error.operation);
        match error.operation {
            Operation::Accept => self.accept_error = Some(error),
            _ => self.reject_error = Some(error),
        }
    }

    /// The most recent failure that has not been superseded
    fn error(&self) -> Option<FlowError> {
        let (latest, other) = match self.last_failed {
            Some(Operation::Accept) => (&self.accept_error, &self.reject_error),
            Some(_) => (&self.reject_error, &self.accept_error),
            None => return None,
        };
        latest.clone().or_else(|| other.clone())
    }
}

enum RejectPlan {
    Busy,
    Advance { index: usize, passed_over: Option<String> },
    Fetch { thread_id: String, passed_over: Option<String> },
}

/// Client-held cursor over the growing list of suggestions of one thread
///
/// Cloning yields another handle to the same controller. State is guarded by
/// a mutex that is never held across a backend call, so operations issued
/// from different tasks interleave only at the network boundary. `reject`
/// and `accept` each have their own in-flight flag: a second call while the
/// first is pending returns `Busy` without touching the backend.
#[derive(Clone)]
pub struct SuggestionThread {
    backend: Arc<dyn SuggestionBackend>,
    state: Arc<Mutex<ThreadCursor>>,
    persist_rejections: bool,
}

impl SuggestionThread {
    /// Cursor starts at the first suggestion that is neither accepted nor
    /// rejected, or at the most recent one if all are resolved.
    pub fn new(backend: Arc<dyn SuggestionBackend>, thread: ThreadState) -> Self {
        tracing::debug!(
            thread_id = %thread.id,
            suggestions = thread.suggestions.len(),
            "Opening suggestion thread"
        );
        Self {
            backend,
            state: Arc::new(Mutex::new(ThreadCursor::new(thread))),
            persist_rejections: false,
        }
    }

    /// Also record passed-over suggestions as rejected on the backend
    pub fn with_persisted_rejections(mut self, enabled: bool) -> Self {
        self.persist_rejections = enabled;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ThreadCursor> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Pass over the current suggestion
    ///
    /// Moves to the next cached suggestion when there is one. Otherwise asks
    /// the backend for a new suggestion, carrying `refined_prompt` if given,
    /// and moves onto it once it arrives. On failure the cursor and the list
    /// are left as they were and the error is recorded.
    pub async fn reject(&self, refined_prompt: Option<String>) -> RejectOutcome {
        let plan = {
            let mut state = self.lock();
            if state.rejecting {
                tracing::debug!("Reject ignored, fetch already in flight");
                RejectPlan::Busy
            } else {
                let passed_over = state
                    .current()
                    .filter(|s| !s.is_resolved())
                    .map(|s| s.id.clone());
                if state.current_index + 1 < state.thread.suggestions.len() {
                    state.current_index += 1;
                    RejectPlan::Advance {
                        index: state.current_index,
                        passed_over,
                    }
                } else {
                    state.rejecting = true;
                    state.reject_error = None;
                    RejectPlan::Fetch {
                        thread_id: state.thread.id.clone(),
                        passed_over,
                    }
                }
            }
        };

        match plan {
            RejectPlan::Busy => RejectOutcome::Busy,
            RejectPlan::Advance { index, passed_over } => {
                tracing::debug!(index, "Advanced to cached suggestion");
                self.persist_rejection(passed_over).await;
                RejectOutcome::Advanced { index }
            }
            RejectPlan::Fetch {
                thread_id,
                passed_over,
            } => {
                tracing::info!(thread_id = %thread_id, refined = refined_prompt.is_some(), "Requesting next suggestion");
                let result = self
                    .backend
                    .request_next_suggestion(&thread_id, refined_prompt.as_deref())
                    .await;
                let outcome = self.apply_fetch(result, refined_prompt);
                if matches!(outcome, RejectOutcome::Fetched { .. }) {
                    self.persist_rejection(passed_over).await;
                }
                outcome
            }
        }
    }

    fn apply_fetch(
        &self,
        result: Result<Suggestion, ClientError>,
        refined_prompt: Option<String>,
    ) -> RejectOutcome {
        let mut state = self.lock();
        state.rejecting = false;
        match result {
            Ok(suggestion) => {
                state.thread.suggestions.push(suggestion);
                if let Some(prompt) = refined_prompt {
                    state.thread.current_prompt = prompt;
                }
                let index = state.thread.suggestions.len() - 1;
                state.current_index = index;
                tracing::debug!(index, "Moved to fetched suggestion");
                RejectOutcome::Fetched { index }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to fetch next suggestion");
                let error = FlowError::new(Operation::Reject, err);
                state.record_failure(error.clone());
                RejectOutcome::Failed(error)
            }
        }
    }

    async fn persist_rejection(&self, suggestion_id: Option<String>) {
        let Some(suggestion_id) = suggestion_id.filter(|_| self.persist_rejections) else {
            return;
        };
        let thread_id = self.lock().thread.id.clone();
        if let Err(err) = self
            .backend
            .reject_suggestion(&thread_id, &suggestion_id)
            .await
        {
            tracing::warn!(suggestion_id = %suggestion_id, error = %err, "Failed to record rejection");
        }
    }

    /// Step back one suggestion, stopping at the first
    pub fn back(&self) -> usize {
        let mut state = self.lock();
        state.current_index = state.current_index.saturating_sub(1);
        tracing::debug!(index = state.current_index, "Moved back");
        state.current_index
    }

    /// Step forward through suggestions already held locally; never fetches
    pub fn forward(&self) -> usize {
        let mut state = self.lock();
        if state.current_index + 1 < state.thread.suggestions.len() {
            state.current_index += 1;
            tracing::debug!(index = state.current_index, "Moved forward");
        }
        state.current_index
    }

    // ------------------------------------------------------------------
    // Acceptance
    // ------------------------------------------------------------------

    /// Turn the current suggestion into a saved recipe
    ///
    /// Never retried automatically: every successful call creates a recipe
    /// on the backend.
    pub async fn accept(&self) -> AcceptOutcome {
        self.accept_inner(None).await
    }

    /// Like [`accept`](Self::accept), invoking `on_accepted` with the new
    /// recipe's id exactly once on success
    pub async fn accept_then<F>(&self, on_accepted: F) -> AcceptOutcome
    where
        F: FnOnce(&str) + Send + 'static,
    {
        let callback: Box<dyn FnOnce(&str) + Send> = Box::new(on_accepted);
        self.accept_inner(Some(callback)).await
    }

    async fn accept_inner(&self, on_accepted: Option<Box<dyn FnOnce(&str) + Send>>) -> AcceptOutcome {
        let target = {
            let mut state = self.lock();
            if state.accepting {
                tracing::debug!("Accept ignored, already in flight");
                return AcceptOutcome::Busy;
            }
            let current = state.current().map(|s| s.id.clone());
            match current {
                Some(suggestion_id) => {
                    state.accepting = true;
                    state.accept_error = None;
                    Ok((state.thread.id.clone(), suggestion_id))
                }
                None => {
                    let error = FlowError::new(
                        Operation::Accept,
                        ClientError::NotFound("no suggestion to accept".to_string()),
                    );
                    state.record_failure(error.clone());
                    Err(error)
                }
            }
        };
        let (thread_id, suggestion_id) = match target {
            Ok(target) => target,
            Err(error) => return AcceptOutcome::Failed(error),
        };

        tracing::info!(thread_id = %thread_id, suggestion_id = %suggestion_id, "Accepting suggestion");
        let result = self
            .backend
            .accept_suggestion(&thread_id, &suggestion_id)
            .await;

        let outcome = {
            let mut state = self.lock();
            state.accepting = false;
            match result {
                Ok(recipe) => {
                    state.accepted_recipe_id = Some(recipe.id.clone());
                    AcceptOutcome::Accepted(recipe)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to accept suggestion");
                    let error = FlowError::new(Operation::Accept, err);
                    state.record_failure(error.clone());
                    AcceptOutcome::Failed(error)
                }
            }
        };

        if let (AcceptOutcome::Accepted(recipe), Some(callback)) = (&outcome, on_accepted) {
            callback(&recipe.id);
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> ThreadView {
        let state = self.lock();
        ThreadView {
            thread: state.thread.clone(),
            current_index: state.current_index,
            current_suggestion: state.current().cloned(),
            rejecting: state.rejecting,
            accepting: state.accepting,
            error: state.error(),
            accepted_recipe_id: state.accepted_recipe_id.clone(),
        }
    }

    pub fn thread_id(&self) -> String {
        self.lock().thread.id.clone()
    }

    pub fn thread(&self) -> ThreadState {
        self.lock().thread.clone()
    }

    pub fn current_index(&self) -> usize {
        self.lock().current_index
    }

    pub fn current_suggestion(&self) -> Option<Suggestion> {
        self.lock().current().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().thread.suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_rejecting(&self) -> bool {
        self.lock().rejecting
    }

    pub fn is_accepting(&self) -> bool {
        self.lock().accepting
    }

    /// Most recent failure of either operation
    pub fn error(&self) -> Option<FlowError> {
        self.lock().error()
    }

    pub fn reject_error(&self) -> Option<FlowError> {
        self.lock().reject_error.clone()
    }

    pub fn accept_error(&self) -> Option<FlowError> {
        self.lock().accept_error.clone()
    }

    pub fn clear_error(&self) {
        let mut state = self.lock();
        state.reject_error = None;
        state.accept_error = None;
        state.last_failed = None;
    }

    pub fn can_go_back(&self) -> bool {
        self.lock().current_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let state = self.lock();
        state
            .last_index()
            .is_some_and(|last| state.current_index < last)
    }
}

impl std::fmt::Debug for SuggestionThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SuggestionThread")
            .field("thread_id", &state.thread.id)
            .field("current_index", &state.current_index)
            .field("suggestions", &state.thread.suggestions.len())
            .field("rejecting", &state.rejecting)
            .field("accepting", &state.accepting)
            .finish()
    }
}
