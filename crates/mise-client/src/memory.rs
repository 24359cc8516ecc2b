// In-memory, event-sourced backend for tests and offline use

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use mise_types::{RecipeBody, Suggestion, ThreadEvent, ThreadEventKind, ThreadState, UserRecipe};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::reducer::reduce_events;
use crate::traits::{RecipeBackend, SuggestionBackend};

/// A generated suggestion before it is attached to a thread
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSuggestion {
    pub recipe: RecipeBody,
    pub response_text: String,
}

impl GeneratedSuggestion {
    pub fn new(recipe: RecipeBody, response_text: impl Into<String>) -> Self {
        Self {
            recipe,
            response_text: response_text.into(),
        }
    }
}

/// Produces suggestions and answers for [`MemoryBackend`]
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// `previous_titles` lists what the thread already suggested, oldest first
    async fn generate(&self, prompt: &str, previous_titles: &[String]) -> Result<GeneratedSuggestion>;

    async fn answer(&self, question: &str, _recipe: &RecipeBody) -> Result<String> {
        Err(ClientError::Internal(format!("No answer available for: {}", question)))
    }

    /// Rework `recipe` following a chat instruction
    async fn modify(&self, prompt: &str, _recipe: &RecipeBody) -> Result<RecipeBody> {
        Err(ClientError::Internal(format!("No modification available for: {}", prompt)))
    }
}

/// Source that replays queued results in order
#[derive(Debug, Default)]
pub struct ScriptedSource {
    suggestions: Mutex<VecDeque<Result<GeneratedSuggestion>>>,
    answers: Mutex<VecDeque<String>>,
    modifications: Mutex<VecDeque<RecipeBody>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suggestion(self, recipe: RecipeBody, response_text: impl Into<String>) -> Self {
        self.push_suggestion(recipe, response_text);
        self
    }

    pub fn with_answer(self, answer: impl Into<String>) -> Self {
        lock(&self.answers).push_back(answer.into());
        self
    }

    pub fn with_modification(self, recipe: RecipeBody) -> Self {
        lock(&self.modifications).push_back(recipe);
        self
    }

    pub fn push_suggestion(&self, recipe: RecipeBody, response_text: impl Into<String>) {
        lock(&self.suggestions).push_back(Ok(GeneratedSuggestion::new(recipe, response_text)));
    }

    /// Make the next generation fail with `error`
    pub fn push_failure(&self, error: ClientError) {
        lock(&self.suggestions).push_back(Err(error));
    }

    pub fn remaining(&self) -> usize {
        lock(&self.suggestions).len()
    }
}

#[async_trait]
impl SuggestionSource for ScriptedSource {
    async fn generate(&self, prompt: &str, previous_titles: &[String]) -> Result<GeneratedSuggestion> {
        tracing::debug!(prompt, previous = previous_titles.len(), "Replaying scripted suggestion");
        lock(&self.suggestions)
            .pop_front()
            .unwrap_or(Err(ClientError::EmptyResponse))
    }

    async fn answer(&self, question: &str, _recipe: &RecipeBody) -> Result<String> {
        lock(&self.answers)
            .pop_front()
            .ok_or_else(|| ClientError::Internal(format!("No answer available for: {}", question)))
    }

    async fn modify(&self, prompt: &str, _recipe: &RecipeBody) -> Result<RecipeBody> {
        lock(&self.modifications)
            .pop_front()
            .ok_or_else(|| ClientError::Internal(format!("No modification available for: {}", prompt)))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Store {
    threads: HashMap<String, Vec<ThreadEvent>>,
    recipes: HashMap<String, UserRecipe>,
    /// (thread_id, suggestion_id) -> recipe_id
    accepted: HashMap<(String, String), String>,
}

/// Backend that keeps every thread as an event log and reduces it on read
pub struct MemoryBackend {
    user_id: String,
    source: Arc<dyn SuggestionSource>,
    store: RwLock<Store>,
}

impl MemoryBackend {
    pub fn new(source: Arc<dyn SuggestionSource>) -> Self {
        Self {
            user_id: "local-user".to_string(),
            source,
            store: RwLock::new(Store::default()),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Raw event log of a thread
    pub async fn events(&self, thread_id: &str) -> Result<Vec<ThreadEvent>> {
        let store = self.store.read().await;
        store
            .threads
            .get(thread_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("thread {}", thread_id)))
    }

    pub async fn recipe_count(&self) -> usize {
        self.store.read().await.recipes.len()
    }

    /// Modification proposed for a recipe and not yet accepted or rejected
    pub async fn pending_modification(&self, recipe_id: &str) -> Result<Option<RecipeBody>> {
        let recipe = self.get_recipe(recipe_id).await?;
        Ok(self.get_thread(&recipe.thread_id).await?.modified_recipe)
    }

    /// Apply the pending modification to the saved recipe
    ///
    /// The proposal becomes the recipe's new version and the thread's current recipe.
    pub async fn accept_modification(&self, recipe_id: &str) -> Result<UserRecipe> {
        let mut store = self.store.write().await;
        let thread_id = recipe_of(&store, recipe_id)?.thread_id.clone();
        let events = store
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| ClientError::NotFound(format!("thread {}", thread_id)))?;
        let modified = reduce_events(&thread_id, &events[..], None)?
            .modified_recipe
            .ok_or_else(|| no_pending_modification(recipe_id))?;
        events.push(ThreadEvent::new(ThreadEventKind::RecipeModificationAccepted));

        let recipe = store
            .recipes
            .get_mut(recipe_id)
            .ok_or_else(|| ClientError::NotFound(format!("recipe {}", recipe_id)))?;
        recipe.recipe = modified;
        recipe.latest_version_id = Uuid::new_v4().to_string();
        recipe.updated_at = Utc::now();

        tracing::info!(recipe_id, version = %recipe.latest_version_id, "Accepted recipe modification");
        Ok(recipe.clone())
    }

    /// Drop the pending modification, keeping the recipe as it was
    pub async fn reject_modification(&self, recipe_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        let thread_id = recipe_of(&store, recipe_id)?.thread_id.clone();
        let events = store
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| ClientError::NotFound(format!("thread {}", thread_id)))?;
        if reduce_events(&thread_id, &events[..], None)?.modified_recipe.is_none() {
            return Err(no_pending_modification(recipe_id));
        }
        events.push(ThreadEvent::new(ThreadEventKind::RecipeModificationRejected));

        tracing::info!(recipe_id, "Rejected recipe modification");
        Ok(())
    }

    async fn append(&self, thread_id: &str, new_events: Vec<ThreadEvent>) -> Result<ThreadState> {
        let mut store = self.store.write().await;
        let events = store
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| ClientError::NotFound(format!("thread {}", thread_id)))?;
        events.extend(new_events);
        Ok(reduce_events(thread_id, &events[..], None)?)
    }
}

fn recipe_of<'a>(store: &'a Store, recipe_id: &str) -> Result<&'a UserRecipe> {
    store
        .recipes
        .get(recipe_id)
        .ok_or_else(|| ClientError::NotFound(format!("recipe {}", recipe_id)))
}

fn no_pending_modification(recipe_id: &str) -> ClientError {
    ClientError::NotFound(format!("pending modification for recipe {}", recipe_id))
}

fn generated_event(generated: GeneratedSuggestion) -> (String, ThreadEvent) {
    let suggestion_id = Uuid::new_v4().to_string();
    let event = ThreadEvent::new(ThreadEventKind::SuggestionGenerated {
        suggestion_id: suggestion_id.clone(),
        recipe: generated.recipe,
        response_text: generated.response_text,
    });
    (suggestion_id, event)
}

#[async_trait]
impl SuggestionBackend for MemoryBackend {
    async fn start_thread(&self, prompt: &str) -> Result<ThreadState> {
        let generated = self.source.generate(prompt, &[]).await?;

        let thread_id = Uuid::new_v4().to_string();
        let (_, suggestion_event) = generated_event(generated);
        let events = vec![
            ThreadEvent::new(ThreadEventKind::PromptSet {
                prompt: prompt.to_string(),
            }),
            suggestion_event,
        ];
        let state = reduce_events(&thread_id, &events, None)?;

        self.store.write().await.threads.insert(thread_id.clone(), events);
        tracing::info!(thread_id = %thread_id, "Started suggestion thread");
        Ok(state)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadState> {
        let events = self.events(thread_id).await?;
        Ok(reduce_events(thread_id, &events, None)?)
    }

    async fn request_next_suggestion(
        &self,
        thread_id: &str,
        refined_prompt: Option<&str>,
    ) -> Result<Suggestion> {
        let current = self.get_thread(thread_id).await?;
        let prompt = refined_prompt.unwrap_or(&current.current_prompt);
        let previous_titles: Vec<String> = current
            .suggestions
            .iter()
            .map(|s| s.suggestion.title.clone())
            .collect();

        // Generation happens outside the store lock; nothing is recorded on failure
        let generated = self.source.generate(prompt, &previous_titles).await?;

        let mut new_events = Vec::with_capacity(2);
        if let Some(prompt) = refined_prompt {
            new_events.push(ThreadEvent::new(ThreadEventKind::PromptEdited {
                prompt: prompt.to_string(),
            }));
        }
        let (suggestion_id, event) = generated_event(generated);
        new_events.push(event);

        let state = self.append(thread_id, new_events).await?;
        state
            .suggestion(&suggestion_id)
            .cloned()
            .ok_or_else(|| ClientError::Internal("generated suggestion missing from thread".to_string()))
    }

    async fn accept_suggestion(&self, thread_id: &str, suggestion_id: &str) -> Result<UserRecipe> {
        let mut store = self.store.write().await;

        let key = (thread_id.to_string(), suggestion_id.to_string());
        if let Some(recipe_id) = store.accepted.get(&key) {
            if let Some(recipe) = store.recipes.get(recipe_id) {
                tracing::info!(thread_id, suggestion_id, "Suggestion already accepted, returning existing recipe");
                return Ok(recipe.clone());
            }
        }

        let events = store
            .threads
            .get(thread_id)
            .ok_or_else(|| ClientError::NotFound(format!("thread {}", thread_id)))?;
        let state = reduce_events(thread_id, events, None)?;
        let suggestion = state
            .suggestion(suggestion_id)
            .ok_or_else(|| ClientError::NotFound(format!("suggestion {}", suggestion_id)))?;

        let now = Utc::now();
        let recipe = UserRecipe {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id.clone(),
            global_recipe_id: None,
            thread_id: thread_id.to_string(),
            is_favorite: false,
            latest_version_id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            recipe: suggestion.suggestion.clone(),
        };

        if let Some(events) = store.threads.get_mut(thread_id) {
            events.push(ThreadEvent::new(ThreadEventKind::SuggestionAccepted {
                suggestion_id: suggestion_id.to_string(),
                recipe_id: recipe.id.clone(),
            }));
        }
        store.accepted.insert(key, recipe.id.clone());
        store.recipes.insert(recipe.id.clone(), recipe.clone());

        tracing::info!(thread_id, suggestion_id, recipe_id = %recipe.id, "Accepted suggestion");
        Ok(recipe)
    }

    async fn reject_suggestion(&self, thread_id: &str, suggestion_id: &str) -> Result<()> {
        let event = ThreadEvent::new(ThreadEventKind::SuggestionRejected {
            suggestion_id: suggestion_id.to_string(),
        });
        let mut store = self.store.write().await;
        let events = store
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| ClientError::NotFound(format!("thread {}", thread_id)))?;

        let mut candidate = events.clone();
        candidate.push(event);
        reduce_events(thread_id, &candidate, None)?;
        *events = candidate;
        Ok(())
    }
}

#[async_trait]
impl RecipeBackend for MemoryBackend {
    async fn list_recipes(&self) -> Result<Vec<UserRecipe>> {
        let store = self.store.read().await;
        let mut recipes: Vec<UserRecipe> = store.recipes.values().cloned().collect();
        recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recipes)
    }

    async fn get_recipe(&self, recipe_id: &str) -> Result<UserRecipe> {
        let store = self.store.read().await;
        recipe_of(&store, recipe_id).cloned()
    }

    async fn delete_recipe(&self, recipe_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .recipes
            .remove(recipe_id)
            .map(|_| ())
            .ok_or_else(|| ClientError::NotFound(format!("recipe {}", recipe_id)))
    }

    async fn ask_question(&self, thread_id: &str, question: &str) -> Result<String> {
        let state = self.get_thread(thread_id).await?;
        let recipe = state.current_recipe.ok_or_else(|| {
            ClientError::NotFound(format!("thread {} has no accepted recipe", thread_id))
        })?;

        let answer = self.source.answer(question, &recipe).await?;
        self.append(
            thread_id,
            vec![ThreadEvent::new(ThreadEventKind::QuestionAnswered {
                question: question.to_string(),
                answer: answer.clone(),
            })],
        )
        .await?;
        Ok(answer)
    }

    /// Records the result as a proposal; see [`MemoryBackend::accept_modification`]
    async fn modify_recipe(&self, recipe_id: &str, prompt: &str) -> Result<RecipeBody> {
        let recipe = self.get_recipe(recipe_id).await?;

        let modified = self.source.modify(prompt, &recipe.recipe).await?;
        self.append(
            &recipe.thread_id,
            vec![ThreadEvent::new(ThreadEventKind::RecipeModified {
                recipe: modified.clone(),
            })],
        )
        .await?;
        tracing::info!(recipe_id, title = %modified.title, "Proposed recipe modification");
        Ok(modified)
    }
}
