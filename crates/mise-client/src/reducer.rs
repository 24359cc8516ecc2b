use mise_types::{ChatMessage, Suggestion, ThreadEvent, ThreadEventKind, ThreadState};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReduceError {
    #[error("Suggestion not found: {0}")]
    SuggestionNotFound(String),

    #[error("Thread {0} has no PromptSet event")]
    MissingPrompt(String),
}

/// Fold a thread's event log into its current state
///
/// `base` lets callers continue from a previously reduced state with only
/// the newer events.
pub fn reduce_events(
    thread_id: &str,
    events: &[ThreadEvent],
    base: Option<ThreadState>,
) -> Result<ThreadState, ReduceError> {
    let has_prompt = base.is_some();
    let mut thread = base.unwrap_or_else(|| ThreadState::new(thread_id, ""));
    let mut prompt_seen = has_prompt;

    tracing::debug!(thread_id, event_count = events.len(), "Reducing thread events");

    for event in events {
        thread.updated_at = event.timestamp;
        match &event.kind {
            ThreadEventKind::PromptSet { prompt } => {
                thread.original_prompt = prompt.clone();
                thread.current_prompt = prompt.clone();
                thread.created_at = event.timestamp;
                prompt_seen = true;
            }
            ThreadEventKind::PromptEdited { prompt } => {
                thread.current_prompt = prompt.clone();
            }
            ThreadEventKind::SuggestionGenerated {
                suggestion_id,
                recipe,
                response_text,
            } => {
                let mut suggestion =
                    Suggestion::new(suggestion_id, thread_id, recipe.clone(), response_text);
                suggestion.created_at = Some(event.timestamp);
                suggestion.updated_at = Some(event.timestamp);
                thread.suggestions.push(suggestion);
            }
            ThreadEventKind::SuggestionAccepted {
                suggestion_id,
                recipe_id,
            } => {
                let suggestion = find_mut(&mut thread.suggestions, suggestion_id)?;
                suggestion.accepted = true;
                suggestion.updated_at = Some(event.timestamp);
                let recipe = suggestion.suggestion.clone();
                thread.current_recipe = Some(recipe);
                thread.recipe_id = Some(recipe_id.clone());
            }
            ThreadEventKind::SuggestionRejected { suggestion_id } => {
                let suggestion = find_mut(&mut thread.suggestions, suggestion_id)?;
                suggestion.rejected = true;
                suggestion.updated_at = Some(event.timestamp);
            }
            ThreadEventKind::RecipeModified { recipe } => {
                thread.modified_recipe = Some(recipe.clone());
            }
            ThreadEventKind::RecipeModificationAccepted => {
                if let Some(recipe) = thread.modified_recipe.take() {
                    thread.current_recipe = Some(recipe);
                }
            }
            ThreadEventKind::RecipeModificationRejected => {
                thread.modified_recipe = None;
            }
            ThreadEventKind::QuestionAnswered { question, answer } => {
                thread.chat_history.push(ChatMessage::user(question));
                thread.chat_history.push(ChatMessage::assistant(answer));
            }
        }
    }

    if !prompt_seen {
        return Err(ReduceError::MissingPrompt(thread_id.to_string()));
    }
    Ok(thread)
}

fn find_mut<'a>(
    suggestions: &'a mut [Suggestion],
    suggestion_id: &str,
) -> Result<&'a mut Suggestion, ReduceError> {
    suggestions
        .iter_mut()
        .find(|s| s.id == suggestion_id)
        .ok_or_else(|| ReduceError::SuggestionNotFound(suggestion_id.to_string()))
}
