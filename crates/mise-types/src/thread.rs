use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recipe::RecipeBody;

/// One AI-proposed recipe variant within a thread
///
/// Immutable once created except for `accepted`/`rejected`, which the
/// backend sets when the suggestion is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub thread_id: String,
    pub suggestion: RecipeBody,
    pub response_text: String,
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub rejected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    pub fn new(
        id: impl Into<String>,
        thread_id: impl Into<String>,
        recipe: RecipeBody,
        response_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            suggestion: recipe,
            response_text: response_text.into(),
            accepted: false,
            rejected: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn recipe(&self) -> &RecipeBody {
        &self.suggestion
    }

    /// Accepted or rejected
    pub fn is_resolved(&self) -> bool {
        self.accepted || self.rejected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub source: ChatSource,
    pub message: String,
}

impl ChatMessage {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            source: ChatSource::User,
            message: message.into(),
        }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            source: ChatSource::Assistant,
            message: message.into(),
        }
    }
}

/// Reduced state of a suggestion thread as served by `GET /thread/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadState {
    pub id: String,
    #[serde(default)]
    pub recipe_id: Option<String>,
    pub original_prompt: String,
    pub current_prompt: String,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub current_recipe: Option<RecipeBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_recipe: Option<RecipeBody>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThreadState {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            recipe_id: None,
            original_prompt: prompt.clone(),
            current_prompt: prompt,
            suggestions: Vec::new(),
            chat_history: Vec::new(),
            current_recipe: None,
            modified_recipe: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    /// Index of the first suggestion that is neither accepted nor rejected,
    /// falling back to the most recent one.
    ///
    /// Returns 0 for a thread without suggestions.
    pub fn first_open_index(&self) -> usize {
        self.suggestions
            .iter()
            .position(|s| !s.is_resolved())
            .unwrap_or_else(|| self.suggestions.len().saturating_sub(1))
    }

    pub fn suggestion(&self, suggestion_id: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| s.id == suggestion_id)
    }

    /// Whether a suggestion of this thread was already turned into a recipe
    pub fn is_confirmed(&self) -> bool {
        self.recipe_id.is_some()
    }
}
