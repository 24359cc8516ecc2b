use async_trait::async_trait;
use mise_types::{
    Credentials, Profile, ProfileUpdateRequest, RecipeBody, Suggestion, ThreadState, TokenResponse,
    UserRecipe,
};

use crate::error::Result;

/// Backend operations behind a suggestion thread
///
/// Every call that changes state has a server-side effect; callers must not
/// retry `accept_suggestion` on their own.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    /// Start a new thread for a prompt; the backend generates the first suggestions
    async fn start_thread(&self, prompt: &str) -> Result<ThreadState>;

    /// Fetch the current persisted state of a thread
    async fn get_thread(&self, thread_id: &str) -> Result<ThreadState>;

    /// Generate and persist one more suggestion, optionally refining the prompt
    async fn request_next_suggestion(
        &self,
        thread_id: &str,
        refined_prompt: Option<&str>,
    ) -> Result<Suggestion>;

    /// Turn a suggestion into a recipe owned by the user
    async fn accept_suggestion(&self, thread_id: &str, suggestion_id: &str) -> Result<UserRecipe>;

    /// Record that a suggestion was passed over
    ///
    /// Only some backends keep rejections; the rest accept the call and do nothing.
    async fn reject_suggestion(&self, thread_id: &str, suggestion_id: &str) -> Result<()> {
        tracing::debug!(thread_id, suggestion_id, "Backend does not record rejections");
        Ok(())
    }
}

/// Account and profile operations
#[async_trait]
pub trait AccountBackend: Send + Sync {
    /// Create an account; the returned token is stored in the client's session
    async fn signup(&self, credentials: &Credentials) -> Result<TokenResponse>;

    /// Log in; the returned token is stored in the client's session
    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse>;

    async fn get_profile(&self) -> Result<Profile>;

    async fn save_profile(&self, update: &ProfileUpdateRequest) -> Result<Profile>;
}

/// Recipe book and cooking-assistant operations
#[async_trait]
pub trait RecipeBackend: Send + Sync {
    async fn list_recipes(&self) -> Result<Vec<UserRecipe>>;

    async fn get_recipe(&self, recipe_id: &str) -> Result<UserRecipe>;

    async fn delete_recipe(&self, recipe_id: &str) -> Result<()>;

    /// Ask a cooking question about the recipe a thread produced
    async fn ask_question(&self, thread_id: &str, question: &str) -> Result<String>;

    /// Rework a saved recipe from a chat instruction and return the new body
    async fn modify_recipe(&self, recipe_id: &str, prompt: &str) -> Result<RecipeBody>;
}

/// Convenience trait for backends that cover the whole API
pub trait MiseBackend: SuggestionBackend + AccountBackend + RecipeBackend {}

impl<T> MiseBackend for T where T: SuggestionBackend + AccountBackend + RecipeBackend {}
