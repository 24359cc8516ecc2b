// HTTP implementation of the backend traits (reqwest, no generated SDK)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mise_types::{
    ApiErrorBody, ApiErrorEnvelope, Credentials, Profile, ProfileUpdateRequest, RecipeBody,
    Suggestion, ThreadState, TokenResponse, UserRecipe,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::error::{ClientError, Result};
use crate::session::{SessionProvider, StaticSession};
use crate::traits::{AccountBackend, RecipeBackend, SuggestionBackend};

/// Client for the mise REST API
pub struct HttpClient {
    http_client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Create a client from configuration and a session provider
    pub fn from_config(config: &ClientConfig, session: Arc<dyn SessionProvider>) -> Result<Self> {
        HttpClientBuilder::new()
            .base_url(&config.base_url)
            .timeout(config.timeout())
            .session(session)
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request, attaching the bearer token when the session has one
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.url(path));
        match self.session.token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body = match serde_json::from_str::<ApiErrorEnvelope>(&text) {
            Ok(envelope) => envelope.error,
            Err(_) => {
                tracing::warn!(status = status.as_u16(), body = %text, "Unrecognised error body");
                ApiErrorBody::unknown(status.as_u16())
            }
        };
        tracing::error!(status = status.as_u16(), code = %body.code, "API request failed");
        Err(ClientError::api(status.as_u16(), body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// ============================================================================
// REQUEST / RESPONSE BODIES
// ============================================================================

#[derive(Debug, Serialize)]
struct StartThreadRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct NextSuggestionRequest<'a> {
    prompt: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct QuestionResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ModifyRecipeRequest<'a> {
    prompt: &'a str,
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl SuggestionBackend for HttpClient {
    async fn start_thread(&self, prompt: &str) -> Result<ThreadState> {
        let builder = self
            .request(Method::POST, "/thread/suggest")
            .json(&StartThreadRequest { prompt });
        self.send_json(builder).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadState> {
        let builder = self.request(Method::GET, &format!("/thread/{}", thread_id));
        self.send_json(builder).await
    }

    async fn request_next_suggestion(
        &self,
        thread_id: &str,
        refined_prompt: Option<&str>,
    ) -> Result<Suggestion> {
        let builder = self
            .request(Method::POST, &format!("/thread/{}/suggest", thread_id))
            .json(&NextSuggestionRequest {
                prompt: refined_prompt,
            });

        // The endpoint answers with a batch; the newest entry is the one appended last
        let mut suggestions: Vec<Suggestion> = self.send_json(builder).await?;
        if suggestions.len() > 1 {
            tracing::debug!(count = suggestions.len(), "Backend returned several suggestions, keeping the last");
        }
        suggestions.pop().ok_or(ClientError::EmptyResponse)
    }

    async fn accept_suggestion(&self, thread_id: &str, suggestion_id: &str) -> Result<UserRecipe> {
        let builder = self.request(
            Method::POST,
            &format!("/thread/{}/accept/{}", thread_id, suggestion_id),
        );
        self.send_json(builder).await
    }

    // The server has no rejection route, so `reject_suggestion` keeps the trait default
}

#[async_trait]
impl AccountBackend for HttpClient {
    async fn signup(&self, credentials: &Credentials) -> Result<TokenResponse> {
        let builder = self.request(Method::POST, "/signup").json(credentials);
        let response: TokenResponse = self.send_json(builder).await?;
        self.session.set_token(response.token.clone());
        Ok(response)
    }

    async fn login(&self, credentials: &Credentials) -> Result<TokenResponse> {
        let builder = self.request(Method::POST, "/login").json(credentials);
        let response: TokenResponse = self.send_json(builder).await?;
        self.session.set_token(response.token.clone());
        Ok(response)
    }

    async fn get_profile(&self) -> Result<Profile> {
        self.send_json(self.request(Method::GET, "/profile")).await
    }

    async fn save_profile(&self, update: &ProfileUpdateRequest) -> Result<Profile> {
        let builder = self.request(Method::PUT, "/profile").json(update);
        self.send_json(builder).await
    }
}

#[async_trait]
impl RecipeBackend for HttpClient {
    async fn list_recipes(&self) -> Result<Vec<UserRecipe>> {
        self.send_json(self.request(Method::GET, "/recipes")).await
    }

    async fn get_recipe(&self, recipe_id: &str) -> Result<UserRecipe> {
        let builder = self.request(Method::GET, &format!("/recipes/{}", recipe_id));
        self.send_json(builder).await
    }

    async fn delete_recipe(&self, recipe_id: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/recipes/{}", recipe_id));
        self.send(builder).await?;
        Ok(())
    }

    async fn ask_question(&self, thread_id: &str, question: &str) -> Result<String> {
        let builder = self
            .request(Method::POST, &format!("/thread/{}/question", thread_id))
            .json(&QuestionRequest { question });
        let response: QuestionResponse = self.send_json(builder).await?;
        Ok(response.answer)
    }

    async fn modify_recipe(&self, recipe_id: &str, prompt: &str) -> Result<RecipeBody> {
        let builder = self
            .request(Method::POST, &format!("/recipes/{}/modify/chat", recipe_id))
            .json(&ModifyRecipeRequest { prompt });
        let recipe: RecipeBody = self.send_json(builder).await?;
        tracing::info!(recipe_id, title = %recipe.title, "Recipe modified");
        Ok(recipe)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct HttpClientBuilder {
    base_url: String,
    timeout: Duration,
    session: Option<Arc<dyn SessionProvider>>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Config("base_url is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let session = self
            .session
            .unwrap_or_else(|| Arc::new(StaticSession::anonymous()));

        Ok(HttpClient {
            http_client,
            base_url,
            session,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
