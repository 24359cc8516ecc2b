//! # Mise
//!
//! Client for an AI recipe assistant. A user describes what they want to
//! eat, the backend proposes recipes one at a time in a *thread*, and the
//! client lets them page through the suggestions, ask for another one
//! (optionally refining the prompt) and accept the one they like into
//! their recipe book.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mise::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let session = Arc::new(StaticSession::new(std::env::var("MISE_TOKEN")?));
//!     let client = Arc::new(HttpClient::from_config(&ClientConfig::default(), session)?);
//!
//!     let thread = ThreadFetcher::new(client).start("something with lentils").await?;
//!     println!("{}", render_card(&thread.snapshot()));
//!
//!     match thread.reject(Some("no coconut".to_string())).await {
//!         RejectOutcome::Failed(err) => eprintln!("{}", err.message()),
//!         _ => println!("{}", render_card(&thread.snapshot())),
//!     }
//!
//!     if let AcceptOutcome::Accepted(recipe) = thread.accept().await {
//!         println!("Saved {}", recipe.id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`mise-types`**: wire data model (recipes, suggestions, threads, profiles)
//! - **`mise-client`**: backend traits, HTTP client, in-memory backend
//! - **`mise-flow`**: suggestion thread controller, cook mode, signup wizard

pub mod prelude;

pub use async_trait::async_trait;

pub use mise_types::{
    ApiErrorBody, ChatMessage, ChatSource, Credentials, Ingredient, MeasurementUnit, Profile,
    ProfileUpdateRequest, RecipeBody, SetupStep, Skill, Suggestion, ThreadEvent, ThreadEventKind,
    ThreadState, TokenResponse, UserRecipe,
};

pub use mise_client::{
    AccountBackend, MiseBackend, RecipeBackend, SuggestionBackend,
    ClientConfig, ClientError, ErrorKind, HttpClient, HttpClientBuilder,
    MemorySession, SessionProvider, StaticSession,
    GeneratedSuggestion, MemoryBackend, ScriptedSource, SuggestionSource,
};

pub use mise_flow::{
    render_card, AcceptOutcome, CookMode, FlowError, Operation, RejectOutcome, SignupWizard,
    SuggestionThread, ThreadFetcher, ThreadView, ValidationError, WizardError,
};
