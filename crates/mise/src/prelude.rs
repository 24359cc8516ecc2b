//! Prelude module for convenient imports
//!
//! ```rust
//! use mise::prelude::*;
//! ```

pub use crate::{
    RecipeBody, Suggestion, ThreadState, UserRecipe, Credentials, Profile,
    SuggestionBackend, AccountBackend, RecipeBackend, MiseBackend,
    HttpClient, ClientConfig, ClientError, StaticSession, MemorySession, SessionProvider,
    MemoryBackend, ScriptedSource,
    SuggestionThread, ThreadFetcher, ThreadView, RejectOutcome, AcceptOutcome, FlowError,
    render_card, CookMode, SignupWizard,
};
