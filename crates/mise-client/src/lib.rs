pub mod error;
pub mod session;
pub mod traits;
pub mod config;
pub mod http;
pub mod reducer;
pub mod memory;

pub use error::{ClientError, ErrorKind, Result};
pub use session::{MemorySession, SessionProvider, StaticSession};
pub use traits::{AccountBackend, MiseBackend, RecipeBackend, SuggestionBackend};
pub use config::ClientConfig;
pub use http::{HttpClient, HttpClientBuilder};
pub use reducer::{reduce_events, ReduceError};
pub use memory::{GeneratedSuggestion, MemoryBackend, ScriptedSource, SuggestionSource};
