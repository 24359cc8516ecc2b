pub mod recipe;
pub mod thread;
pub mod events;
pub mod user;
pub mod api;

pub use recipe::{Ingredient, MeasurementUnit, RecipeBody, UserRecipe};
pub use thread::{ChatMessage, ChatSource, Suggestion, ThreadState};
pub use events::{ThreadEvent, ThreadEventKind};
pub use user::{Credentials, Profile, ProfileUpdateRequest, SetupStep, Skill, TokenResponse};
pub use api::{ApiErrorBody, ApiErrorEnvelope};
