//! Client-held state machines for the mise recipe assistant
//!
//! The centrepiece is [`SuggestionThread`], a cursor over the append-only
//! list of suggestions in one thread. It mediates reject, accept, back and
//! forward, tracks a pending flag per asynchronous operation, and keeps the
//! last failure as data for the view to render.

pub mod error;
pub mod controller;
pub mod fetcher;
pub mod view;
pub mod cook;
pub mod wizard;

pub use error::{FlowError, Operation, ValidationError, WizardError};
pub use controller::{AcceptOutcome, RejectOutcome, SuggestionThread};
pub use fetcher::ThreadFetcher;
pub use view::{render_card, ThreadView};
pub use cook::CookMode;
pub use wizard::SignupWizard;
