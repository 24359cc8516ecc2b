use std::fmt;
use std::sync::Arc;

use mise_client::{ClientError, ErrorKind};
use thiserror::Error;

/// Action a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Start,
    Reject,
    Accept,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Load => "load thread",
            Operation::Start => "start thread",
            Operation::Reject => "next suggestion",
            Operation::Accept => "accept suggestion",
        };
        f.write_str(name)
    }
}

/// Failure of a backend call, kept as data so views can render it
///
/// Cheap to clone: the underlying client error is shared.
#[derive(Error, Debug, Clone)]
#[error("{operation} failed: {source}")]
pub struct FlowError {
    pub operation: Operation,
    source: Arc<ClientError>,
}

impl FlowError {
    pub fn new(operation: Operation, source: ClientError) -> Self {
        Self {
            operation,
            source: Arc::new(source),
        }
    }

    pub fn client_error(&self) -> &ClientError {
        &self.source
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }

    /// Message suitable for showing to the user
    pub fn message(&self) -> String {
        self.source.user_message()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,

    #[error("Pick a skill level")]
    MissingSkill,

    #[error("Pick at least one cuisine")]
    NoCuisines,

    #[error("Pick at least one piece of equipment")]
    NoEquipment,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] ClientError),

    #[error("Signup is already complete")]
    Finished,
}
