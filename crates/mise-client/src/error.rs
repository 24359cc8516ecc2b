use mise_types::ApiErrorBody;
use thiserror::Error;

use crate::reducer::ReduceError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: ApiErrorBody },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend returned an empty response")]
    EmptyResponse,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Thread state error: {0}")]
    Reduce(#[from] ReduceError),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of a failure, used for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Validation,
    NotFound,
    Unauthorized,
    Server,
    Other,
}

impl ClientError {
    pub fn api(status: u16, body: ApiErrorBody) -> Self {
        ClientError::Api { status, body }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Transport,
            ClientError::Api { status, .. } => match status {
                400 | 422 => ErrorKind::Validation,
                401 | 403 => ErrorKind::Unauthorized,
                404 => ErrorKind::NotFound,
                500..=599 => ErrorKind::Server,
                _ => ErrorKind::Other,
            },
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::Reduce(ReduceError::SuggestionNotFound(_)) => ErrorKind::NotFound,
            ClientError::Decode(_) | ClientError::EmptyResponse => ErrorKind::Server,
            ClientError::Reduce(_)
            | ClientError::Session(_)
            | ClientError::Config(_)
            | ClientError::Internal(_) => ErrorKind::Other,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { body, .. } => body.message.clone(),
            ClientError::Transport(_) => "Could not reach the server".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
