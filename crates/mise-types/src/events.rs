use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recipe::RecipeBody;

/// One entry of a thread's append-only event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadEvent {
    #[serde(flatten)]
    pub kind: ThreadEventKind,
    pub timestamp: DateTime<Utc>,
}

impl ThreadEvent {
    pub fn new(kind: ThreadEventKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn at(kind: ThreadEventKind, timestamp: DateTime<Utc>) -> Self {
        Self { kind, timestamp }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ThreadEventKind {
    PromptSet {
        prompt: String,
    },
    PromptEdited {
        prompt: String,
    },
    SuggestionGenerated {
        suggestion_id: String,
        recipe: RecipeBody,
        response_text: String,
    },
    SuggestionAccepted {
        suggestion_id: String,
        recipe_id: String,
    },
    SuggestionRejected {
        suggestion_id: String,
    },
    RecipeModified {
        recipe: RecipeBody,
    },
    RecipeModificationAccepted,
    RecipeModificationRejected,
    QuestionAnswered {
        question: String,
        answer: String,
    },
}

impl ThreadEventKind {
    /// Wire name of the event type
    pub fn name(&self) -> &'static str {
        match self {
            ThreadEventKind::PromptSet { .. } => "PromptSet",
            ThreadEventKind::PromptEdited { .. } => "PromptEdited",
            ThreadEventKind::SuggestionGenerated { .. } => "SuggestionGenerated",
            ThreadEventKind::SuggestionAccepted { .. } => "SuggestionAccepted",
            ThreadEventKind::SuggestionRejected { .. } => "SuggestionRejected",
            ThreadEventKind::RecipeModified { .. } => "RecipeModified",
            ThreadEventKind::RecipeModificationAccepted => "RecipeModificationAccepted",
            ThreadEventKind::RecipeModificationRejected => "RecipeModificationRejected",
            ThreadEventKind::QuestionAnswered { .. } => "QuestionAnswered",
        }
    }
}
