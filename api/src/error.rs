use thiserror::Error;
use uuid::Uuid;

use crate::domain::ui::{Event, State};

/// A draft that cannot be submitted. The orchestrator stays in `Composing`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported http method '{0}'")]
    InvalidMethod(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("no AI credential is configured")]
pub struct MissingCredential;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    MissingCredential(#[from] MissingCredential),
    #[error("another operation is already in flight ({0})")]
    Busy(State),
    #[error("{event} is not allowed while in {from}")]
    InvalidTransition { from: State, event: Event },
    #[error("no history entry with id {0}")]
    UnknownHistoryEntry(Uuid),
    #[error("background task failed: {0}")]
    TaskFailed(String),
}
