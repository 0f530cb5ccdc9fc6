use std::fmt;
use std::path::PathBuf;

use gang_core::{Agent, DebateState, Mutation, QueryKey};

use crate::upload::{UploadError, UploadOutcome};

/// Output of one successful mutation: `Some(text)` when the backend replied
/// with a message worth showing.
pub type MutationReply = Option<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub chunk_index: u64,
    pub total_chunks: u64,
    pub processed_bytes: u64,
    pub total_bytes: u64,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StatusFetched(Result<DebateState, ActorError>),
    AgentsFetched(Result<Vec<Agent>, ActorError>),
    MutationCompleted {
        mutation: Mutation,
        result: Result<MutationReply, ActorError>,
    },
    UploadProgress(UploadProgress),
    UploadCompleted(Result<UploadOutcome, UploadError>),
    ArchiveWritten(Result<PathBuf, String>),
}

/// Work the engine thread accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Fetch(QueryKey),
    Mutate(Mutation),
    Upload { path: PathBuf, name: String },
    Archive { transcript: String },
}

/// The engine worker thread has exited; no further events will arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine worker stopped")]
pub struct EngineStopped;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ActorError {
    pub kind: FailureKind,
    pub message: String,
}

impl ActorError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_ready() -> Self {
        Self::new(FailureKind::NotReady, "Actor not initialized")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotReady,
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NotReady => write!(f, "backend not ready"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "invalid response"),
        }
    }
}
