use std::path::PathBuf;
use std::time::Instant;

use crate::{Agent, DebateState, Mutation, QueryKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The backend actor became available (or went away).
    BackendReady(bool),
    /// Polling clock.
    Tick { now: Instant },
    /// Caller wants a fresh value for `key`; fetched only when stale.
    RefreshRequested { key: QueryKey, now: Instant },
    /// User edited the command box.
    CommandChanged(String),
    /// User sent the command box contents.
    CommandSubmitted,
    /// Final text from the speech recognizer.
    TranscriptCaptured(String),
    /// User pressed the interrupt button.
    InterruptRequested { reason: String },
    ClearRequested,
    ToggleAgentRequested { name: String },
    ResetAgentsRequested,
    FileSelected { path: PathBuf, name: String, size: u64 },
    UploadRequested,
    /// User asked for the transcript archive.
    ArchiveRequested,
    StatusLoaded {
        result: Result<DebateState, String>,
        at: Instant,
    },
    AgentsLoaded {
        result: Result<Vec<Agent>, String>,
        at: Instant,
    },
    MutationFinished {
        mutation: Mutation,
        result: Result<Option<String>, String>,
    },
    /// Cumulative upload progress after an acknowledged chunk.
    UploadProgressed { percent: u8 },
    /// Upload ended; `Ok` carries the agent the first chunk was routed to.
    UploadFinished { result: Result<String, String> },
    ArchiveFinished { result: Result<PathBuf, String> },
    /// Fallback for placeholder wiring.
    NoOp,
}
