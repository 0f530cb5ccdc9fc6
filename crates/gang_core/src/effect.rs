use std::path::PathBuf;

use crate::QueryKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(QueryKey),
    Mutate(Mutation),
    Upload { path: PathBuf, name: String },
    Archive { transcript: String },
}

/// Remote calls that change backend state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    StartDebate { prompt: String },
    AbortDebate { reason: String },
    ClearDebate,
    ToggleAgent { name: String, enabled: bool },
    ResetAgents,
}

impl Mutation {
    /// Cached queries that must be refetched once this mutation succeeds.
    pub fn invalidates(&self) -> &'static [QueryKey] {
        match self {
            Mutation::StartDebate { .. } | Mutation::AbortDebate { .. } | Mutation::ClearDebate => {
                &[QueryKey::DebateStatus]
            }
            Mutation::ToggleAgent { .. } => &[QueryKey::AgentStatuses, QueryKey::DebateStatus],
            Mutation::ResetAgents => &[QueryKey::AgentStatuses],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mutation::StartDebate { .. } => "startBoardroomDebate",
            Mutation::AbortDebate { .. } => "abortDebate",
            Mutation::ClearDebate => "clearBoardroom",
            Mutation::ToggleAgent { .. } => "toggleAgentStatus",
            Mutation::ResetAgents => "initializeAgents",
        }
    }
}
