use crate::{RosterEntry, TranscriptLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient user notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Ready,
    Uploading,
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub backend_ready: bool,
    pub debate: Option<DebateView>,
    pub debate_error: Option<String>,
    pub agents: Vec<AgentRowView>,
    pub agents_error: Option<String>,
    pub roster: Vec<RosterEntry>,
    pub upload: UploadView,
    pub command_input: String,
    pub sending: bool,
    pub notices: Vec<Notice>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateView {
    pub is_debating: bool,
    pub emergency_mode: bool,
    pub current_speaker: String,
    pub lines: Vec<TranscriptLine>,
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRowView {
    pub id: u64,
    pub name: String,
    pub enabled: bool,
    pub status_label: &'static str,
    pub last_cycles: Option<u64>,
    pub updating: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub progress: u8,
    pub status: UploadStatus,
    pub routed_agent: Option<String>,
}
