use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use crate::roster::roster;
use crate::view_model::{AgentRowView, AppViewModel, DebateView, Notice, UploadStatus, UploadView};
use crate::{QueryCache, QueryKey, TranscriptParser};

/// Where a debate prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Typed,
    Voice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct UploadState {
    pub(crate) selected: Option<SelectedFile>,
    pub(crate) progress: u8,
    pub(crate) status: UploadStatus,
    pub(crate) routed_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) backend_ready: bool,
    pub(crate) cache: QueryCache,
    pub(crate) parser: TranscriptParser,
    pub(crate) command_input: String,
    pub(crate) sending: Option<PromptSource>,
    pub(crate) pending_mutations: usize,
    pub(crate) toggling: BTreeSet<String>,
    pub(crate) resetting: bool,
    pub(crate) upload: UploadState,
    pub(crate) archiving: bool,
    pub(crate) notices: Vec<Notice>,
    pub(crate) now: Option<Instant>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(parser: TranscriptParser) -> Self {
        Self {
            parser,
            ..Self::default()
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// True when no remote work started by this state is still outstanding.
    pub fn is_idle(&self) -> bool {
        QueryKey::ALL
            .iter()
            .all(|key| !self.cache.is_fetching(*key))
            && self.pending_mutations == 0
            && self.upload.status != UploadStatus::Uploading
            && !self.archiving
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hands pending notices to the caller, leaving none behind.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn view(&self) -> AppViewModel {
        let debate_entry = self.cache.debate();
        let debate = debate_entry.value().map(|state| DebateView {
            is_debating: state.is_debating || self.sending.is_some(),
            emergency_mode: state.emergency_mode,
            current_speaker: state.current_speaker.clone(),
            lines: self.parser.parse(&state.transcript),
            stale: self
                .now
                .map(|now| debate_entry.is_stale(now))
                .unwrap_or(debate_entry.is_invalidated()),
        });
        let emergency_mode = debate.as_ref().is_some_and(|d| d.emergency_mode);

        let agents = self
            .cache
            .agents()
            .value()
            .map(|agents| {
                agents
                    .iter()
                    .map(|agent| AgentRowView {
                        id: agent.id,
                        name: agent.name.clone(),
                        enabled: agent.is_enabled,
                        status_label: agent.status_label(),
                        last_cycles: agent.last_cycles,
                        updating: self.toggling.contains(&agent.name) || self.resetting,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let selected = self.upload.selected.as_ref();
        AppViewModel {
            backend_ready: self.backend_ready,
            debate,
            debate_error: debate_entry.error().map(ToOwned::to_owned),
            agents,
            agents_error: self.cache.agents().error().map(ToOwned::to_owned),
            roster: roster(emergency_mode),
            upload: UploadView {
                file_name: selected.map(|file| file.name.clone()),
                file_size: selected.map(|file| file.size),
                progress: self.upload.progress,
                status: self.upload.status,
                routed_agent: self.upload.routed_agent.clone(),
            },
            command_input: self.command_input.clone(),
            sending: self.sending.is_some(),
            notices: self.notices.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether the view changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        self.dirty = true;
    }
}
