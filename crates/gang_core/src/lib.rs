//! Gang core: pure dashboard state machine, query cache and transcript helpers.
mod cache;
mod effect;
mod markup;
mod model;
mod msg;
mod roster;
mod state;
mod transcript;
mod update;
mod upload;
mod view_model;

pub use cache::{QueryCache, QueryEntry, QueryKey, QueryPolicy};
pub use effect::{Effect, Mutation};
pub use markup::render_transcript_html;
pub use model::{Agent, AgentType, DebateState};
pub use msg::Msg;
pub use roster::{
    roster, roster_status, RosterEntry, RosterStatus, BYPASSED_IN_EMERGENCY, EMERGENCY_AGENT,
    GANG_ROSTER,
};
pub use state::{AppState, PromptSource, SelectedFile};
pub use transcript::{
    parse_transcript, TranscriptLine, TranscriptParser, DEFAULT_SPEAKER, KNOWN_SPEAKERS,
};
pub use update::{update, DEFAULT_INTERRUPTION, NOT_READY_NOTICE};
pub use upload::{
    chunk_name, progress_percent, FileKind, UploadPlan, CHUNK_SIZE, IMAGE_EXTENSIONS,
    PREVIEW_BYTES, TEXT_EXTENSIONS,
};
pub use view_model::{
    AgentRowView, AppViewModel, DebateView, Notice, NoticeLevel, UploadStatus, UploadView,
};
