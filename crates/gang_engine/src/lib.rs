//! Gang engine: backend actor client, chunked uploads and effect execution.
mod actor;
mod engine;
mod persist;
mod preview;
mod types;
mod upload;

pub use actor::{ActorSettings, BackendActor, HttpActor};
pub use engine::{EngineConfig, EngineHandle};
pub use persist::{
    ensure_output_dir, write_transcript_archive, AtomicFileWriter, PersistError, ARCHIVE_FILENAME,
};
pub use preview::chunk_preview;
pub use types::{
    ActorError, EngineCommand, EngineEvent, EngineStopped, FailureKind, MutationReply, UploadProgress,
};
pub use upload::{
    ChannelProgressSink, ChunkSource, ChunkedUploader, FileSource, InMemorySource, ProgressSink,
    UploadError, UploadOutcome, UploadSettings,
};
