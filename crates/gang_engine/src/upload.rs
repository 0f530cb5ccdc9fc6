use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use gang_core::{chunk_name, progress_percent, UploadPlan, CHUNK_SIZE, PREVIEW_BYTES};
use gang_logging::{gang_debug, gang_info, gang_warn};

use crate::preview::chunk_preview;
use crate::{ActorError, BackendActor, EngineEvent, UploadProgress};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Random-access byte source for one file being uploaded.
pub trait ChunkSource: Send {
    fn name(&self) -> &str;
    fn len(&self) -> u64;
    fn read_range(&mut self, range: Range<u64>) -> io::Result<Vec<u8>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct InMemorySource {
    name: String,
    bytes: Vec<u8>,
}

impl InMemorySource {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl ChunkSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_range(&mut self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let start = usize::try_from(range.start).map_err(io::Error::other)?;
        let end = usize::try_from(range.end).map_err(io::Error::other)?;
        self.bytes
            .get(start..end)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "range past end of data"))
    }
}

/// File on disk, read one chunk at a time.
#[derive(Debug)]
pub struct FileSource {
    name: String,
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open(path: &Path, name: impl Into<String>) -> Result<Self, UploadError> {
        let open_error = |err: io::Error| UploadError::Open {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let file = File::open(path).map_err(open_error)?;
        let metadata = file.metadata().map_err(open_error)?;
        if !metadata.is_file() {
            return Err(UploadError::Open {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            file,
            len: metadata.len(),
        })
    }
}

impl ChunkSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.len
    }

    fn read_range(&mut self, range: Range<u64>) -> io::Result<Vec<u8>> {
        let len = usize::try_from(range.end - range.start).map_err(io::Error::other)?;
        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(range.start))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSettings {
    pub chunk_size: u64,
    pub preview_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            preview_bytes: PREVIEW_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Agent that accepted the first chunk.
    pub routed_agent: String,
    pub chunks: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("{name} is empty")]
    EmptyFile { name: String },
    #[error("cannot open {}: {message}", .path.display())]
    Open { path: PathBuf, message: String },
    #[error("failed to read chunk {}: {message}", .chunk_index + 1)]
    Read { chunk_index: u64, message: String },
    #[error("chunk {} of {total_chunks} was not routed: {source}", .chunk_index + 1)]
    Submit {
        chunk_index: u64,
        total_chunks: u64,
        source: ActorError,
    },
}

/// Splits a file into fixed-size chunks and routes them one after another.
#[derive(Debug, Clone, Default)]
pub struct ChunkedUploader {
    settings: UploadSettings,
}

impl ChunkedUploader {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }

    /// Routes every chunk in order, stopping at the first failure.
    ///
    /// A progress event follows each acknowledged chunk; nothing is emitted
    /// for a chunk the backend did not accept.
    pub async fn upload(
        &self,
        actor: &dyn BackendActor,
        source: &mut dyn ChunkSource,
        sink: &dyn ProgressSink,
    ) -> Result<UploadOutcome, UploadError> {
        let name = source.name().to_string();
        if source.is_empty() {
            return Err(UploadError::EmptyFile { name });
        }

        let total_bytes = source.len();
        let plan = UploadPlan::new(total_bytes, self.settings.chunk_size);
        gang_info!(
            "Uploading {name} ({total_bytes} bytes) in {} chunk(s)",
            plan.total_chunks
        );

        let mut routed_agent = None;
        let mut processed = 0u64;
        for (chunk_index, range) in (0u64..).zip(plan.ranges()) {
            let bytes = source
                .read_range(range.clone())
                .map_err(|err| UploadError::Read {
                    chunk_index,
                    message: err.to_string(),
                })?;
            let preview = chunk_preview(&name, total_bytes, &bytes, self.settings.preview_bytes);
            let chunk_label = chunk_name(&name, chunk_index, plan.total_chunks);
            gang_debug!("Routing {chunk_label} ({} bytes)", bytes.len());

            let agent = actor
                .route_document(&chunk_label, &preview, bytes.len() as u64)
                .await
                .map_err(|err| {
                    gang_warn!("Routing {chunk_label} failed: {err}");
                    UploadError::Submit {
                        chunk_index,
                        total_chunks: plan.total_chunks,
                        source: err,
                    }
                })?;
            gang_debug!("{chunk_label} routed to {agent}");

            processed += range.end - range.start;
            routed_agent.get_or_insert(agent);
            sink.emit(EngineEvent::UploadProgress(UploadProgress {
                chunk_index,
                total_chunks: plan.total_chunks,
                processed_bytes: processed,
                total_bytes,
                percent: progress_percent(processed, total_bytes),
            }));
        }

        let routed_agent = routed_agent.unwrap_or_default();
        gang_info!("{name} routed to {routed_agent}");
        Ok(UploadOutcome {
            routed_agent,
            chunks: plan.total_chunks,
            bytes: processed,
        })
    }
}
