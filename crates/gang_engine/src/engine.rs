use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use gang_core::{Mutation, QueryKey};
use gang_logging::{gang_debug, gang_error};

use crate::actor::{ActorSettings, BackendActor, HttpActor};
use crate::persist::write_transcript_archive;
use crate::upload::{ChannelProgressSink, ChunkedUploader, FileSource, UploadSettings};
use crate::{ActorError, EngineCommand, EngineEvent, EngineStopped, MutationReply};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub actor: ActorSettings,
    pub upload: UploadSettings,
    pub archive_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            actor: ActorSettings::default(),
            upload: UploadSettings::default(),
            archive_dir: PathBuf::from("."),
        }
    }
}

/// Worker thread that runs backend calls on a tokio runtime.
///
/// Commands are accepted without blocking; results come back as
/// [`EngineEvent`]s in completion order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

struct Worker {
    actor: Arc<dyn BackendActor>,
    uploader: ChunkedUploader,
    archive_dir: PathBuf,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ActorError> {
        let actor = HttpActor::new(config.actor.clone())?;
        Ok(Self::with_actor(Arc::new(actor), config))
    }

    pub fn with_actor(actor: Arc<dyn BackendActor>, config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = Arc::new(Worker {
            actor,
            uploader: ChunkedUploader::new(config.upload),
            archive_dir: config.archive_dir,
        });

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    gang_error!("Failed to start engine runtime: {err}");
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let worker = worker.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    worker.handle(command, event_tx).await;
                });
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, command: EngineCommand) {
        gang_debug!("Engine command: {command:?}");
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    ///
    /// `Ok(None)` is a plain timeout. Once the worker thread has exited the
    /// call fails straight away with [`EngineStopped`].
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineStopped> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineStopped),
        }
    }
}

impl Worker {
    async fn handle(&self, command: EngineCommand, event_tx: mpsc::Sender<EngineEvent>) {
        let event = match command {
            EngineCommand::Fetch(QueryKey::DebateStatus) => {
                EngineEvent::StatusFetched(self.actor.get_status().await)
            }
            EngineCommand::Fetch(QueryKey::AgentStatuses) => {
                EngineEvent::AgentsFetched(self.actor.get_agent_registry().await)
            }
            EngineCommand::Mutate(mutation) => {
                let result = self.mutate(&mutation).await;
                EngineEvent::MutationCompleted { mutation, result }
            }
            EngineCommand::Upload { path, name } => {
                let sink = ChannelProgressSink::new(event_tx.clone());
                let result = match FileSource::open(&path, name) {
                    Ok(mut source) => {
                        self.uploader
                            .upload(self.actor.as_ref(), &mut source, &sink)
                            .await
                    }
                    Err(err) => Err(err),
                };
                EngineEvent::UploadCompleted(result)
            }
            EngineCommand::Archive { transcript } => EngineEvent::ArchiveWritten(
                write_transcript_archive(&self.archive_dir, &transcript)
                    .map_err(|err| err.to_string()),
            ),
        };
        let _ = event_tx.send(event);
    }

    async fn mutate(&self, mutation: &Mutation) -> Result<MutationReply, ActorError> {
        let actor = self.actor.as_ref();
        match mutation {
            Mutation::StartDebate { prompt } => actor.start_boardroom_debate(prompt).await,
            Mutation::AbortDebate { reason } => actor.abort_debate(reason).await.map(|_| None),
            Mutation::ClearDebate => actor.clear_boardroom().await.map(|_| None),
            Mutation::ToggleAgent { name, enabled } => actor
                .toggle_agent_status(name, *enabled)
                .await
                .map(|_| None),
            Mutation::ResetAgents => actor.initialize_agents().await.map(|_| None),
        }
    }
}
