use std::fs;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use gang_core::{update, AppState, Effect, Msg, Notice, TranscriptParser};
use gang_engine::{EngineCommand, EngineEvent, EngineHandle, EngineStopped};
use gang_logging::{gang_debug, gang_error, gang_info, gang_warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("engine stopped unexpectedly")]
    EngineStopped,
}

impl From<EngineStopped> for DriverError {
    fn from(_: EngineStopped) -> Self {
        DriverError::EngineStopped
    }
}

/// Runs the dashboard state machine against the engine.
///
/// Messages go through [`update`]; the resulting effects become engine
/// commands, and engine events come back as messages.
pub struct Driver {
    state: AppState,
    engine: Option<EngineHandle>,
}

impl Driver {
    pub fn new(engine: Option<EngineHandle>, parser: TranscriptParser) -> Self {
        Self {
            state: AppState::with_parser(parser),
            engine,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.state.take_notices()
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Announces backend readiness; a missing engine keeps the dashboard offline.
    pub fn connect(&mut self) {
        let ready = self.engine.is_some();
        self.dispatch(Msg::BackendReady(ready));
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects);
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        let Some(engine) = &self.engine else {
            if !effects.is_empty() {
                gang_warn!("Dropping {} effect(s): no backend", effects.len());
            }
            return;
        };
        for effect in effects {
            gang_debug!("Effect {effect:?}");
            engine.submit(effect_to_command(effect));
        }
    }

    pub fn is_online(&self) -> bool {
        self.engine.is_some()
    }

    /// Applies every engine event that arrives within `wait`.
    ///
    /// Returns false if no event arrived. Without an engine the call just
    /// sleeps for `wait`. A stopped worker drops the engine, marks the
    /// backend as not ready and fails with [`DriverError::EngineStopped`].
    pub fn pump(&mut self, wait: Duration) -> Result<bool, DriverError> {
        let received = match &self.engine {
            Some(engine) => engine.recv_timeout(wait),
            None => {
                thread::sleep(wait);
                return Ok(false);
            }
        };
        let first = match received {
            Ok(Some(event)) => event,
            Ok(None) => return Ok(false),
            Err(stopped) => {
                gang_error!("{stopped}");
                self.engine = None;
                self.dispatch(Msg::BackendReady(false));
                return Err(stopped.into());
            }
        };
        let mut events = vec![first];
        while let Some(event) = self.engine.as_ref().and_then(EngineHandle::try_recv) {
            events.push(event);
        }
        for event in events {
            self.dispatch(event_to_msg(event, Instant::now()));
        }
        Ok(true)
    }

    /// Pumps events until no remote work is outstanding.
    ///
    /// `observe` runs after every batch of events.
    pub fn run_until_idle(
        &mut self,
        idle_timeout: Duration,
        mut observe: impl FnMut(&mut Self),
    ) -> Result<(), DriverError> {
        let mut last_event = Instant::now();
        while !self.state.is_idle() {
            if self.engine.is_none() {
                return Err(DriverError::EngineStopped);
            }
            if self.pump(Duration::from_millis(100))? {
                last_event = Instant::now();
                observe(self);
            } else if last_event.elapsed() >= idle_timeout {
                return Err(DriverError::Timeout(idle_timeout));
            }
        }
        gang_info!("Driver idle");
        Ok(())
    }
}

/// Builds the selection message for a file on disk.
pub fn file_selected(path: &Path) -> io::Result<Msg> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file", path.display()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Msg::FileSelected {
        path: path.to_path_buf(),
        name,
        size: metadata.len(),
    })
}

pub fn effect_to_command(effect: Effect) -> EngineCommand {
    match effect {
        Effect::Fetch(key) => EngineCommand::Fetch(key),
        Effect::Mutate(mutation) => EngineCommand::Mutate(mutation),
        Effect::Upload { path, name } => EngineCommand::Upload { path, name },
        Effect::Archive { transcript } => EngineCommand::Archive { transcript },
    }
}

pub fn event_to_msg(event: EngineEvent, at: Instant) -> Msg {
    match event {
        EngineEvent::StatusFetched(result) => Msg::StatusLoaded {
            result: result.map_err(|err| err.to_string()),
            at,
        },
        EngineEvent::AgentsFetched(result) => Msg::AgentsLoaded {
            result: result.map_err(|err| err.to_string()),
            at,
        },
        EngineEvent::MutationCompleted { mutation, result } => {
            if let Err(err) = &result {
                gang_warn!("{} failed: {err}", mutation.label());
            }
            Msg::MutationFinished {
                mutation,
                result: result.map_err(|err| err.to_string()),
            }
        }
        EngineEvent::UploadProgress(progress) => Msg::UploadProgressed {
            percent: progress.percent,
        },
        EngineEvent::UploadCompleted(result) => Msg::UploadFinished {
            result: result
                .map(|outcome| outcome.routed_agent)
                .map_err(|err| err.to_string()),
        },
        EngineEvent::ArchiveWritten(result) => Msg::ArchiveFinished { result },
    }
}
