use crate::state::{PromptSource, SelectedFile};
use crate::view_model::{Notice, UploadStatus};
use crate::{AppState, Effect, Msg, Mutation, QueryKey};

pub const NOT_READY_NOTICE: &str = "Backend actor not initialized";
pub const DEFAULT_INTERRUPTION: &str = "User interruption";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::BackendReady(ready) => {
            state.backend_ready = ready;
            state.mark_dirty();
            if ready {
                let keys = QueryKey::ALL
                    .into_iter()
                    .filter(|key| state.cache.needs_fetch(*key))
                    .collect::<Vec<_>>();
                fetch(&mut state, keys)
            } else {
                Vec::new()
            }
        }
        Msg::Tick { now } => {
            state.now = Some(now);
            if state.backend_ready {
                let due = state.cache.due(now);
                fetch(&mut state, due)
            } else {
                Vec::new()
            }
        }
        Msg::RefreshRequested { key, now } => {
            state.now = Some(now);
            if !state.backend_ready {
                state.notify(Notice::error(NOT_READY_NOTICE));
                Vec::new()
            } else if state.cache.is_stale(key, now) {
                fetch(&mut state, vec![key])
            } else {
                Vec::new()
            }
        }
        Msg::CommandChanged(text) => {
            state.command_input = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::CommandSubmitted => {
            let prompt = state.command_input.trim().to_string();
            if prompt.is_empty() {
                state.notify(Notice::error("Please enter a command."));
                Vec::new()
            } else {
                start_debate(&mut state, prompt, PromptSource::Typed)
            }
        }
        Msg::TranscriptCaptured(text) => {
            let prompt = text.trim().to_string();
            if prompt.is_empty() {
                state.notify(Notice::error("No speech detected. Please try again."));
                Vec::new()
            } else {
                start_debate(&mut state, prompt, PromptSource::Voice)
            }
        }
        Msg::InterruptRequested { reason } => {
            let reason = match reason.trim() {
                "" => DEFAULT_INTERRUPTION.to_string(),
                trimmed => trimmed.to_string(),
            };
            mutate(&mut state, Mutation::AbortDebate { reason })
        }
        Msg::ClearRequested => mutate(&mut state, Mutation::ClearDebate),
        Msg::ToggleAgentRequested { name } => toggle_agent(&mut state, name),
        Msg::ResetAgentsRequested => {
            if state.resetting {
                Vec::new()
            } else {
                let effects = mutate(&mut state, Mutation::ResetAgents);
                state.resetting = !effects.is_empty();
                effects
            }
        }
        Msg::FileSelected { path, name, size } => {
            if state.upload.status == UploadStatus::Uploading {
                state.notify(Notice::error("An upload is already in progress."));
            } else {
                state.upload.selected = Some(SelectedFile { path, name, size });
                state.upload.status = UploadStatus::Ready;
                state.upload.progress = 0;
                state.upload.routed_agent = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadRequested => start_upload(&mut state),
        Msg::ArchiveRequested => {
            let transcript = state
                .cache
                .debate()
                .value()
                .map(|debate| debate.transcript.clone())
                .filter(|transcript| !transcript.is_empty());
            match transcript {
                None => {
                    state.notify(Notice::error("No transcript available to download"));
                    Vec::new()
                }
                Some(_) if state.archiving => Vec::new(),
                Some(transcript) => {
                    state.archiving = true;
                    state.mark_dirty();
                    vec![Effect::Archive { transcript }]
                }
            }
        }
        Msg::StatusLoaded { result, at } => {
            let entry = state.cache.debate_mut();
            match result {
                Ok(debate) => entry.resolve(debate, at),
                Err(message) => {
                    let first_failure = entry.error().is_none();
                    entry.reject(message.clone(), at);
                    if first_failure {
                        state.notify(Notice::error(format!(
                            "Failed to load debate status: {message}"
                        )));
                    }
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::AgentsLoaded { result, at } => {
            let entry = state.cache.agents_mut();
            match result {
                Ok(agents) => entry.resolve(agents, at),
                Err(message) => {
                    let first_failure = entry.error().is_none();
                    entry.reject(message.clone(), at);
                    if first_failure {
                        state.notify(Notice::error(format!(
                            "Failed to load agent registry: {message}"
                        )));
                    }
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::MutationFinished { mutation, result } => finish_mutation(&mut state, mutation, result),
        Msg::UploadProgressed { percent } => {
            if state.upload.status == UploadStatus::Uploading {
                state.upload.progress = state.upload.progress.max(percent.min(100));
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UploadFinished { result } => finish_upload(&mut state, result),
        Msg::ArchiveFinished { result } => {
            state.archiving = false;
            match result {
                Ok(path) => state.notify(Notice::success(format!(
                    "Transcript saved to {}",
                    path.display()
                ))),
                Err(message) => state.notify(Notice::error(format!(
                    "Failed to save transcript: {message}"
                ))),
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Marks each key as in flight and emits a fetch, skipping keys already loading.
fn fetch(state: &mut AppState, keys: Vec<QueryKey>) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(keys.len());
    for key in keys {
        if state.cache.is_fetching(key) {
            continue;
        }
        state.cache.begin_fetch(key);
        effects.push(Effect::Fetch(key));
    }
    effects
}

fn mutate(state: &mut AppState, mutation: Mutation) -> Vec<Effect> {
    if !state.backend_ready {
        state.notify(Notice::error(NOT_READY_NOTICE));
        return Vec::new();
    }
    state.pending_mutations += 1;
    state.mark_dirty();
    vec![Effect::Mutate(mutation)]
}

fn start_debate(state: &mut AppState, prompt: String, source: PromptSource) -> Vec<Effect> {
    if state.sending.is_some() {
        return Vec::new();
    }
    let effects = mutate(state, Mutation::StartDebate { prompt });
    if !effects.is_empty() {
        state.sending = Some(source);
    }
    effects
}

fn toggle_agent(state: &mut AppState, name: String) -> Vec<Effect> {
    if state.toggling.contains(&name) {
        return Vec::new();
    }
    let current = state
        .cache
        .agents()
        .value()
        .and_then(|agents| agents.iter().find(|agent| agent.name == name))
        .map(|agent| agent.is_enabled);
    let Some(current) = current else {
        state.notify(Notice::error(format!("Unknown agent {name}")));
        return Vec::new();
    };
    let effects = mutate(
        state,
        Mutation::ToggleAgent {
            name: name.clone(),
            enabled: !current,
        },
    );
    if !effects.is_empty() {
        state.toggling.insert(name);
    }
    effects
}

fn start_upload(state: &mut AppState) -> Vec<Effect> {
    if state.upload.status == UploadStatus::Uploading {
        return Vec::new();
    }
    let Some(file) = state.upload.selected.clone() else {
        state.notify(Notice::error("No file selected."));
        return Vec::new();
    };
    if !state.backend_ready {
        state.notify(Notice::error(NOT_READY_NOTICE));
        return Vec::new();
    }
    state.upload.status = UploadStatus::Uploading;
    state.upload.progress = 0;
    state.upload.routed_agent = None;
    state.notify(Notice::info(format!("Uploading {} ({} bytes)", file.name, file.size)));
    vec![Effect::Upload {
        path: file.path,
        name: file.name,
    }]
}

fn finish_mutation(
    state: &mut AppState,
    mutation: Mutation,
    result: Result<Option<String>, String>,
) -> Vec<Effect> {
    state.pending_mutations = state.pending_mutations.saturating_sub(1);
    let source = match &mutation {
        Mutation::StartDebate { .. } => state.sending.take(),
        Mutation::ToggleAgent { name, .. } => {
            state.toggling.remove(name);
            None
        }
        Mutation::ResetAgents => {
            state.resetting = false;
            None
        }
        Mutation::AbortDebate { .. } | Mutation::ClearDebate => None,
    };

    let detail = match result {
        Ok(detail) => detail,
        Err(message) => {
            state.notify(Notice::error(failure_text(&mutation, source, &message)));
            return Vec::new();
        }
    };

    if source == Some(PromptSource::Typed) {
        state.command_input.clear();
    }
    if let Mutation::ToggleAgent { name, enabled } = &mutation {
        if let Some(agent) = state
            .cache
            .agents_mut()
            .value_mut()
            .and_then(|agents| agents.iter_mut().find(|agent| &agent.name == name))
        {
            agent.is_enabled = *enabled;
        }
    }

    let mut text = success_text(&mutation, source);
    if let Some(detail) = detail.filter(|d| !d.trim().is_empty()) {
        text.push_str(&format!(" ({detail})"));
    }
    state.notify(Notice::success(text));

    for key in mutation.invalidates() {
        state.cache.invalidate(*key);
    }
    refetch_invalidated(state, mutation.invalidates())
}

fn finish_upload(state: &mut AppState, result: Result<String, String>) -> Vec<Effect> {
    if state.upload.status != UploadStatus::Uploading {
        return Vec::new();
    }
    match result {
        Ok(agent) => {
            let name = state
                .upload
                .selected
                .as_ref()
                .map(|file| file.name.clone())
                .unwrap_or_default();
            state.upload.status = UploadStatus::Complete;
            state.upload.progress = 100;
            state.upload.routed_agent = Some(agent.clone());
            state.notify(Notice::success(format!(
                "File \"{name}\" uploaded and routed successfully to {agent}!"
            )));
            state.cache.invalidate(QueryKey::DebateStatus);
            refetch_invalidated(state, &[QueryKey::DebateStatus])
        }
        Err(message) => {
            state.upload.status = UploadStatus::Failed;
            state.upload.progress = 0;
            state.notify(Notice::error(format!("Upload failed: {message}")));
            Vec::new()
        }
    }
}

fn refetch_invalidated(state: &mut AppState, keys: &[QueryKey]) -> Vec<Effect> {
    if !state.backend_ready {
        return Vec::new();
    }
    let keys = keys
        .iter()
        .copied()
        .filter(|key| state.cache.needs_fetch(*key))
        .collect();
    fetch(state, keys)
}

fn success_text(mutation: &Mutation, source: Option<PromptSource>) -> String {
    match mutation {
        Mutation::StartDebate { .. } if source == Some(PromptSource::Typed) => {
            "Command sent successfully!".to_string()
        }
        Mutation::StartDebate { .. } => "Debate started successfully!".to_string(),
        Mutation::AbortDebate { .. } => "Debate interrupted.".to_string(),
        Mutation::ClearDebate => "Boardroom cleared.".to_string(),
        Mutation::ToggleAgent { name, enabled } => {
            let state = if *enabled { "enabled" } else { "disabled" };
            format!("{name} {state} successfully")
        }
        Mutation::ResetAgents => "All agents have been reset successfully".to_string(),
    }
}

fn failure_text(mutation: &Mutation, source: Option<PromptSource>, message: &str) -> String {
    match mutation {
        Mutation::StartDebate { .. } if source == Some(PromptSource::Typed) => {
            format!("Failed to send command: {message}")
        }
        Mutation::StartDebate { .. } => format!("Failed to start debate: {message}"),
        Mutation::AbortDebate { .. } => format!("Failed to interrupt debate: {message}"),
        Mutation::ClearDebate => format!("Failed to clear boardroom: {message}"),
        Mutation::ToggleAgent { name, .. } => format!("Failed to toggle {name}: {message}"),
        Mutation::ResetAgents => format!("Failed to reset agents: {message}"),
    }
}
