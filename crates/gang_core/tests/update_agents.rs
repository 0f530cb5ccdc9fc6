use std::time::Instant;

use gang_core::{update, Agent, AppState, Effect, Msg, Mutation, QueryKey};
use pretty_assertions::assert_eq;

fn agent(id: u64, name: &str, enabled: bool) -> Agent {
    Agent {
        id,
        name: name.to_string(),
        is_enabled: enabled,
        last_cycles: None,
        agent_type: None,
        principal_id: None,
    }
}

fn loaded_state(agents: Vec<Agent>) -> AppState {
    gang_logging::initialize_for_tests();
    let (state, _) = update(AppState::new(), Msg::BackendReady(true));
    let (state, _) = update(
        state,
        Msg::AgentsLoaded {
            result: Ok(agents),
            at: Instant::now(),
        },
    );
    state
}

#[test]
fn toggle_requests_inverse_of_cached_flag() {
    let state = loaded_state(vec![agent(1, "Skippy", true), agent(2, "Janet", false)]);

    let (state, effects) = update(state, Msg::ToggleAgentRequested { name: "Janet".into() });
    assert_eq!(
        effects,
        vec![Effect::Mutate(Mutation::ToggleAgent {
            name: "Janet".into(),
            enabled: true,
        })]
    );
    let row = state.view().agents.into_iter().find(|a| a.name == "Janet").unwrap();
    assert!(row.updating);

    // Second toggle for the same agent is ignored while in flight.
    let (_, effects) = update(state, Msg::ToggleAgentRequested { name: "Janet".into() });
    assert!(effects.is_empty());
}

#[test]
fn toggle_success_updates_cache_and_refetches_registry() {
    let state = loaded_state(vec![agent(2, "Janet", false)]);
    let (state, _) = update(state, Msg::ToggleAgentRequested { name: "Janet".into() });

    let (state, effects) = update(
        state,
        Msg::MutationFinished {
            mutation: Mutation::ToggleAgent {
                name: "Janet".into(),
                enabled: true,
            },
            result: Ok(None),
        },
    );
    // Debate status is still loading from BackendReady, so only the registry refetches.
    assert_eq!(effects, vec![Effect::Fetch(QueryKey::AgentStatuses)]);
    let view = state.view();
    assert!(view.agents[0].enabled);
    assert!(!view.agents[0].updating);
    assert_eq!(view.notices.last().unwrap().text, "Janet enabled successfully");

    // Re-query returns the backend's view, which now agrees.
    let (state, _) = update(
        state,
        Msg::AgentsLoaded {
            result: Ok(vec![agent(2, "Janet", true)]),
            at: Instant::now(),
        },
    );
    assert!(state.view().agents[0].enabled);
    assert!(!state.cache().agents().is_invalidated());
}

#[test]
fn toggle_failure_leaves_flag_untouched() {
    let state = loaded_state(vec![agent(1, "Robby", true)]);
    let (state, _) = update(state, Msg::ToggleAgentRequested { name: "Robby".into() });
    let (state, effects) = update(
        state,
        Msg::MutationFinished {
            mutation: Mutation::ToggleAgent {
                name: "Robby".into(),
                enabled: false,
            },
            result: Err("rejected".into()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.agents[0].enabled);
    assert_eq!(view.notices.last().unwrap().text, "Failed to toggle Robby: rejected");
}

#[test]
fn unknown_agent_is_reported() {
    let state = loaded_state(vec![agent(1, "Robby", true)]);
    let (state, effects) = update(state, Msg::ToggleAgentRequested { name: "HAL".into() });
    assert!(effects.is_empty());
    assert_eq!(state.notices().last().unwrap().text, "Unknown agent HAL");
}

#[test]
fn reset_invalidates_registry_only() {
    let state = loaded_state(vec![agent(1, "Robby", false)]);
    let (state, effects) = update(state, Msg::ResetAgentsRequested);
    assert_eq!(effects, vec![Effect::Mutate(Mutation::ResetAgents)]);
    assert!(state.view().agents[0].updating);

    let (state, effects) = update(state, Msg::ResetAgentsRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::MutationFinished {
            mutation: Mutation::ResetAgents,
            result: Ok(None),
        },
    );
    assert_eq!(effects, vec![Effect::Fetch(QueryKey::AgentStatuses)]);
    assert!(!state.cache().debate().is_invalidated());
}
