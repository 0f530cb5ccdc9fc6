use std::time::{Duration, Instant};

use gang_core::{update, AppState, DebateState, Effect, Msg, QueryKey};
use pretty_assertions::assert_eq;

fn loaded(now: Instant) -> AppState {
    gang_logging::initialize_for_tests();
    let (state, _) = update(AppState::new(), Msg::BackendReady(true));
    let (state, _) = update(
        state,
        Msg::StatusLoaded {
            result: Ok(DebateState::default()),
            at: now,
        },
    );
    let (state, _) = update(
        state,
        Msg::AgentsLoaded {
            result: Ok(Vec::new()),
            at: now,
        },
    );
    state
}

#[test]
fn ticks_follow_each_query_interval() {
    let start = Instant::now();
    let state = loaded(start);

    let (state, effects) = update(state, Msg::Tick { now: start + Duration::from_secs(1) });
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::Tick { now: start + Duration::from_secs(3) });
    assert_eq!(effects, vec![Effect::Fetch(QueryKey::DebateStatus)]);

    // In flight: the next tick must not overlap it.
    let (state, effects) = update(state, Msg::Tick { now: start + Duration::from_secs(4) });
    assert!(effects.is_empty());

    let (_, effects) = update(state, Msg::Tick { now: start + Duration::from_secs(5) });
    assert_eq!(effects, vec![Effect::Fetch(QueryKey::AgentStatuses)]);
}

#[test]
fn ticks_do_nothing_without_backend() {
    let (_, effects) = update(AppState::new(), Msg::Tick { now: Instant::now() });
    assert!(effects.is_empty());
}

#[test]
fn refresh_only_fetches_stale_values() {
    let start = Instant::now();
    let state = loaded(start);

    let (state, effects) = update(
        state,
        Msg::RefreshRequested {
            key: QueryKey::DebateStatus,
            now: start + Duration::from_millis(500),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().debate.map(|d| d.stale), Some(false));

    let (state, effects) = update(
        state,
        Msg::RefreshRequested {
            key: QueryKey::DebateStatus,
            now: start + Duration::from_secs(2),
        },
    );
    assert_eq!(effects, vec![Effect::Fetch(QueryKey::DebateStatus)]);
    assert_eq!(state.view().debate.map(|d| d.stale), Some(true));
}

#[test]
fn repeated_poll_failures_notify_once() {
    let start = Instant::now();
    let state = loaded(start);
    let (state, _) = update(state, Msg::Tick { now: start + Duration::from_secs(3) });
    let (state, _) = update(
        state,
        Msg::StatusLoaded {
            result: Err("timeout".into()),
            at: start + Duration::from_secs(3),
        },
    );
    let (state, _) = update(state, Msg::Tick { now: start + Duration::from_secs(6) });
    let (mut state, _) = update(
        state,
        Msg::StatusLoaded {
            result: Err("timeout".into()),
            at: start + Duration::from_secs(6),
        },
    );

    let notices = state.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].text, "Failed to load debate status: timeout");
    // The last good value is still shown.
    assert!(state.view().debate.is_some());
    assert_eq!(state.view().debate_error.as_deref(), Some("timeout"));
}
