use std::time::{Duration, Instant};

use crate::{Agent, DebateState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryKey {
    DebateStatus,
    AgentStatuses,
}

impl QueryKey {
    pub const ALL: [QueryKey; 2] = [QueryKey::DebateStatus, QueryKey::AgentStatuses];
}

/// Polling cadence and freshness window of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub refetch_interval: Duration,
    pub stale_time: Duration,
}

impl QueryPolicy {
    pub const DEBATE_STATUS: QueryPolicy = QueryPolicy {
        refetch_interval: Duration::from_secs(3),
        stale_time: Duration::from_secs(2),
    };

    pub const AGENT_STATUSES: QueryPolicy = QueryPolicy {
        refetch_interval: Duration::from_secs(5),
        stale_time: Duration::from_secs(3),
    };

    pub fn for_key(key: QueryKey) -> Self {
        match key {
            QueryKey::DebateStatus => Self::DEBATE_STATUS,
            QueryKey::AgentStatuses => Self::AGENT_STATUSES,
        }
    }
}

/// Cached copy of one remote query.
///
/// Invalidation bumps a generation counter. A fetch that began under an older
/// generation still stores its value, but the entry stays invalidated so the
/// next poll goes back to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry<T> {
    policy: QueryPolicy,
    value: Option<T>,
    updated_at: Option<Instant>,
    failed_at: Option<Instant>,
    error: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
    invalidated: bool,
}

impl<T> QueryEntry<T> {
    pub fn new(policy: QueryPolicy) -> Self {
        Self {
            policy,
            value: None,
            updated_at: None,
            failed_at: None,
            error: None,
            generation: 0,
            in_flight: None,
            invalidated: false,
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        match self.updated_at {
            _ if self.invalidated => true,
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.policy.stale_time,
        }
    }

    /// True when nothing is in flight and there is no usable value.
    ///
    /// A failed load does not count: it waits for the next poll.
    pub fn needs_fetch(&self) -> bool {
        self.in_flight.is_none()
            && self.failed_at.is_none()
            && (self.invalidated || self.value.is_none())
    }

    /// True when the polling loop should issue a fetch at `now`.
    pub fn should_poll(&self, now: Instant) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        if self.needs_fetch() {
            return true;
        }
        match self.updated_at.max(self.failed_at) {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.policy.refetch_interval,
        }
    }

    pub fn begin_fetch(&mut self) {
        self.in_flight = Some(self.generation);
    }

    pub fn resolve(&mut self, value: T, at: Instant) {
        let started = self.in_flight.take().unwrap_or(self.generation);
        self.value = Some(value);
        self.updated_at = Some(at);
        self.failed_at = None;
        self.error = None;
        if started == self.generation {
            self.invalidated = false;
        }
    }

    /// Records a failed fetch; the last good value stays visible.
    pub fn reject(&mut self, message: impl Into<String>, at: Instant) {
        self.in_flight = None;
        self.failed_at = Some(at);
        self.error = Some(message.into());
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.invalidated = true;
        self.failed_at = None;
    }
}

/// Client-side cache holding one entry per [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCache {
    debate: QueryEntry<DebateState>,
    agents: QueryEntry<Vec<Agent>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_policies(QueryPolicy::DEBATE_STATUS, QueryPolicy::AGENT_STATUSES)
    }

    pub fn with_policies(debate: QueryPolicy, agents: QueryPolicy) -> Self {
        Self {
            debate: QueryEntry::new(debate),
            agents: QueryEntry::new(agents),
        }
    }

    pub fn debate(&self) -> &QueryEntry<DebateState> {
        &self.debate
    }

    pub fn debate_mut(&mut self) -> &mut QueryEntry<DebateState> {
        &mut self.debate
    }

    pub fn agents(&self) -> &QueryEntry<Vec<Agent>> {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut QueryEntry<Vec<Agent>> {
        &mut self.agents
    }

    pub fn invalidate(&mut self, key: QueryKey) {
        match key {
            QueryKey::DebateStatus => self.debate.invalidate(),
            QueryKey::AgentStatuses => self.agents.invalidate(),
        }
    }

    pub fn begin_fetch(&mut self, key: QueryKey) {
        match key {
            QueryKey::DebateStatus => self.debate.begin_fetch(),
            QueryKey::AgentStatuses => self.agents.begin_fetch(),
        }
    }

    pub fn is_fetching(&self, key: QueryKey) -> bool {
        match key {
            QueryKey::DebateStatus => self.debate.is_fetching(),
            QueryKey::AgentStatuses => self.agents.is_fetching(),
        }
    }

    pub fn is_stale(&self, key: QueryKey, now: Instant) -> bool {
        match key {
            QueryKey::DebateStatus => self.debate.is_stale(now),
            QueryKey::AgentStatuses => self.agents.is_stale(now),
        }
    }

    pub fn needs_fetch(&self, key: QueryKey) -> bool {
        match key {
            QueryKey::DebateStatus => self.debate.needs_fetch(),
            QueryKey::AgentStatuses => self.agents.needs_fetch(),
        }
    }

    /// Keys whose polling interval has elapsed, in [`QueryKey::ALL`] order.
    pub fn due(&self, now: Instant) -> Vec<QueryKey> {
        QueryKey::ALL
            .into_iter()
            .filter(|key| match key {
                QueryKey::DebateStatus => self.debate.should_poll(now),
                QueryKey::AgentStatuses => self.agents.should_poll(now),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> (QueryEntry<u32>, Instant) {
        (QueryEntry::new(QueryPolicy::DEBATE_STATUS), Instant::now())
    }

    #[test]
    fn empty_entry_is_due_and_stale() {
        let (entry, now) = entry();
        assert!(entry.should_poll(now));
        assert!(entry.is_stale(now));
    }

    #[test]
    fn fresh_value_waits_for_refetch_interval() {
        let (mut entry, now) = entry();
        entry.begin_fetch();
        assert!(!entry.should_poll(now));
        entry.resolve(1, now);

        assert!(!entry.is_stale(now + Duration::from_millis(1_999)));
        assert!(entry.is_stale(now + Duration::from_secs(2)));
        assert!(!entry.should_poll(now + Duration::from_millis(2_999)));
        assert!(entry.should_poll(now + Duration::from_secs(3)));
    }

    #[test]
    fn invalidation_forces_next_poll() {
        let (mut entry, now) = entry();
        entry.begin_fetch();
        entry.resolve(1, now);
        entry.invalidate();

        assert!(entry.is_stale(now));
        assert!(entry.should_poll(now));
        assert_eq!(entry.value(), Some(&1));
    }

    #[test]
    fn fetch_started_before_invalidation_keeps_entry_invalidated() {
        let (mut entry, now) = entry();
        entry.begin_fetch();
        entry.invalidate();
        entry.resolve(5, now);

        assert_eq!(entry.value(), Some(&5));
        assert!(entry.is_invalidated());
        assert!(entry.should_poll(now));

        entry.begin_fetch();
        entry.resolve(6, now);
        assert!(!entry.is_invalidated());
        assert!(!entry.should_poll(now));
    }

    #[test]
    fn rejection_keeps_previous_value() {
        let (mut entry, now) = entry();
        entry.begin_fetch();
        entry.resolve(9, now);
        entry.begin_fetch();
        entry.reject("boom", now + Duration::from_secs(3));

        assert_eq!(entry.value(), Some(&9));
        assert_eq!(entry.error(), Some("boom"));
        assert!(!entry.is_fetching());
    }

    #[test]
    fn failed_first_load_waits_for_next_interval() {
        let (mut entry, now) = entry();
        entry.begin_fetch();
        entry.reject("offline", now);

        assert!(!entry.needs_fetch());
        assert!(!entry.should_poll(now + Duration::from_secs(1)));
        assert!(entry.should_poll(now + Duration::from_secs(3)));
    }

    #[test]
    fn cache_reports_due_keys_in_order() {
        let mut cache = QueryCache::new();
        let now = Instant::now();
        assert_eq!(cache.due(now), vec![QueryKey::DebateStatus, QueryKey::AgentStatuses]);

        cache.begin_fetch(QueryKey::AgentStatuses);
        assert_eq!(cache.due(now), vec![QueryKey::DebateStatus]);
    }
}
