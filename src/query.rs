//! Debounced, stale-safe mention queries
//!
//! Every dispatched query gets a fresh `QueryToken`. A completion is applied
//! if and only if its token equals the current outstanding token, which makes
//! the results independent of network completion order. Superseded debounce
//! timers are cancelled explicitly; superseded requests are left to finish
//! and ignored.

use serde::Serialize;

use crate::commands::Cmd;
use crate::entity::{normalize_with, Entity, InsertionStyle, RawEntity};
use crate::provider::ProviderError;
use crate::trigger::{Category, TriggerMatch, TriggerTable};

pub const STATUS_SEARCHING: &str = "Searching...";
pub const STATUS_NO_RESULTS: &str = "No results found.";
pub const STATUS_FAILED: &str = "Search failed.";

/// Identity of one dispatched query. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QueryToken(pub u64);

/// Identity of one scheduled debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSearch {
    timer: TimerId,
    category: Category,
    query: String,
}

/// Dispatch tuning
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub delay_ms: u64,
    pub max_results: usize,
    pub insertion: InsertionStyle,
    pub triggers: TriggerTable,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay_ms: 300,
            max_results: 6,
            insertion: InsertionStyle::default(),
            triggers: TriggerTable::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryDispatcher {
    config: DispatchConfig,
    current: Option<(Category, String)>,
    current_token: Option<QueryToken>,
    awaiting: bool,
    pending: Option<PendingSearch>,
    next_id: u64,
    status: Option<String>,
    results: Vec<Entity>,
    /// Bumped whenever results or status change; identifies menu content
    generation: u64,
}

impl QueryDispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            current: None,
            current_token: None,
            awaiting: false,
            pending: None,
            next_id: 0,
            status: None,
            results: Vec::new(),
            generation: 0,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn results(&self) -> &[Entity] {
        &self.results
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The query text currently being composed, if a trigger is active
    pub fn current_query(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, q)| q.as_str())
    }

    pub fn current_token(&self) -> Option<QueryToken> {
        self.current_token
    }

    /// A debounce timer is scheduled and has not fired
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// A query has been dispatched and its results have not arrived
    pub fn is_searching(&self) -> bool {
        self.awaiting
    }

    /// Results or a status message are available to show
    pub fn has_content(&self) -> bool {
        !self.results.is_empty() || self.status.is_some()
    }

    fn mint(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn publish(&mut self, results: Vec<Entity>, status: Option<String>) {
        self.results = results;
        self.status = status;
        self.generation += 1;
    }

    fn cancel_pending(&mut self) -> Option<Cmd> {
        self.pending.take().map(|_| Cmd::CancelSearchTimer)
    }

    /// React to a new focused-token resolution
    pub fn on_token_changed(&mut self, matched: Option<&TriggerMatch>) -> Option<Cmd> {
        let Some(matched) = matched else {
            return self.clear();
        };

        let next = (matched.category, matched.query.clone());
        if self.current.as_ref() == Some(&next) {
            return None;
        }

        let cancel = self.cancel_pending();
        // Whatever is in flight belongs to an older query now
        self.current_token = None;
        self.awaiting = false;
        self.current = Some(next);

        if matched.query.is_empty() {
            // A bare trigger character does not search
            self.publish(Vec::new(), None);
            return Cmd::combine([cancel, Some(Cmd::Redraw)]);
        }

        let timer = TimerId(self.mint());
        self.pending = Some(PendingSearch {
            timer,
            category: matched.category,
            query: matched.query.clone(),
        });
        tracing::debug!(
            "Debouncing {} query {:?} ({}ms, timer {})",
            matched.category,
            matched.query,
            self.config.delay_ms,
            timer.0
        );
        Cmd::combine([
            cancel,
            Some(Cmd::ScheduleSearch {
                timer,
                delay_ms: self.config.delay_ms,
            }),
        ])
    }

    /// Debounce timer fired: dispatch the pending query
    pub fn on_timer_fired(&mut self, timer: TimerId) -> Option<Cmd> {
        match &self.pending {
            Some(pending) if pending.timer == timer => {}
            _ => {
                tracing::debug!("Ignoring superseded debounce timer {}", timer.0);
                return None;
            }
        }
        let pending = self.pending.take()?;

        let token = QueryToken(self.mint());
        self.current_token = Some(token);
        self.awaiting = true;
        let results = std::mem::take(&mut self.results);
        self.publish(results, Some(STATUS_SEARCHING.to_string()));

        tracing::info!(
            "Dispatching {} search {:?} (token {})",
            pending.category,
            pending.query,
            token.0
        );
        Some(Cmd::batch(vec![
            Cmd::RunSearch {
                token,
                category: pending.category,
                query: pending.query,
            },
            Cmd::Redraw,
        ]))
    }

    /// Apply a provider completion. Stale tokens are dropped silently.
    pub fn on_search_completed(
        &mut self,
        token: QueryToken,
        outcome: Result<Vec<RawEntity>, ProviderError>,
    ) -> Option<Cmd> {
        if self.current_token != Some(token) {
            tracing::debug!(
                "Discarding stale search results: token {} != current {:?}",
                token.0,
                self.current_token.map(|t| t.0)
            );
            return None;
        }
        self.awaiting = false;

        match outcome {
            Ok(raw) => {
                let results: Vec<Entity> = raw
                    .iter()
                    .filter_map(|raw| {
                        let insertion = self
                            .config
                            .insertion
                            .for_category(raw.category(), &self.config.triggers);
                        match normalize_with(raw, insertion) {
                            Ok(entity) => Some(entity),
                            Err(e) => {
                                tracing::warn!("Dropping search result: {}", e);
                                None
                            }
                        }
                    })
                    .take(self.config.max_results)
                    .collect();
                let status = results
                    .is_empty()
                    .then(|| STATUS_NO_RESULTS.to_string());
                tracing::debug!("Applied {} results for token {}", results.len(), token.0);
                self.publish(results, status);
            }
            Err(e) => {
                tracing::warn!("Search failed for token {}: {}", token.0, e);
                self.current_token = None;
                self.publish(Vec::new(), Some(STATUS_FAILED.to_string()));
            }
        }
        Some(Cmd::Redraw)
    }

    /// Drop all query state and cancel the pending timer
    pub fn clear(&mut self) -> Option<Cmd> {
        let cancel = self.cancel_pending();
        let had_state = self.current.is_some() || self.current_token.is_some() || self.has_content();
        self.current = None;
        self.current_token = None;
        self.awaiting = false;
        if self.has_content() {
            self.publish(Vec::new(), None);
        }
        let redraw = had_state.then_some(Cmd::Redraw);
        Cmd::combine([cancel, redraw])
    }
}

impl Default for QueryDispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::RawUser;

    fn user(slug: &str) -> RawEntity {
        RawEntity::User(RawUser {
            slug: Some(slug.into()),
            username: Some(slug.to_uppercase()),
            ..Default::default()
        })
    }

    fn mention(query: &str) -> TriggerMatch {
        TriggerMatch {
            trigger: '@',
            category: Category::User,
            query: query.into(),
            start: 0,
            end: query.len() + 1,
            quoted: false,
        }
    }

    fn scheduled_timer(cmd: Option<Cmd>) -> TimerId {
        let cmd = cmd.expect("expected a command");
        cmd.flatten()
            .into_iter()
            .find_map(|c| match c {
                Cmd::ScheduleSearch { timer, .. } => Some(*timer),
                _ => None,
            })
            .expect("expected ScheduleSearch")
    }

    fn dispatched_token(cmd: Option<Cmd>) -> QueryToken {
        let cmd = cmd.expect("expected a command");
        cmd.flatten()
            .into_iter()
            .find_map(|c| match c {
                Cmd::RunSearch { token, .. } => Some(*token),
                _ => None,
            })
            .expect("expected RunSearch")
    }

    #[test]
    fn test_debounce_coalesces_keystrokes() {
        let mut d = QueryDispatcher::default();
        let first = scheduled_timer(d.on_token_changed(Some(&mention("ab"))));
        let second = scheduled_timer(d.on_token_changed(Some(&mention("abc"))));

        // The first timer was superseded
        assert!(d.on_timer_fired(first).is_none());
        let cmd = d.on_timer_fired(second).unwrap();
        let queries: Vec<_> = cmd
            .flatten()
            .into_iter()
            .filter_map(|c| match c {
                Cmd::RunSearch { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(queries, vec!["abc"]);
        assert_eq!(d.status(), Some(STATUS_SEARCHING));
    }

    #[test]
    fn test_unchanged_query_is_noop() {
        let mut d = QueryDispatcher::default();
        assert!(d.on_token_changed(Some(&mention("ab"))).is_some());
        assert!(d.on_token_changed(Some(&mention("ab"))).is_none());
    }

    #[test]
    fn test_empty_query_clears_without_dispatch() {
        let mut d = QueryDispatcher::default();
        let timer = scheduled_timer(d.on_token_changed(Some(&mention("a"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        d.on_search_completed(token, Ok(vec![user("ann")]));
        assert_eq!(d.results().len(), 1);

        let cmd = d.on_token_changed(Some(&mention("")));
        assert_eq!(cmd, Some(Cmd::Redraw));
        assert!(d.results().is_empty());
        assert_eq!(d.status(), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut d = QueryDispatcher::default();
        let timer_a = scheduled_timer(d.on_token_changed(Some(&mention("a"))));
        let token_a = dispatched_token(d.on_timer_fired(timer_a));
        let timer_b = scheduled_timer(d.on_token_changed(Some(&mention("b"))));
        let token_b = dispatched_token(d.on_timer_fired(timer_b));
        assert!(token_b > token_a);

        assert!(d.on_search_completed(token_b, Ok(vec![user("bob")])).is_some());
        // A resolves after B and must not clobber it
        assert!(d.on_search_completed(token_a, Ok(vec![user("ann")])).is_none());
        assert_eq!(d.results()[0].id, "bob");
    }

    #[test]
    fn test_results_truncated_and_no_results_status() {
        let mut d = QueryDispatcher::new(DispatchConfig {
            max_results: 2,
            ..Default::default()
        });
        let timer = scheduled_timer(d.on_token_changed(Some(&mention("x"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        d.on_search_completed(token, Ok(vec![user("a"), user("b"), user("c")]));
        assert_eq!(d.results().len(), 2);
        assert_eq!(d.status(), None);

        let timer = scheduled_timer(d.on_token_changed(Some(&mention("xy"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        d.on_search_completed(token, Ok(vec![]));
        assert!(d.results().is_empty());
        assert_eq!(d.status(), Some(STATUS_NO_RESULTS));
    }

    #[test]
    fn test_malformed_entity_dropped_from_batch() {
        let mut d = QueryDispatcher::default();
        let timer = scheduled_timer(d.on_token_changed(Some(&mention("x"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        let broken = RawEntity::User(RawUser::default());
        d.on_search_completed(token, Ok(vec![broken, user("ok")]));
        assert_eq!(d.results().len(), 1);
        assert_eq!(d.results()[0].id, "ok");
    }

    #[test]
    fn test_failure_surfaces_status() {
        let mut d = QueryDispatcher::default();
        let timer = scheduled_timer(d.on_token_changed(Some(&mention("x"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        let cmd = d.on_search_completed(token, Err(ProviderError::Status(500)));
        assert_eq!(cmd, Some(Cmd::Redraw));
        assert_eq!(d.status(), Some(STATUS_FAILED));
        assert!(!d.is_searching());
        assert_eq!(d.current_token(), None);
    }

    #[test]
    fn test_clear_cancels_timer_and_invalidates_in_flight() {
        let mut d = QueryDispatcher::default();
        let timer = scheduled_timer(d.on_token_changed(Some(&mention("x"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        d.on_token_changed(Some(&mention("xy")));

        let cmd = d.on_token_changed(None).unwrap();
        assert!(cmd.flatten().contains(&&Cmd::CancelSearchTimer));
        assert!(d.on_search_completed(token, Ok(vec![user("x")])).is_none());
        assert!(d.results().is_empty());
        assert_eq!(d.current_query(), None);
        // Nothing left to clear
        assert!(d.clear().is_none());
    }

    #[test]
    fn test_trigger_insertion_style() {
        let mut d = QueryDispatcher::new(DispatchConfig {
            insertion: InsertionStyle::Trigger,
            ..Default::default()
        });
        let timer = scheduled_timer(d.on_token_changed(Some(&mention("a"))));
        let token = dispatched_token(d.on_timer_fired(timer));
        d.on_search_completed(token, Ok(vec![user("ann")]));
        assert_eq!(d.results()[0].insertion_text, "@ann");
    }
}
