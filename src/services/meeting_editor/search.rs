//! Debounced participant search with generation-tagged responses.
//!
//! A keystroke replaces any search that has not started yet. Every issued
//! search gets the next generation number and only a response carrying the
//! latest generation is applied, so a slow early response can never
//! overwrite a newer one.

use std::time::{Duration, Instant};

use crate::models::directory::UserSummary;
use crate::services::api::ApiError;

/// A search that is due to be sent to the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

/// What happened to a search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchApplied {
    Applied,
    /// A newer search was issued after this one
    Stale,
    Failed(ApiError),
}

#[derive(Debug)]
pub struct ParticipantSearch {
    debounce: Duration,
    acting_user_id: String,
    pending: Option<(String, Instant)>,
    issued: u64,
    results: Vec<UserSummary>,
}

impl ParticipantSearch {
    pub fn new(debounce: Duration, acting_user_id: impl Into<String>) -> Self {
        Self {
            debounce,
            acting_user_id: acting_user_id.into(),
            pending: None,
            issued: 0,
            results: Vec::new(),
        }
    }

    pub fn results(&self) -> &[UserSummary] {
        &self.results
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Show users immediately without a search (the meeting's participants)
    pub fn seed(&mut self, users: impl IntoIterator<Item = UserSummary>) {
        self.results = self.without_acting_user(users);
    }

    /// Record a keystroke. An empty query clears results and invalidates
    /// anything in flight.
    pub fn query_changed(&mut self, query: &str, now: Instant) {
        let query = query.trim();
        if query.is_empty() {
            self.pending = None;
            self.issued += 1;
            self.results.clear();
            return;
        }
        self.pending = Some((query.to_string(), now + self.debounce));
    }

    /// Issue the pending search once its debounce window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<SearchTicket> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if !due {
            return None;
        }

        let (query, _) = self.pending.take()?;
        self.issued += 1;
        Some(SearchTicket {
            generation: self.issued,
            query,
        })
    }

    /// Apply a response if it belongs to the latest issued search
    pub fn apply(
        &mut self,
        generation: u64,
        result: Result<Vec<UserSummary>, ApiError>,
    ) -> SearchApplied {
        if generation != self.issued {
            log::debug!(
                "Discarding stale participant search response (generation {} < {})",
                generation,
                self.issued
            );
            return SearchApplied::Stale;
        }

        match result {
            Ok(users) => {
                self.results = self.without_acting_user(users);
                SearchApplied::Applied
            }
            Err(err) => {
                self.results.clear();
                SearchApplied::Failed(err)
            }
        }
    }

    /// Drop pending work and results
    pub fn reset(&mut self) {
        self.pending = None;
        self.issued += 1;
        self.results.clear();
    }

    fn without_acting_user(&self, users: impl IntoIterator<Item = UserSummary>) -> Vec<UserSummary> {
        users
            .into_iter()
            .filter(|user| user.id != self.acting_user_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            full_name: format!("User {}", id),
            username: id.to_lowercase(),
        }
    }

    fn search() -> ParticipantSearch {
        ParticipantSearch::new(Duration::from_millis(500), "ME")
    }

    #[test]
    fn nothing_is_issued_inside_the_debounce_window() {
        let mut search = search();
        let t0 = Instant::now();
        search.query_changed("an", t0);

        assert!(search.poll(t0 + Duration::from_millis(499)).is_none());
        let ticket = search.poll(t0 + Duration::from_millis(500)).unwrap();
        assert_eq!(ticket.query, "an");
        assert_eq!(ticket.generation, 1);
        assert!(!search.is_pending());
    }

    #[test]
    fn new_keystroke_replaces_unstarted_search() {
        let mut search = search();
        let t0 = Instant::now();
        search.query_changed("a", t0);
        search.query_changed("an", t0 + Duration::from_millis(300));

        assert!(search.poll(t0 + Duration::from_millis(600)).is_none());
        let ticket = search.poll(t0 + Duration::from_millis(800)).unwrap();
        assert_eq!(ticket.query, "an");
        assert_eq!(ticket.generation, 1);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut search = search();
        let t0 = Instant::now();
        search.query_changed("a", t0);
        let first = search.poll(t0 + Duration::from_secs(1)).unwrap();
        search.query_changed("an", t0 + Duration::from_secs(1));
        let second = search.poll(t0 + Duration::from_secs(2)).unwrap();

        assert_eq!(search.apply(second.generation, Ok(vec![user("U2")])), SearchApplied::Applied);
        assert_eq!(
            search.apply(first.generation, Ok(vec![user("U3"), user("U4")])),
            SearchApplied::Stale
        );
        assert_eq!(search.results(), &[user("U2")]);
    }

    #[test]
    fn acting_user_is_excluded() {
        let mut search = search();
        search.seed(vec![user("ME"), user("U1")]);
        assert_eq!(search.results(), &[user("U1")]);
    }

    #[test]
    fn failure_clears_results() {
        let mut search = search();
        search.seed(vec![user("U1")]);
        let t0 = Instant::now();
        search.query_changed("x", t0);
        let ticket = search.poll(t0 + Duration::from_secs(1)).unwrap();

        let outcome = search.apply(ticket.generation, Err(ApiError::Transport("down".into())));
        assert!(matches!(outcome, SearchApplied::Failed(_)));
        assert!(search.results().is_empty());
    }

    #[test]
    fn empty_query_invalidates_in_flight_search() {
        let mut search = search();
        let t0 = Instant::now();
        search.query_changed("an", t0);
        let ticket = search.poll(t0 + Duration::from_secs(1)).unwrap();
        search.query_changed("   ", t0 + Duration::from_secs(1));

        assert_eq!(search.apply(ticket.generation, Ok(vec![user("U2")])), SearchApplied::Stale);
        assert!(search.results().is_empty());
    }
}
