//! Nook list controller with fuzzy filtering.

use super::state::StateCell;
use crate::domain::Nook;
use crate::repository::NookRepository;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tokio::sync::watch;
use tracing::Instrument;

/// Snapshot of the nook list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NooksUiState {
    /// Every nook, in server order.
    pub nooks: Vec<Nook>,
    /// Nooks matching `query`. Equal to `nooks` when the query is blank.
    pub filtered: Vec<Nook>,
    pub query: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

/// Loads nooks and filters them by name.
#[derive(Debug)]
pub struct NooksController {
    nooks: NookRepository,
    state: StateCell<NooksUiState>,
}

impl NooksController {
    #[must_use]
    pub fn new(nooks: NookRepository) -> Self {
        Self {
            nooks,
            state: StateCell::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> NooksUiState {
        self.state.state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NooksUiState> {
        self.state.subscribe()
    }

    pub async fn load_nooks(&mut self) {
        self.state.update(|s| {
            s.is_loading = true;
            s.error_message = None;
        });

        let span = tracing::debug_span!("load_nooks");
        match self.nooks.get_all_nooks().instrument(span).await {
            Ok(nooks) => self.state.update(|s| {
                s.filtered = filter_nooks(&nooks, &s.query);
                s.nooks = nooks;
                s.is_loading = false;
            }),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load nooks");
                self.state.update(|s| {
                    s.is_loading = false;
                    s.error_message = Some(e.to_string());
                });
            }
        }
    }

    pub async fn retry(&mut self) {
        self.load_nooks().await;
    }

    /// Updates the search query and recomputes the filtered list.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.state.update(|s| {
            s.filtered = filter_nooks(&s.nooks, &query);
            s.query = query;
        });
    }
}

/// Keeps nooks whose name fuzzy-matches every whitespace-separated token.
///
/// Matching is case-insensitive and preserves the input order.
#[must_use]
pub fn filter_nooks(nooks: &[Nook], query: &str) -> Vec<Nook> {
    let _span = tracing::debug_span!("filter_nooks", total = nooks.len(), query_len = query.len()).entered();

    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return nooks.to_vec();
    }

    let matcher = SkimMatcherV2::default();
    let filtered: Vec<Nook> = nooks
        .iter()
        .filter(|nook| {
            let name_lower = nook.name.to_lowercase();
            tokens.iter().all(|token| matcher.fuzzy_match(&name_lower, token).is_some())
        })
        .cloned()
        .collect();

    tracing::debug!(filtered_count = filtered.len(), "nook filter applied");
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nooks() -> Vec<Nook> {
        vec![
            Nook::new("1", "Rust Lang"),
            Nook::new("2", "Cooking"),
            Nook::new("3", "Rusty Bikes"),
        ]
    }

    #[test]
    fn blank_query_keeps_everything() {
        assert_eq!(filter_nooks(&nooks(), "   ").len(), 3);
    }

    #[test]
    fn every_token_must_match() {
        let names: Vec<_> = filter_nooks(&nooks(), "rust bik")
            .into_iter()
            .map(|n| n.name)
            .collect();
        assert_eq!(names, vec!["Rusty Bikes"]);
    }

    #[test]
    fn matching_ignores_case_and_keeps_order() {
        let ids: Vec<_> = filter_nooks(&nooks(), "RUST").into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
