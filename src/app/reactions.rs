//! Optimistic emoji reactions with rollback.
//!
//! A [`ReactionBoard`] holds the displayed tallies and the current user's
//! displayed membership for every post a screen shows. Toggling a reaction is
//! split into two explicit halves:
//!
//! 1. [`ReactionBoard::begin_toggle`] decides the direction from displayed
//!    membership, checks the local store, applies the optimistic change and
//!    returns a [`PendingToggle`] token. The pair is now `Toggling`.
//! 2. [`ReactionBoard::complete`] consumes the token with the remote outcome.
//!    Success commits the change to the [`ReactionStore`]; failure restores the
//!    exact pre-toggle count and membership and leaves the store untouched.
//!
//! ```text
//! Idle ──begin──▶ Toggling ──ok──▶ Committed ──begin──▶ Toggling ...
//!                    │
//!                    └──err──▶ RolledBack ──begin──▶ Toggling ...
//! ```
//!
//! A second toggle on a pair that is still `Toggling` is rejected, so one
//! tap can never be counted twice. There is no automatic retry.
//!
//! [`toggle_reaction`] drives both halves around the network call for a
//! controller whose snapshot implements [`HasReactions`].

use super::state::StateCell;
use crate::domain::error::Result;
use crate::domain::{PostId, ReactionAction, ReactionCounts};
use crate::repository::PostRepository;
use crate::storage::ReactionStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Transition state of one (post, symbol) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactionPhase {
    /// No toggle has happened since the post was loaded.
    #[default]
    Idle,
    /// Optimistic change applied, remote call outstanding.
    Toggling,
    /// Remote call succeeded and the local store was updated.
    Committed,
    /// Remote call failed and the displayed state was restored.
    RolledBack,
}

/// Why a toggle was refused. Nothing changes when a toggle is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToggleRejected {
    /// A toggle on the same pair is still waiting for the server.
    #[error("reaction update already in progress")]
    InFlight,

    /// An add was requested but the store already records the reaction.
    #[error("reaction already recorded")]
    AlreadyReacted,

    /// A remove was requested but the store has no such reaction.
    #[error("reaction not recorded")]
    NotReacted,
}

/// Displayed reaction state of a single post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostReactions {
    /// Displayed tallies. Entries never hold zero.
    pub counts: ReactionCounts,
    /// Symbols the current user has applied, as displayed.
    pub mine: BTreeSet<String>,
    /// Symbols with a toggle in flight. Presentation should disable them.
    pub pending: BTreeSet<String>,
}

impl PostReactions {
    #[must_use]
    pub fn count(&self, symbol: &str) -> u32 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_reacted(&self, symbol: &str) -> bool {
        self.mine.contains(symbol)
    }

    #[must_use]
    pub fn is_pending(&self, symbol: &str) -> bool {
        self.pending.contains(symbol)
    }

    fn apply(&mut self, symbol: &str, action: ReactionAction) {
        match action {
            ReactionAction::Add => {
                *self.counts.entry(symbol.to_string()).or_insert(0) += 1;
                self.mine.insert(symbol.to_string());
            }
            ReactionAction::Remove => {
                let next = self.count(symbol).saturating_sub(1);
                self.set_count(symbol, Some(next));
                self.mine.remove(symbol);
            }
        }
    }

    fn set_count(&mut self, symbol: &str, count: Option<u32>) {
        match count {
            Some(count) if count > 0 => {
                self.counts.insert(symbol.to_string(), count);
            }
            _ => {
                self.counts.remove(symbol);
            }
        }
    }

    fn set_member(&mut self, symbol: &str, member: bool) {
        if member {
            self.mine.insert(symbol.to_string());
        } else {
            self.mine.remove(symbol);
        }
    }
}

/// Token for an accepted toggle whose remote outcome is not known yet.
///
/// Carries the values needed to undo the optimistic change. It is consumed
/// by [`ReactionBoard::complete`], so a toggle completes at most once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending toggle must be completed with the remote outcome"]
pub struct PendingToggle {
    post_id: PostId,
    symbol: String,
    action: ReactionAction,
    prior_count: Option<u32>,
    prior_member: bool,
}

impl PendingToggle {
    #[must_use]
    pub const fn post_id(&self) -> PostId {
        self.post_id
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Signed action to send to the server.
    #[must_use]
    pub const fn action(&self) -> ReactionAction {
        self.action
    }
}

/// Displayed reactions of the posts on one screen.
pub struct ReactionBoard {
    store: Arc<dyn ReactionStore>,
    posts: BTreeMap<PostId, PostReactions>,
    outcomes: HashMap<(PostId, String), ReactionPhase>,
}

impl ReactionBoard {
    #[must_use]
    pub fn new(store: Arc<dyn ReactionStore>) -> Self {
        Self {
            store,
            posts: BTreeMap::new(),
            outcomes: HashMap::new(),
        }
    }

    /// Loads a post's server tallies and seeds membership from the store.
    ///
    /// Membership only covers symbols present in `counts`. Symbols with a
    /// toggle in flight keep their optimistic values until completed.
    pub fn sync_post(&mut self, post_id: PostId, counts: &ReactionCounts) {
        let stored = self.store.get_user_reactions(post_id);
        let mut view = PostReactions {
            counts: counts.iter().filter(|(_, n)| **n > 0).map(|(s, &n)| (s.clone(), n)).collect(),
            mine: stored.into_iter().filter(|s| counts.contains_key(s)).collect(),
            pending: BTreeSet::new(),
        };

        if let Some(previous) = self.posts.remove(&post_id) {
            for symbol in previous.pending {
                view.set_count(&symbol, previous.counts.get(&symbol).copied());
                view.set_member(&symbol, previous.mine.contains(&symbol));
                view.pending.insert(symbol);
            }
        }

        tracing::trace!(post_id, symbols = view.counts.len(), mine = view.mine.len(), "post reactions synced");
        self.posts.insert(post_id, view);
    }

    /// Replaces the whole board with a freshly loaded list of posts.
    ///
    /// Posts that disappeared are dropped unless they have a toggle in flight.
    pub fn sync_posts<'a, I>(&mut self, posts: I)
    where
        I: IntoIterator<Item = (PostId, &'a ReactionCounts)>,
    {
        let mut seen = BTreeSet::new();
        for (post_id, counts) in posts {
            self.sync_post(post_id, counts);
            seen.insert(post_id);
        }
        self.posts.retain(|id, view| seen.contains(id) || !view.pending.is_empty());
        self.outcomes.retain(|(id, _), _| seen.contains(id));
    }

    /// Displayed state of one post, if it is on the board.
    #[must_use]
    pub fn post(&self, post_id: PostId) -> Option<&PostReactions> {
        self.posts.get(&post_id)
    }

    /// Displayed state of every post on the board.
    #[must_use]
    pub const fn posts(&self) -> &BTreeMap<PostId, PostReactions> {
        &self.posts
    }

    #[must_use]
    pub fn count(&self, post_id: PostId, symbol: &str) -> u32 {
        self.post(post_id).map_or(0, |view| view.count(symbol))
    }

    #[must_use]
    pub fn has_reacted(&self, post_id: PostId, symbol: &str) -> bool {
        self.post(post_id).is_some_and(|view| view.has_reacted(symbol))
    }

    #[must_use]
    pub fn is_pending(&self, post_id: PostId, symbol: &str) -> bool {
        self.post(post_id).is_some_and(|view| view.is_pending(symbol))
    }

    /// Current transition state of a pair.
    ///
    /// `Committed` and `RolledBack` are reported until the next toggle on the
    /// pair or until the post drops off the board.
    #[must_use]
    pub fn phase(&self, post_id: PostId, symbol: &str) -> ReactionPhase {
        if self.is_pending(post_id, symbol) {
            return ReactionPhase::Toggling;
        }
        self.outcomes
            .get(&(post_id, symbol.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Starts a toggle whose direction follows displayed membership.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleRejected`] when the pair is in flight or the store
    /// disagrees with the requested direction.
    pub fn begin_toggle(&mut self, post_id: PostId, symbol: &str) -> std::result::Result<PendingToggle, ToggleRejected> {
        let action = if self.has_reacted(post_id, symbol) {
            ReactionAction::Remove
        } else {
            ReactionAction::Add
        };
        self.begin(post_id, symbol, action)
    }

    /// Starts a toggle in an explicit direction.
    ///
    /// On success the optimistic change is already visible through
    /// [`Self::post`].
    ///
    /// # Errors
    ///
    /// - [`ToggleRejected::InFlight`] if the pair is already `Toggling`
    /// - [`ToggleRejected::AlreadyReacted`] for an add the store already has
    /// - [`ToggleRejected::NotReacted`] for a remove the store does not have
    pub fn begin(
        &mut self,
        post_id: PostId,
        symbol: &str,
        action: ReactionAction,
    ) -> std::result::Result<PendingToggle, ToggleRejected> {
        if self.is_pending(post_id, symbol) {
            tracing::warn!(post_id, symbol, "reaction toggle rejected, already in flight");
            return Err(ToggleRejected::InFlight);
        }

        let stored = self.store.has_user_reacted(post_id, symbol);
        match action {
            ReactionAction::Add if stored => {
                tracing::warn!(post_id, symbol, "reaction add rejected, already recorded");
                return Err(ToggleRejected::AlreadyReacted);
            }
            ReactionAction::Remove if !stored => {
                tracing::warn!(post_id, symbol, "reaction remove rejected, not recorded");
                return Err(ToggleRejected::NotReacted);
            }
            _ => {}
        }

        let view = self.posts.entry(post_id).or_default();
        let pending = PendingToggle {
            post_id,
            symbol: symbol.to_string(),
            action,
            prior_count: view.counts.get(symbol).copied(),
            prior_member: view.mine.contains(symbol),
        };

        view.apply(symbol, action);
        view.pending.insert(symbol.to_string());
        self.outcomes.remove(&(post_id, symbol.to_string()));

        tracing::debug!(post_id, symbol, ?action, count = view.count(symbol), "reaction toggling");
        Ok(pending)
    }

    /// Finishes a toggle with the remote outcome and returns the terminal phase.
    pub fn complete(&mut self, pending: PendingToggle, outcome: &Result<()>) -> ReactionPhase {
        let PendingToggle {
            post_id,
            symbol,
            action,
            prior_count,
            prior_member,
        } = pending;

        let view = self.posts.entry(post_id).or_default();
        view.pending.remove(&symbol);

        let phase = match outcome {
            Ok(()) => {
                let stored = match action {
                    ReactionAction::Add => self.store.add_user_reaction(post_id, &symbol),
                    ReactionAction::Remove => self.store.remove_user_reaction(post_id, &symbol),
                };
                if let Err(e) = stored {
                    tracing::warn!(post_id, symbol = %symbol, error = %e, "failed to record reaction locally");
                }
                tracing::debug!(post_id, symbol = %symbol, ?action, "reaction committed");
                ReactionPhase::Committed
            }
            Err(e) => {
                view.set_count(&symbol, prior_count);
                view.set_member(&symbol, prior_member);
                tracing::warn!(post_id, symbol = %symbol, ?action, error = %e, "reaction failed, reverting local state");
                ReactionPhase::RolledBack
            }
        };

        self.outcomes.insert((post_id, symbol), phase);
        phase
    }

    /// Abandons a toggle whose request will never report back.
    ///
    /// Restores the values captured by [`begin_toggle`](Self::begin_toggle)
    /// and leaves the store untouched.
    pub fn cancel(&mut self, pending: PendingToggle) -> ReactionPhase {
        let PendingToggle {
            post_id,
            symbol,
            action,
            prior_count,
            prior_member,
        } = pending;

        let view = self.posts.entry(post_id).or_default();
        view.pending.remove(&symbol);
        view.set_count(&symbol, prior_count);
        view.set_member(&symbol, prior_member);
        tracing::debug!(post_id, symbol = %symbol, ?action, "reaction cancelled, reverting local state");

        let phase = ReactionPhase::RolledBack;
        self.outcomes.insert((post_id, symbol), phase);
        phase
    }
}

/// Owns an in-flight toggle until its outcome arrives.
///
/// Dropping it early rolls the pair back and republishes the post.
struct InFlightToggle<'a, S>
where
    S: HasReactions + Clone,
{
    board: &'a mut ReactionBoard,
    cell: &'a StateCell<S>,
    pending: Option<PendingToggle>,
}

impl<S> InFlightToggle<'_, S>
where
    S: HasReactions + Clone,
{
    fn finish(mut self, outcome: &Result<()>) -> ReactionPhase {
        let Some(pending) = self.pending.take() else {
            return ReactionPhase::Idle;
        };
        let post_id = pending.post_id();
        let phase = self.board.complete(pending, outcome);

        let board = &*self.board;
        self.cell.update(|state| {
            publish_post(state, board, post_id);
            if let Err(e) = outcome {
                *state.reaction_error_mut() = Some(format!("Failed to update reaction: {e}"));
            }
        });
        phase
    }
}

impl<S> Drop for InFlightToggle<'_, S>
where
    S: HasReactions + Clone,
{
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            let post_id = pending.post_id();
            self.board.cancel(pending);
            let board = &*self.board;
            self.cell.update(|state| publish_post(state, board, post_id));
        }
    }
}

impl std::fmt::Debug for ReactionBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionBoard")
            .field("posts", &self.posts)
            .field("outcomes", &self.outcomes)
            .finish_non_exhaustive()
    }
}

/// Snapshot types that render reactions.
pub trait HasReactions {
    /// Displayed reactions keyed by post.
    fn reactions_mut(&mut self) -> &mut BTreeMap<PostId, PostReactions>;

    /// Message shown after a failed reaction update.
    fn reaction_error_mut(&mut self) -> &mut Option<String>;
}

/// Copies the board's view of `post_id` into a snapshot.
pub(crate) fn publish_post<S: HasReactions>(state: &mut S, board: &ReactionBoard, post_id: PostId) {
    let reactions = state.reactions_mut();
    match board.post(post_id) {
        Some(view) => {
            reactions.insert(post_id, view.clone());
        }
        None => {
            reactions.remove(&post_id);
        }
    }
}

/// Toggles a reaction end to end for a controller.
///
/// Publishes the optimistic state before the request is sent and the
/// reconciled state after it returns. A failure sets the snapshot's reaction
/// error; rejected toggles leave the snapshot untouched. Dropping the future
/// before the request returns rolls the pair back.
///
/// # Errors
///
/// Returns [`ToggleRejected`] if the toggle was refused before any request.
pub(crate) async fn toggle_reaction<S>(
    board: &mut ReactionBoard,
    cell: &StateCell<S>,
    posts: &PostRepository,
    post_id: PostId,
    symbol: &str,
) -> std::result::Result<ReactionPhase, ToggleRejected>
where
    S: HasReactions + Clone,
{
    let pending = board.begin_toggle(post_id, symbol)?;
    let action = pending.action();

    cell.update(|state| {
        *state.reaction_error_mut() = None;
        publish_post(state, board, post_id);
    });

    let in_flight = InFlightToggle {
        board,
        cell,
        pending: Some(pending),
    };
    let outcome = posts.react_to_post(post_id, symbol, action).await;
    Ok(in_flight.finish(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FesnukError;
    use crate::storage::MemoryReactionStore;

    const THUMBS_UP: &str = "U+1F44D";
    const FIRE: &str = "U+1F525";

    fn board_with(store: MemoryReactionStore) -> (ReactionBoard, Arc<MemoryReactionStore>) {
        let store = Arc::new(store);
        (ReactionBoard::new(store.clone()), store)
    }

    fn counts(entries: &[(&str, u32)]) -> ReactionCounts {
        entries.iter().map(|(s, n)| ((*s).to_string(), *n)).collect()
    }

    #[test]
    fn add_is_visible_before_the_outcome() {
        let (mut board, store) = board_with(MemoryReactionStore::new());
        board.sync_post(1, &counts(&[(THUMBS_UP, 3)]));

        let pending = board.begin_toggle(1, THUMBS_UP).unwrap();
        assert_eq!(pending.action(), ReactionAction::Add);
        assert_eq!(board.count(1, THUMBS_UP), 4);
        assert!(board.has_reacted(1, THUMBS_UP));
        assert_eq!(board.phase(1, THUMBS_UP), ReactionPhase::Toggling);
        assert!(!store.has_user_reacted(1, THUMBS_UP));

        assert_eq!(board.complete(pending, &Ok(())), ReactionPhase::Committed);
        assert!(store.has_user_reacted(1, THUMBS_UP));
        assert_eq!(board.count(1, THUMBS_UP), 4);
    }

    #[test]
    fn failed_add_restores_absent_entry() {
        let (mut board, store) = board_with(MemoryReactionStore::new());
        board.sync_post(2, &ReactionCounts::new());

        let pending = board.begin_toggle(2, FIRE).unwrap();
        assert_eq!(board.count(2, FIRE), 1);

        let phase = board.complete(pending, &Err(FesnukError::Status { code: 500 }));
        assert_eq!(phase, ReactionPhase::RolledBack);
        assert!(board.post(2).unwrap().counts.is_empty());
        assert!(!board.has_reacted(2, FIRE));
        assert!(store.get_user_reactions(2).is_empty());
    }

    #[test]
    fn remove_is_floored_and_drops_the_entry() {
        let store = MemoryReactionStore::with_reactions([(3, THUMBS_UP)]);
        let (mut board, store) = board_with(store);
        board.sync_post(3, &counts(&[(THUMBS_UP, 1)]));
        assert!(board.has_reacted(3, THUMBS_UP));

        let pending = board.begin_toggle(3, THUMBS_UP).unwrap();
        assert_eq!(pending.action(), ReactionAction::Remove);
        assert!(!board.post(3).unwrap().counts.contains_key(THUMBS_UP));

        board.complete(pending, &Ok(()));
        assert!(!store.has_user_reacted(3, THUMBS_UP));
    }

    #[test]
    fn second_toggle_while_in_flight_is_rejected() {
        let (mut board, _store) = board_with(MemoryReactionStore::new());
        board.sync_post(4, &counts(&[(THUMBS_UP, 1)]));

        let first = board.begin_toggle(4, THUMBS_UP).unwrap();
        assert_eq!(board.begin_toggle(4, THUMBS_UP), Err(ToggleRejected::InFlight));
        assert_eq!(board.count(4, THUMBS_UP), 2);

        // Other symbols on the same post are independent.
        let other = board.begin_toggle(4, FIRE).unwrap();
        board.complete(other, &Ok(()));
        board.complete(first, &Ok(()));
        assert_eq!(board.count(4, THUMBS_UP), 2);
    }

    #[test]
    fn store_guard_rejects_disagreeing_direction() {
        let store = MemoryReactionStore::with_reactions([(5, FIRE)]);
        let (mut board, _store) = board_with(store);
        // The reloaded tally no longer lists the symbol, so it is not displayed as mine.
        board.sync_post(5, &ReactionCounts::new());
        assert_eq!(board.begin_toggle(5, FIRE), Err(ToggleRejected::AlreadyReacted));
        assert_eq!(board.begin(5, THUMBS_UP, ReactionAction::Remove), Err(ToggleRejected::NotReacted));
        assert_eq!(board.phase(5, FIRE), ReactionPhase::Idle);
    }

    #[test]
    fn resync_keeps_optimistic_values_for_pending_symbols() {
        let (mut board, _store) = board_with(MemoryReactionStore::new());
        board.sync_post(6, &counts(&[(THUMBS_UP, 3)]));
        let pending = board.begin_toggle(6, THUMBS_UP).unwrap();

        board.sync_posts([(6, &counts(&[(THUMBS_UP, 3), (FIRE, 2)]))]);
        assert_eq!(board.count(6, THUMBS_UP), 4);
        assert_eq!(board.count(6, FIRE), 2);
        assert!(board.is_pending(6, THUMBS_UP));

        board.complete(pending, &Err(FesnukError::EmptyBody));
        assert_eq!(board.count(6, THUMBS_UP), 3);
    }

    #[test]
    fn cancelled_toggle_restores_prior_values_and_frees_the_pair() {
        let (mut board, store) = board_with(MemoryReactionStore::new());
        board.sync_post(7, &counts(&[(THUMBS_UP, 3)]));

        let pending = board.begin_toggle(7, THUMBS_UP).unwrap();
        assert_eq!(board.count(7, THUMBS_UP), 4);

        assert_eq!(board.cancel(pending), ReactionPhase::RolledBack);
        assert_eq!(board.count(7, THUMBS_UP), 3);
        assert!(!board.has_reacted(7, THUMBS_UP));
        assert!(!board.is_pending(7, THUMBS_UP));
        assert!(!store.has_user_reacted(7, THUMBS_UP));

        board.sync_posts([(7, &counts(&[(THUMBS_UP, 3)]))]);
        assert_eq!(board.count(7, THUMBS_UP), 3);
        assert!(board.begin_toggle(7, THUMBS_UP).is_ok());
    }
}
