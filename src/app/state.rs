//! Observable UI state snapshots.
//!
//! Every screen controller keeps its view state in a [`StateCell`]. The cell
//! publishes immutable snapshots: a transition clones the current state,
//! mutates the clone, then swaps it in as a whole. Readers holding a
//! [`watch::Receiver`] never observe a half-applied transition.
//!
//! # Example
//!
//! ```rust
//! use fesnuk::app::StateCell;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Counter {
//!     value: u32,
//!     is_loading: bool,
//! }
//!
//! let cell = StateCell::new(Counter::default());
//! let receiver = cell.subscribe();
//!
//! cell.update(|state| {
//!     state.value += 1;
//!     state.is_loading = true;
//! });
//!
//! assert_eq!(receiver.borrow().value, 1);
//! assert!(cell.state().is_loading);
//! ```

use tokio::sync::watch;

/// Holder of a screen's current snapshot.
///
/// Writes go through `&self`, but controllers only ever call them from
/// `&mut self` methods, so each cell has a single writer.
#[derive(Debug)]
pub struct StateCell<S> {
    sender: watch::Sender<S>,
}

impl<S: Clone> StateCell<S> {
    #[must_use]
    pub fn new(initial: S) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender }
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn state(&self) -> S {
        self.sender.borrow().clone()
    }

    /// Returns a receiver that is notified on every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    /// Applies `change` to a copy of the current snapshot and publishes it.
    pub fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut S),
    {
        let mut next = self.state();
        change(&mut next);
        self.sender.send_replace(next);
    }

    /// Publishes `next` as the new snapshot, discarding the old one.
    pub fn replace(&self, next: S) {
        self.sender.send_replace(next);
    }
}

impl<S: Clone + Default> Default for StateCell<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
