//! The swipe deck.
//!
//! An ordered queue of candidate items for the current category. The front of
//! the queue is the single card eligible for a commit; committed cards move
//! to the front of the history stack so the last one can be restored by undo.
//! `commit` and `undo` are the only mutators of the two sequences.

use std::collections::VecDeque;
use std::sync::Arc;

use swapdeck_shared::{Category, Item};
use swapdeck_content::ContentProvider;

/// Number of candidates requested per deck load.
pub const DECK_SIZE: usize = 5;

/// Swipe direction committed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Emitted on a right-swipe: the user wants this item. Whether it becomes an
/// offer is the offer engine's decision, not the deck's.
#[derive(Debug, Clone)]
pub struct MatchIntent {
    pub item: Item,
}

/// Outcome of a [`SwipeDeck::commit`].
#[derive(Debug, Clone)]
pub enum Commit {
    /// The deck was empty; nothing was removed.
    Empty,
    /// The front card was dismissed without a match intent.
    Removed(Item),
    /// The front card was removed and emitted a match intent.
    Intent(MatchIntent),
}

/// Gesture-driven candidate queue with undo.
pub struct SwipeDeck {
    provider: Arc<dyn ContentProvider>,
    queue: VecDeque<Item>,
    history: VecDeque<Item>,
    category: Category,
}

impl SwipeDeck {
    pub fn new(provider: Arc<dyn ContentProvider>, category: Category) -> Self {
        Self {
            provider,
            queue: VecDeque::new(),
            history: VecDeque::new(),
            category,
        }
    }

    /// Request a fresh deck for the current category, replacing the queue.
    ///
    /// The provider fails closed, so a misbehaving remote source shows up
    /// here as a short or empty deck at worst.
    pub async fn load(&mut self, count: usize) {
        let items = self.provider.generate_items(self.category, count).await;
        tracing::info!(category = %self.category, count = items.len(), "deck loaded");
        self.queue = items.into();
    }

    /// Reload the current category. History is preserved.
    pub async fn refresh(&mut self) {
        self.load(DECK_SIZE).await;
    }

    /// Switch category: clears queue and history, then loads fresh cards.
    pub async fn set_category(&mut self, category: Category) {
        if self.category == category {
            return;
        }
        tracing::info!(from = %self.category, to = %category, "deck category changed");
        self.category = category;
        self.queue.clear();
        self.history.clear();
        self.load(DECK_SIZE).await;
    }

    /// Remove the front card in the given direction.
    pub fn commit(&mut self, direction: Direction) -> Commit {
        let Some(item) = self.queue.pop_front() else {
            return Commit::Empty;
        };
        self.history.push_front(item.clone());
        tracing::debug!(item = %item.id, ?direction, "card committed");

        match direction {
            Direction::Right => Commit::Intent(MatchIntent { item }),
            Direction::Left => Commit::Removed(item),
        }
    }

    /// Restore the most recently committed card to the front of the queue.
    ///
    /// A no-op on empty history. Undo only restores the card for re-display;
    /// it never retracts an offer a prior right-swipe may have created.
    pub fn undo(&mut self) -> Option<&Item> {
        let item = self.history.pop_front()?;
        tracing::debug!(item = %item.id, "card restored");
        self.queue.push_front(item);
        self.queue.front()
    }

    /// Drop all cards and history (used on reset).
    pub fn clear(&mut self) {
        self.queue.clear();
        self.history.clear();
    }

    /// The card currently eligible for a commit.
    pub fn peek(&self) -> Option<&Item> {
        self.queue.front()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn category(&self) -> Category {
        self.category
    }
}
