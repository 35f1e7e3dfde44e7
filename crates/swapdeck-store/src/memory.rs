//! Ephemeral in-memory [`Repository`].
//!
//! Used by tests and keyless demos. Mirrors the upsert-at-front semantics of
//! the SQLite store so the engines observe identical ordering either way.
//! The write-failure switch lets tests exercise the fault path the engines
//! must surface when the backing store is unreachable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use swapdeck_shared::{ChatId, Item, ItemId, Message, Offer};

use crate::error::{Result, StoreError};
use crate::repository::Repository;

#[derive(Default)]
struct State {
    items: Vec<Item>,
    active_item: Option<ItemId>,
    offers: Vec<Offer>,
    chats: HashMap<ChatId, Vec<Message>>,
}

/// In-memory store with SQLite-equivalent semantics.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every mutation fails with [`StoreError::Unavailable`].
    /// Reads keep working, matching a store that lost its write path.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_inventory(&self) -> Result<Vec<Item>> {
        Ok(self.state.lock().await.items.clone())
    }

    async fn save_item(&self, item: &Item) -> Result<()> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        match state.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => state.items.insert(0, item.clone()),
        }
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> Result<()> {
        self.check_writable()?;
        self.state.lock().await.items.retain(|i| i.id != id);
        Ok(())
    }

    async fn get_active_item_id(&self) -> Result<Option<ItemId>> {
        Ok(self.state.lock().await.active_item)
    }

    async fn set_active_item_id(&self, id: Option<ItemId>) -> Result<()> {
        self.check_writable()?;
        self.state.lock().await.active_item = id;
        Ok(())
    }

    async fn get_offers(&self) -> Result<Vec<Offer>> {
        Ok(self.state.lock().await.offers.clone())
    }

    async fn save_offer(&self, offer: &Offer) -> Result<()> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        match state.offers.iter_mut().find(|o| o.id == offer.id) {
            Some(existing) => *existing = offer.clone(),
            None => state.offers.insert(0, offer.clone()),
        }
        Ok(())
    }

    async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        Ok(self
            .state
            .lock()
            .await
            .chats
            .get(&chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        self.check_writable()?;
        self.state
            .lock()
            .await
            .chats
            .entry(chat_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.check_writable()?;
        *self.state.lock().await = State::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapdeck_shared::catalog;

    #[tokio::test]
    async fn test_upsert_at_front_matches_sqlite_ordering() {
        let repo = MemoryRepository::new();
        let seed = catalog::seed_inventory();
        for item in &seed {
            repo.save_item(item).await.unwrap();
        }

        let listed = repo.get_inventory().await.unwrap();
        assert_eq!(listed[0].id, seed[1].id);
        assert_eq!(listed[1].id, seed[0].id);

        // In-place update keeps position.
        let mut updated = seed[0].clone();
        updated.title = "Renamed".to_string();
        repo.save_item(&updated).await.unwrap();
        let listed = repo.get_inventory().await.unwrap();
        assert_eq!(listed[1].title, "Renamed");
    }

    #[tokio::test]
    async fn test_fail_writes_switch() {
        let repo = MemoryRepository::new();
        let item = catalog::seed_inventory().remove(0);
        repo.save_item(&item).await.unwrap();

        repo.set_fail_writes(true);
        assert!(matches!(
            repo.save_item(&item).await,
            Err(StoreError::Unavailable)
        ));
        // Reads still serve the last committed state.
        assert_eq!(repo.get_inventory().await.unwrap().len(), 1);

        repo.set_fail_writes(false);
        assert!(repo.save_item(&item).await.is_ok());
    }
}
