//! The injected persistence capability.
//!
//! Engines never touch a database directly: they hold an `Arc<dyn
//! Repository>` handed to them at construction, which keeps every engine
//! testable against a double. Faults from this trait are the only error
//! condition the engines propagate; business outcomes never travel this way.

use async_trait::async_trait;
use tokio::sync::Mutex;

use swapdeck_shared::{ChatId, Item, ItemId, Message, Offer};

use crate::database::Database;
use crate::error::Result;

/// Async persistence contract over the four collections and the active-item
/// pointer.
///
/// Mutations are upserts keyed by id (`save_item`, `save_offer`) or appends
/// (`save_message`); `delete_item` on a missing id is a no-op. The
/// active-item accessors have synchronous semantics: implementations answer
/// from an in-process pointer and must not perform awaitable I/O beyond the
/// write itself.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Load the full inventory, most recently added first.
    async fn get_inventory(&self) -> Result<Vec<Item>>;

    /// Upsert an item by id. New items land at the front of the inventory.
    async fn save_item(&self, item: &Item) -> Result<()>;

    /// Delete an item. Missing ids are a no-op.
    async fn delete_item(&self, id: ItemId) -> Result<()>;

    /// Read the active-item pointer.
    async fn get_active_item_id(&self) -> Result<Option<ItemId>>;

    /// Persist (or clear) the active-item pointer.
    async fn set_active_item_id(&self, id: Option<ItemId>) -> Result<()>;

    /// Load all offers, most recently created first.
    async fn get_offers(&self) -> Result<Vec<Offer>>;

    /// Upsert an offer by id.
    async fn save_offer(&self, offer: &Offer) -> Result<()>;

    /// Load a chat log in append order.
    async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<Message>>;

    /// Append a message to a chat log.
    async fn save_message(&self, chat_id: ChatId, message: &Message) -> Result<()>;

    /// Clear all persisted state.
    async fn reset(&self) -> Result<()>;
}

/// Durable [`Repository`] over the SQLite [`Database`].
///
/// The connection is guarded by an async mutex: callers issue one operation
/// at a time, matching the single-writer model of the engines.
pub struct SqliteRepository {
    db: Mutex<Database>,
}

impl SqliteRepository {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Open the default application database and wrap it.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Database::new()?))
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn get_inventory(&self) -> Result<Vec<Item>> {
        self.db.lock().await.list_items()
    }

    async fn save_item(&self, item: &Item) -> Result<()> {
        self.db.lock().await.upsert_item(item)
    }

    async fn delete_item(&self, id: ItemId) -> Result<()> {
        let deleted = self.db.lock().await.delete_item(id)?;
        if !deleted {
            tracing::debug!(item = %id, "delete of missing item ignored");
        }
        Ok(())
    }

    async fn get_active_item_id(&self) -> Result<Option<ItemId>> {
        self.db.lock().await.get_active_item_id()
    }

    async fn set_active_item_id(&self, id: Option<ItemId>) -> Result<()> {
        self.db.lock().await.set_active_item_id(id)
    }

    async fn get_offers(&self) -> Result<Vec<Offer>> {
        self.db.lock().await.list_offers()
    }

    async fn save_offer(&self, offer: &Offer) -> Result<()> {
        self.db.lock().await.upsert_offer(offer)
    }

    async fn get_messages(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        self.db.lock().await.list_messages(chat_id)
    }

    async fn save_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        self.db.lock().await.append_message(chat_id, message)
    }

    async fn reset(&self) -> Result<()> {
        self.db.lock().await.clear_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapdeck_shared::catalog;

    #[tokio::test]
    async fn test_sqlite_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("repo.db")).unwrap();
        let repo = SqliteRepository::new(db);

        let seed = catalog::seed_inventory();
        for item in &seed {
            repo.save_item(item).await.unwrap();
        }
        repo.set_active_item_id(Some(seed[0].id)).await.unwrap();

        assert_eq!(repo.get_inventory().await.unwrap().len(), 2);
        assert_eq!(repo.get_active_item_id().await.unwrap(), Some(seed[0].id));

        repo.reset().await.unwrap();
        assert!(repo.get_inventory().await.unwrap().is_empty());
        assert!(repo.get_active_item_id().await.unwrap().is_none());
    }
}
