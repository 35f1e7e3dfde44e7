//! The local user's inventory.
//!
//! CRUD over owned items plus the active-item pointer — the single item
//! currently offered in trades. Every mutation is written through the
//! repository before the in-memory view changes, so a store fault leaves the
//! engine on its last committed state.

use std::sync::Arc;

use swapdeck_shared::{catalog, Category, Condition, Item, ItemId, ItemPatch};
use swapdeck_store::Repository;

use crate::error::Result;

/// Fields for a not-yet-persisted item. The manager assigns id and owner.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub images: Vec<String>,
    pub condition: Condition,
    pub estimated_value: f64,
}

/// Write-through manager for the user's own items.
pub struct InventoryManager {
    repo: Arc<dyn Repository>,
    items: Vec<Item>,
    active: Option<ItemId>,
}

impl InventoryManager {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            items: Vec::new(),
            active: None,
        }
    }

    /// Load the inventory and restore the active-item pointer.
    ///
    /// A stored pointer that no longer names an inventory item is replaced by
    /// the first item (persisting the new pointer), or cleared when the
    /// inventory is empty.
    pub async fn load(&mut self) -> Result<()> {
        self.items = self.repo.get_inventory().await?;
        let stored = self.repo.get_active_item_id().await?;

        self.active = match stored {
            Some(id) if self.items.iter().any(|i| i.id == id) => Some(id),
            _ => {
                let fallback = self.items.first().map(|i| i.id);
                if fallback != stored {
                    self.repo.set_active_item_id(fallback).await?;
                }
                fallback
            }
        };

        tracing::info!(
            items = self.items.len(),
            active = ?self.active,
            "inventory loaded"
        );
        Ok(())
    }

    /// Create an item. New items land at the front of the inventory; the
    /// first item added to an activeless inventory becomes active.
    pub async fn add(&mut self, new: NewItem) -> Result<Item> {
        let mut images = new.images;
        images.truncate(Item::MAX_IMAGES);

        let item = Item {
            id: ItemId::new(),
            owner_id: catalog::local_user().id,
            title: new.title,
            description: new.description,
            category: new.category,
            images,
            condition: new.condition,
            estimated_value: new.estimated_value.max(0.0),
        };

        self.repo.save_item(&item).await?;
        self.items.insert(0, item.clone());

        if self.active.is_none() {
            self.repo.set_active_item_id(Some(item.id)).await?;
            self.active = Some(item.id);
        }

        tracing::info!(item = %item.id, title = %item.title, "item added");
        Ok(item)
    }

    /// Apply a patch to an item. Returns the updated item, or `None` when the
    /// id names nothing (a logged no-op).
    pub async fn update(&mut self, id: ItemId, patch: &ItemPatch) -> Result<Option<Item>> {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            tracing::debug!(item = %id, "update of missing item ignored");
            return Ok(None);
        };

        let updated = patch.apply(&self.items[pos]);
        self.repo.save_item(&updated).await?;
        self.items[pos] = updated.clone();

        tracing::info!(item = %id, "item updated");
        Ok(Some(updated))
    }

    /// Delete an item. Missing ids are a logged no-op.
    ///
    /// When the deleted item was active, the first remaining item is promoted
    /// to active, or the pointer is cleared if the inventory is now empty.
    pub async fn delete(&mut self, id: ItemId) -> Result<()> {
        let Some(pos) = self.items.iter().position(|i| i.id == id) else {
            tracing::debug!(item = %id, "delete of missing item ignored");
            return Ok(());
        };

        self.repo.delete_item(id).await?;
        self.items.remove(pos);

        if self.active == Some(id) {
            let promoted = self.items.first().map(|i| i.id);
            self.repo.set_active_item_id(promoted).await?;
            self.active = promoted;
            tracing::info!(item = %id, new_active = ?promoted, "active item deleted");
        } else {
            tracing::info!(item = %id, "item deleted");
        }
        Ok(())
    }

    /// Point the active-item pointer at an inventory item. An id that names
    /// nothing is a logged no-op; returns whether the pointer moved.
    pub async fn set_active(&mut self, id: ItemId) -> Result<bool> {
        if !self.items.iter().any(|i| i.id == id) {
            tracing::debug!(item = %id, "set_active of missing item ignored");
            return Ok(false);
        }
        self.repo.set_active_item_id(Some(id)).await?;
        self.active = Some(id);
        tracing::info!(item = %id, "active item set");
        Ok(true)
    }

    /// All items, most recently added first.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn active_id(&self) -> Option<ItemId> {
        self.active
    }

    pub fn active_item(&self) -> Option<&Item> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
