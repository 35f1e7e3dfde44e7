//! CRUD operations for [`Item`] records and the active-item pointer.

use rusqlite::params;

use swapdeck_shared::{Category, Condition, Item, ItemId, UserId};

use crate::database::Database;
use crate::error::{Result, StoreError};

/// Settings key holding the id of the item currently offered in trades.
const ACTIVE_ITEM_KEY: &str = "active_item_id";

impl Database {
    // ------------------------------------------------------------------
    // Create / Update
    // ------------------------------------------------------------------

    /// Insert or replace an item by id.
    ///
    /// A new item lands at the front of the inventory (newest rowid); an
    /// existing one is updated in place and keeps its position.
    pub fn upsert_item(&self, item: &Item) -> Result<()> {
        self.conn().execute(
            "INSERT INTO items (id, owner_id, title, description, category, images, condition, estimated_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 owner_id = excluded.owner_id,
                 title = excluded.title,
                 description = excluded.description,
                 category = excluded.category,
                 images = excluded.images,
                 condition = excluded.condition,
                 estimated_value = excluded.estimated_value",
            params![
                item.id.to_string(),
                item.owner_id.to_string(),
                item.title,
                item.description,
                item.category.label(),
                serde_json::to_string(&item.images)?,
                item.condition.label(),
                item.estimated_value,
            ],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List the full inventory, most recently added first.
    pub fn list_items(&self) -> Result<Vec<Item>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, owner_id, title, description, category, images, condition, estimated_value
             FROM items
             ORDER BY rowid DESC",
        )?;

        let rows = stmt.query_map([], row_to_item)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Fetch a single item by id.
    pub fn get_item(&self, id: ItemId) -> Result<Item> {
        self.conn()
            .query_row(
                "SELECT id, owner_id, title, description, category, images, condition, estimated_value
                 FROM items WHERE id = ?1",
                params![id.to_string()],
                row_to_item,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
                other => StoreError::Sqlite(other),
            })
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Remove an item. Returns whether a row was deleted.
    pub fn delete_item(&self, id: ItemId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM items WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Active-item pointer
    // ------------------------------------------------------------------

    /// Read the persisted active-item pointer, if any.
    pub fn get_active_item_id(&self) -> Result<Option<ItemId>> {
        let value: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![ACTIVE_ITEM_KEY],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match value {
            Some(s) => Ok(Some(ItemId::parse(&s)?)),
            None => Ok(None),
        }
    }

    /// Persist (or clear) the active-item pointer.
    pub fn set_active_item_id(&self, id: Option<ItemId>) -> Result<()> {
        match id {
            Some(id) => {
                self.conn().execute(
                    "INSERT INTO settings (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![ACTIVE_ITEM_KEY, id.to_string()],
                )?;
            }
            None => {
                self.conn().execute(
                    "DELETE FROM settings WHERE key = ?1",
                    params![ACTIVE_ITEM_KEY],
                )?;
            }
        }
        Ok(())
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    let id_str: String = row.get(0)?;
    let owner_str: String = row.get(1)?;
    let category_str: String = row.get(4)?;
    let images_json: String = row.get(5)?;
    let condition_str: String = row.get(6)?;

    let id = ItemId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let owner_id = UserId::parse(&owner_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let category = Category::from_label(&category_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown category: {category_str}").into(),
        )
    })?;

    let images: Vec<String> = serde_json::from_str(&images_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let condition = Condition::from_label(&condition_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            rusqlite::types::Type::Text,
            format!("unknown condition: {condition_str}").into(),
        )
    })?;

    Ok(Item {
        id,
        owner_id,
        title: row.get(2)?,
        description: row.get(3)?,
        category,
        images,
        condition,
        estimated_value: row.get(7)?,
    })
}
