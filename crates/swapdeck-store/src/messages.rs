//! CRUD operations for chat [`Message`] records.

use chrono::{DateTime, Utc};
use rusqlite::params;

use swapdeck_shared::{ChatId, Message, MessageId, Sender};

use crate::database::Database;
use crate::error::Result;

fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::Me => "me",
        Sender::Them => "them",
    }
}

fn sender_from_label(label: &str) -> Option<Sender> {
    match label {
        "me" => Some(Sender::Me),
        "them" => Some(Sender::Them),
        _ => None,
    }
}

impl Database {
    /// Append a message to a chat log.
    pub fn append_message(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (id, chat_id, sender, text, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                message.id.to_string(),
                chat_id.to_string(),
                sender_label(message.sender),
                message.text,
                message.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load a chat log in append order.
    pub fn list_messages(&self, chat_id: ChatId) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, sender, text, timestamp
             FROM messages
             WHERE chat_id = ?1
             ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map(params![chat_id.to_string()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let sender_str: String = row.get(1)?;
    let ts_str: String = row.get(3)?;

    let id = MessageId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let sender = sender_from_label(&sender_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            format!("unknown sender: {sender_str}").into(),
        )
    })?;

    let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Message {
        id,
        sender,
        text: row.get(2)?,
        timestamp,
    })
}
