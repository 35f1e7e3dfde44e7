//! Per-offer chat sessions.
//!
//! Each offer owns one append-only message log keyed by its chat id. The
//! flow is two-phase: `send` appends exactly one of the user's messages and
//! marks the session as typing, then `resolve_reply` suspends on the content
//! provider and appends exactly one counterpart message, clearing the typing
//! flag. The window between the two calls is the observable "typing"
//! indicator — bounded by the eventual reply, not by a timeout. Provider
//! failure is invisible here; the provider falls back to a fixed reply text.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use swapdeck_shared::{catalog, ChatId, Item, Message, Sender};
use swapdeck_store::Repository;
use swapdeck_content::ContentProvider;

use crate::error::Result;

/// Negotiation context the counterpart replies are generated from.
#[derive(Debug, Clone, Copy)]
pub struct ChatContext<'a> {
    /// The counterpart's item (snapshot from the offer).
    pub their_item: &'a Item,
    /// The local user's item in the trade.
    pub my_item: &'a Item,
    /// The counterpart's display name.
    pub counterpart_name: &'a str,
}

/// All chat sessions, cached by chat id.
pub struct ChatSessions {
    repo: Arc<dyn Repository>,
    provider: Arc<dyn ContentProvider>,
    logs: HashMap<ChatId, Vec<Message>>,
    typing: HashSet<ChatId>,
}

impl ChatSessions {
    pub fn new(repo: Arc<dyn Repository>, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            repo,
            provider,
            logs: HashMap::new(),
            typing: HashSet::new(),
        }
    }

    /// Load a chat log, synthesizing the counterpart's greeting on first
    /// open. The greeting is persisted, so reopening yields the same log.
    pub async fn open(&mut self, chat_id: ChatId) -> Result<&[Message]> {
        if !self.logs.contains_key(&chat_id) {
            let mut history = self.repo.get_messages(chat_id).await?;
            if history.is_empty() {
                let greeting = Message::now(Sender::Them, catalog::GREETING);
                self.repo.save_message(chat_id, &greeting).await?;
                history.push(greeting);
                tracing::info!(chat = %chat_id, "chat opened with greeting");
            }
            self.logs.insert(chat_id, history);
        }
        Ok(self.logs.get(&chat_id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Append one of the user's messages and mark the session typing.
    ///
    /// Blank text is ignored and returns `None`. The reply must be collected
    /// with [`ChatSessions::resolve_reply`]; until then `is_typing` reports
    /// true for this chat.
    pub async fn send(&mut self, chat_id: ChatId, text: &str) -> Result<Option<Message>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        self.open(chat_id).await?;

        let message = Message::now(Sender::Me, text);
        self.repo.save_message(chat_id, &message).await?;
        self.logs.entry(chat_id).or_default().push(message.clone());
        self.typing.insert(chat_id);

        tracing::debug!(chat = %chat_id, "message sent");
        Ok(Some(message))
    }

    /// Suspend on the content provider and append the counterpart's reply.
    ///
    /// Returns `None` when no reply is pending (no preceding `send`). The
    /// provider call is neither cancellable nor bounded by a timeout; it
    /// resolves to generated text or to the fixed fallback reply.
    pub async fn resolve_reply(
        &mut self,
        chat_id: ChatId,
        context: ChatContext<'_>,
    ) -> Result<Option<Message>> {
        if !self.typing.contains(&chat_id) {
            return Ok(None);
        }

        let history = self.logs.get(&chat_id).cloned().unwrap_or_default();
        let text = self
            .provider
            .generate_reply(
                &history,
                context.their_item,
                context.my_item,
                context.counterpart_name,
            )
            .await;

        let reply = Message::now(Sender::Them, text);
        self.repo.save_message(chat_id, &reply).await?;
        self.logs.entry(chat_id).or_default().push(reply.clone());
        self.typing.remove(&chat_id);

        tracing::debug!(chat = %chat_id, "reply appended");
        Ok(Some(reply))
    }

    /// Whether a reply is pending for this chat.
    pub fn is_typing(&self, chat_id: ChatId) -> bool {
        self.typing.contains(&chat_id)
    }

    /// The cached log for a chat. Empty if the chat was never opened.
    pub fn messages(&self, chat_id: ChatId) -> &[Message] {
        self.logs.get(&chat_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Drop all cached logs and typing flags (used on reset).
    pub fn clear(&mut self) {
        self.logs.clear();
        self.typing.clear();
    }
}
