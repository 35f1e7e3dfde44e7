//! Deterministic zero-I/O provider.
//!
//! Serves the shared fallback catalog directly. This is the provider a
//! keyless demo runs on, and the double the engine tests inject.

use async_trait::async_trait;

use swapdeck_shared::{catalog, Category, Item, Message};

use crate::provider::ContentProvider;

/// Provider that answers from the static catalog, never touching the network.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    reply: Option<String>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every reply request with a fixed text instead of the default.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

#[async_trait]
impl ContentProvider for ScriptedProvider {
    async fn generate_items(&self, category: Category, count: usize) -> Vec<Item> {
        catalog::fallback_items(category, count)
    }

    async fn generate_reply(
        &self,
        _history: &[Message],
        _their_item: &Item,
        _my_item: &Item,
        _counterpart_name: &str,
    ) -> String {
        self.reply
            .clone()
            .unwrap_or_else(|| catalog::DEFAULT_REPLY.to_string())
    }
}
