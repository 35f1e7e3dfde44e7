use async_trait::async_trait;

use swapdeck_shared::{Category, Item, Message};

/// Generative content source for the deck and the chat.
///
/// Implementations fail closed: when the underlying source is unreachable or
/// produces garbage, they substitute deterministic fallback content rather
/// than surfacing an error. The engines therefore treat these methods as
/// infallible; a failure only ever shows up as a shorter candidate list or a
/// canned reply.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Produce up to `count` candidate items for a category.
    async fn generate_items(&self, category: Category, count: usize) -> Vec<Item>;

    /// Produce the counterpart's next chat reply given the full message
    /// history and the two items under negotiation.
    async fn generate_reply(
        &self,
        history: &[Message],
        their_item: &Item,
        my_item: &Item,
        counterpart_name: &str,
    ) -> String;
}
