//! The root facade wiring the engines together.
//!
//! A [`SwapSession`] owns one of each engine over shared collaborators and
//! implements the cross-engine flows: restoring state at startup, turning a
//! right-swipe into an offer, and feeding offer context into the chat.

use std::sync::Arc;

use swapdeck_shared::{catalog, Category, Item, Message, Offer, OfferId};
use swapdeck_store::Repository;
use swapdeck_content::ContentProvider;

use crate::chat::{ChatContext, ChatSessions};
use crate::deck::{Commit, Direction, SwipeDeck, DECK_SIZE};
use crate::error::Result;
use crate::inventory::InventoryManager;
use crate::offers::{MatchOutcome, OfferBook};
use crate::policy::MatchPolicy;

/// What a single swipe amounted to.
#[derive(Debug, Clone)]
pub enum SwipeReport {
    /// The deck was empty; nothing happened.
    DeckEmpty,
    /// Card dismissed to the left.
    Passed,
    /// Right swipe, but no active item is selected to trade away.
    NoActiveItem,
    /// Right swipe that the match policy passed on.
    NoMatch,
    /// Right swipe on a candidate that already has a live offer.
    AlreadyOffered(OfferId),
    /// A new offer was created.
    Matched(Offer),
}

/// One user's SwapDeck session.
pub struct SwapSession {
    repo: Arc<dyn Repository>,
    pub inventory: InventoryManager,
    pub deck: SwipeDeck,
    pub offers: OfferBook,
    pub chats: ChatSessions,
}

impl SwapSession {
    pub fn new(
        repo: Arc<dyn Repository>,
        provider: Arc<dyn ContentProvider>,
        policy: Box<dyn MatchPolicy>,
    ) -> Self {
        Self {
            inventory: InventoryManager::new(repo.clone()),
            deck: SwipeDeck::new(provider.clone(), Category::Electronics),
            offers: OfferBook::new(repo.clone(), policy),
            chats: ChatSessions::new(repo.clone(), provider),
            repo,
        }
    }

    /// Restore persisted state and, when an active item is selected, load a
    /// first deck of candidates.
    pub async fn init(&mut self) -> Result<()> {
        self.inventory.load().await?;
        self.offers.load().await?;
        if self.inventory.active_id().is_some() {
            self.deck.load(DECK_SIZE).await;
        }
        tracing::info!("session initialized");
        Ok(())
    }

    /// Persist the demo seed inventory into an empty store. Call before
    /// [`SwapSession::init`] on first run; a non-empty inventory is left
    /// untouched.
    pub async fn seed_demo_data(&mut self) -> Result<()> {
        if !self.repo.get_inventory().await?.is_empty() {
            return Ok(());
        }
        for item in catalog::seed_inventory() {
            self.repo.save_item(&item).await?;
        }
        tracing::info!("seeded demo inventory");
        Ok(())
    }

    /// Commit the front card and, on a right swipe, run the match flow.
    pub async fn swipe(&mut self, direction: Direction) -> Result<SwipeReport> {
        match self.deck.commit(direction) {
            Commit::Empty => Ok(SwipeReport::DeckEmpty),
            Commit::Removed(_) => Ok(SwipeReport::Passed),
            Commit::Intent(intent) => {
                let Some(my_item_id) = self.inventory.active_id() else {
                    tracing::debug!(item = %intent.item.id, "right swipe with no active item");
                    return Ok(SwipeReport::NoActiveItem);
                };
                match self.offers.handle_match_intent(intent, my_item_id).await? {
                    MatchOutcome::Offered(offer) => Ok(SwipeReport::Matched(offer)),
                    MatchOutcome::Passed => Ok(SwipeReport::NoMatch),
                    MatchOutcome::AlreadyOffered(id) => Ok(SwipeReport::AlreadyOffered(id)),
                }
            }
        }
    }

    /// Restore the last committed card. Never retracts an offer.
    pub fn undo(&mut self) -> Option<&Item> {
        self.deck.undo()
    }

    /// Open the chat attached to an offer. `None` for an unknown offer.
    pub async fn open_chat(&mut self, offer_id: OfferId) -> Result<Option<&[Message]>> {
        let Some(chat_id) = self.offers.get(offer_id).map(|o| o.chat_id) else {
            return Ok(None);
        };
        self.chats.open(chat_id).await.map(Some)
    }

    /// Send a chat message on an offer. `None` for an unknown offer or blank
    /// text; afterwards the chat is typing until [`SwapSession::counterpart_reply`].
    pub async fn send_message(
        &mut self,
        offer_id: OfferId,
        text: &str,
    ) -> Result<Option<Message>> {
        let Some(chat_id) = self.offers.get(offer_id).map(|o| o.chat_id) else {
            return Ok(None);
        };
        self.chats.send(chat_id, text).await
    }

    /// Resolve the pending counterpart reply for an offer's chat.
    pub async fn counterpart_reply(&mut self, offer_id: OfferId) -> Result<Option<Message>> {
        let Some(offer) = self.offers.get(offer_id).cloned() else {
            return Ok(None);
        };

        // The local side of the offer is a live reference and may dangle
        // after a delete; fall back to the current active item, then to the
        // counterpart snapshot, purely for prompt context.
        let my_item = self
            .inventory
            .get(offer.my_item_id)
            .or_else(|| self.inventory.active_item())
            .unwrap_or(&offer.their_item)
            .clone();

        let context = ChatContext {
            their_item: &offer.their_item,
            my_item: &my_item,
            counterpart_name: &offer.their_user.name,
        };
        self.chats.resolve_reply(offer.chat_id, context).await
    }

    /// Clear all persisted state and drop every cached view.
    pub async fn reset(&mut self) -> Result<()> {
        self.repo.reset().await?;
        self.inventory.load().await?;
        self.offers.load().await?;
        self.chats.clear();
        self.deck.clear();
        tracing::info!("session reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use swapdeck_shared::{Condition, MeetingDetails, OfferStatus, Sender, SwapStep};
    use swapdeck_store::{Database, MemoryRepository, SqliteRepository};
    use swapdeck_content::ScriptedProvider;

    use crate::inventory::NewItem;
    use crate::offers::{CodeCheck, Transition};
    use crate::policy::FixedPolicy;

    fn draft(title: &str) -> NewItem {
        NewItem {
            title: title.to_string(),
            description: "test".to_string(),
            category: Category::Other,
            images: vec![],
            condition: Condition::Good,
            estimated_value: 100.0,
        }
    }

    async fn session(matching: bool) -> SwapSession {
        let repo = Arc::new(MemoryRepository::new());
        let provider = Arc::new(ScriptedProvider::new());
        let mut session = SwapSession::new(repo, provider, Box::new(FixedPolicy(matching)));
        session.init().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_happy_path_scenario() {
        let mut session = session(true).await;

        // Inventory has one item I1 (active).
        let i1 = session.inventory.add(draft("I1")).await.unwrap();
        assert_eq!(session.inventory.active_id(), Some(i1.id));

        // Load a deck and swipe right on candidate X.
        session.deck.load(DECK_SIZE).await;
        let x = session.deck.peek().unwrap().clone();
        let offer = match session.swipe(Direction::Right).await.unwrap() {
            SwipeReport::Matched(offer) => offer,
            other => panic!("expected Matched, got {other:?}"),
        };

        assert_eq!(offer.my_item_id, i1.id);
        assert_eq!(offer.their_item.id, x.id);
        assert_eq!(offer.status, OfferStatus::Pending);

        // Accept.
        assert_eq!(
            session.offers.accept(offer.id).await.unwrap(),
            Transition::Applied
        );
        assert_eq!(
            session.offers.get(offer.id).unwrap().status,
            OfferStatus::Accepted
        );

        // Logistics.
        let details = MeetingDetails {
            location: "Park".to_string(),
            datetime: Utc::now().naive_utc(),
            notes: None,
        };
        session
            .offers
            .confirm_logistics(offer.id, details)
            .await
            .unwrap();
        let current = session.offers.get(offer.id).unwrap();
        assert_eq!(current.swap_step, Some(SwapStep::Verify));
        assert_eq!(current.meeting_details.as_ref().unwrap().location, "Park");

        // In-person check.
        session.offers.confirm_inspection(offer.id).await.unwrap();
        assert_eq!(
            session.offers.get(offer.id).unwrap().swap_step,
            Some(SwapStep::Complete)
        );

        // Counterpart's code completes the swap.
        let code = offer.their_code.as_str().to_string();
        assert_eq!(
            session.offers.submit_code(offer.id, &code).await.unwrap(),
            CodeCheck::Swapped
        );
        assert_eq!(
            session.offers.get(offer.id).unwrap().status,
            OfferStatus::Swapped
        );
    }

    #[tokio::test]
    async fn test_right_swipe_without_active_item() {
        let mut session = session(true).await;
        session.deck.load(DECK_SIZE).await;

        let report = session.swipe(Direction::Right).await.unwrap();
        assert!(matches!(report, SwipeReport::NoActiveItem));
        assert!(session.offers.offers().is_empty());
        // The card was still committed and can be restored.
        assert!(session.deck.can_undo());
    }

    #[tokio::test]
    async fn test_policy_pass_and_empty_deck_are_reported() {
        let mut session = session(false).await;
        session.inventory.add(draft("mine")).await.unwrap();
        session.deck.load(DECK_SIZE).await;

        for _ in 0..DECK_SIZE {
            let report = session.swipe(Direction::Right).await.unwrap();
            assert!(matches!(report, SwipeReport::NoMatch));
        }
        assert!(matches!(
            session.swipe(Direction::Right).await.unwrap(),
            SwipeReport::DeckEmpty
        ));
        assert!(session.offers.offers().is_empty());
    }

    #[tokio::test]
    async fn test_left_swipe_never_matches() {
        let mut session = session(true).await;
        session.inventory.add(draft("mine")).await.unwrap();
        session.deck.load(DECK_SIZE).await;

        let report = session.swipe(Direction::Left).await.unwrap();
        assert!(matches!(report, SwipeReport::Passed));
        assert!(session.offers.offers().is_empty());
    }

    #[tokio::test]
    async fn test_undo_then_reswipe_reports_existing_offer() {
        let mut session = session(true).await;
        session.inventory.add(draft("mine")).await.unwrap();
        session.deck.load(DECK_SIZE).await;

        let offer = match session.swipe(Direction::Right).await.unwrap() {
            SwipeReport::Matched(offer) => offer,
            other => panic!("expected Matched, got {other:?}"),
        };

        // Undo restores the card but does not retract the offer.
        let restored = session.undo().unwrap().clone();
        assert_eq!(restored.id, offer.their_item.id);
        assert_eq!(session.offers.offers().len(), 1);

        // Re-swiping the same candidate reports the live offer.
        match session.swipe(Direction::Right).await.unwrap() {
            SwipeReport::AlreadyOffered(id) => assert_eq!(id, offer.id),
            other => panic!("expected AlreadyOffered, got {other:?}"),
        }
        assert_eq!(session.offers.offers().len(), 1);
    }

    #[tokio::test]
    async fn test_chat_flow_through_session() {
        let mut session = session(true).await;
        session.inventory.add(draft("mine")).await.unwrap();
        session.deck.load(DECK_SIZE).await;

        let offer = match session.swipe(Direction::Right).await.unwrap() {
            SwipeReport::Matched(offer) => offer,
            other => panic!("expected Matched, got {other:?}"),
        };

        let log = session.open_chat(offer.id).await.unwrap().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sender, Sender::Them);

        session
            .send_message(offer.id, "Would you trade for mine?")
            .await
            .unwrap()
            .unwrap();
        assert!(session.chats.is_typing(offer.chat_id));

        let reply = session.counterpart_reply(offer.id).await.unwrap().unwrap();
        assert_eq!(reply.sender, Sender::Them);
        assert!(!session.chats.is_typing(offer.chat_id));
        assert_eq!(session.chats.messages(offer.chat_id).len(), 3);
    }

    #[tokio::test]
    async fn test_chat_on_unknown_offer() {
        let mut session = session(true).await;
        assert!(session.open_chat(OfferId::new()).await.unwrap().is_none());
        assert!(session
            .send_message(OfferId::new(), "hello")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_seed_demo_data_only_fills_empty_store() {
        let mut session = session(true).await;
        session.seed_demo_data().await.unwrap();
        session.init().await.unwrap();
        assert_eq!(session.inventory.items().len(), 2);

        // Seeding again adds nothing.
        session.seed_demo_data().await.unwrap();
        session.init().await.unwrap();
        assert_eq!(session.inventory.items().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let mut session = session(true).await;
        session.inventory.add(draft("mine")).await.unwrap();
        session.deck.load(DECK_SIZE).await;
        session.swipe(Direction::Right).await.unwrap();

        session.reset().await.unwrap();

        assert!(session.inventory.is_empty());
        assert!(session.inventory.active_id().is_none());
        assert!(session.offers.offers().is_empty());
        assert_eq!(session.deck.remaining(), 0);
    }

    #[tokio::test]
    async fn test_state_survives_restart_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        let offer_id;
        let item_id;
        {
            let repo = Arc::new(SqliteRepository::new(Database::open_at(&path).unwrap()));
            let mut session = SwapSession::new(
                repo,
                Arc::new(ScriptedProvider::new()),
                Box::new(FixedPolicy(true)),
            );
            session.init().await.unwrap();
            item_id = session.inventory.add(draft("durable")).await.unwrap().id;
            session.deck.load(DECK_SIZE).await;
            let offer = match session.swipe(Direction::Right).await.unwrap() {
                SwipeReport::Matched(offer) => offer,
                other => panic!("expected Matched, got {other:?}"),
            };
            offer_id = offer.id;
            session.open_chat(offer_id).await.unwrap();
        }

        // A fresh session over the same file sees the committed state.
        let repo = Arc::new(SqliteRepository::new(Database::open_at(&path).unwrap()));
        let mut session = SwapSession::new(
            repo,
            Arc::new(ScriptedProvider::new()),
            Box::new(FixedPolicy(true)),
        );
        session.init().await.unwrap();

        assert_eq!(session.inventory.active_id(), Some(item_id));
        let offer = session.offers.get(offer_id).expect("offer survived");
        assert_eq!(offer.status, OfferStatus::Pending);
        let log = session.open_chat(offer_id).await.unwrap().unwrap();
        assert_eq!(log.len(), 1);
    }
}
