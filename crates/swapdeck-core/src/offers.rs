//! The offer book: match creation and the swap lifecycle state machine.
//!
//! Status transitions:
//!
//! ```text
//! (match intent) --policy--> Pending ----accept----> Accepted ---code ok---> Swapped
//!                               |                       |
//!                               +------decline------> Declined (terminal)
//! ```
//!
//! An accepted offer additionally walks the swap step Logistics -> Verify ->
//! Complete; the code check only fires at Complete, and a successful check is
//! the sole way to reach Swapped. Declines and code mismatches are ordinary
//! outcomes, not errors — the only fault this engine raises is a repository
//! failure, and a failed write never changes in-memory state.

use std::sync::Arc;

use chrono::Utc;

use swapdeck_shared::{
    catalog, ChatId, ItemId, MeetingDetails, Offer, OfferId, OfferPatch, OfferStatus, SwapCode,
    SwapStep,
};
use swapdeck_store::Repository;

use crate::deck::MatchIntent;
use crate::error::Result;
use crate::policy::MatchPolicy;

/// Outcome of feeding a match intent to the book.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// A new offer was created, starting at Pending/Logistics.
    Offered(Offer),
    /// The policy passed on this candidate; nothing was created.
    Passed,
    /// A live (non-declined) offer for this candidate already exists.
    AlreadyOffered(OfferId),
}

/// Outcome of a state-machine event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The offer moved to the requested state.
    Applied,
    /// The event is not legal from the offer's current state.
    Invalid,
    /// No offer with that id exists.
    NotFound,
}

/// Outcome of a code submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// The entered code matched; the offer is now Swapped.
    Swapped,
    /// Wrong code. State unchanged; the caller may retry without limit.
    Mismatch,
    /// The offer is not at the code-exchange step.
    NotReady,
    /// No offer with that id exists.
    NotFound,
}

/// All offers, with the state machine over them.
pub struct OfferBook {
    repo: Arc<dyn Repository>,
    policy: Box<dyn MatchPolicy>,
    offers: Vec<Offer>,
}

impl OfferBook {
    pub fn new(repo: Arc<dyn Repository>, policy: Box<dyn MatchPolicy>) -> Self {
        Self {
            repo,
            policy,
            offers: Vec::new(),
        }
    }

    /// Load persisted offers, most recently created first.
    pub async fn load(&mut self) -> Result<()> {
        self.offers = self.repo.get_offers().await?;
        tracing::info!(offers = self.offers.len(), "offer book loaded");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Match creation
    // ------------------------------------------------------------------

    /// Decide whether a match intent becomes an offer, and create it if so.
    ///
    /// Creation is de-duplicated by candidate item id: while a non-declined
    /// offer for the same candidate exists (e.g. after an undo and re-swipe),
    /// the existing offer is reported instead of minting a second one. A
    /// declined offer does not block a new attempt.
    pub async fn handle_match_intent(
        &mut self,
        intent: MatchIntent,
        my_item_id: ItemId,
    ) -> Result<MatchOutcome> {
        if !self.policy.should_match(&intent.item) {
            tracing::debug!(item = %intent.item.id, "match intent passed on by policy");
            return Ok(MatchOutcome::Passed);
        }

        if let Some(existing) = self
            .offers
            .iter()
            .find(|o| o.their_item.id == intent.item.id && o.status != OfferStatus::Declined)
        {
            tracing::debug!(item = %intent.item.id, offer = %existing.id, "candidate already offered");
            return Ok(MatchOutcome::AlreadyOffered(existing.id));
        }

        // Both codes are fixed here, once, for the lifetime of the offer.
        let (my_code, their_code) = {
            let mut rng = rand::thread_rng();
            (SwapCode::generate(&mut rng), SwapCode::generate(&mut rng))
        };

        let their_user = catalog::trader_by_id(intent.item.owner_id).clone();
        let offer = Offer {
            id: OfferId::new(),
            my_item_id,
            their_item: intent.item,
            their_user,
            status: OfferStatus::Pending,
            chat_id: ChatId::new(),
            created_at: Utc::now(),
            swap_step: Some(SwapStep::Logistics),
            my_code,
            their_code,
            meeting_details: None,
            is_pinned: false,
            is_hidden: false,
            user_rating: None,
        };

        self.repo.save_offer(&offer).await?;
        self.offers.insert(0, offer.clone());

        tracing::info!(
            offer = %offer.id,
            their_item = %offer.their_item.title,
            counterpart = %offer.their_user.name,
            "offer created"
        );
        Ok(MatchOutcome::Offered(offer))
    }

    // ------------------------------------------------------------------
    // Status transitions
    // ------------------------------------------------------------------

    /// Pending -> Accepted. The exchange starts (or stays) at Logistics.
    pub async fn accept(&mut self, id: OfferId) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        if offer.status != OfferStatus::Pending {
            return Ok(Transition::Invalid);
        }

        let mut updated = offer.clone();
        updated.status = OfferStatus::Accepted;
        if updated.swap_step.is_none() {
            updated.swap_step = Some(SwapStep::Logistics);
        }
        self.persist(updated).await?;

        tracing::info!(offer = %id, "offer accepted");
        Ok(Transition::Applied)
    }

    /// Pending -> Declined. Terminal.
    pub async fn decline(&mut self, id: OfferId) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        if offer.status != OfferStatus::Pending {
            return Ok(Transition::Invalid);
        }

        let mut updated = offer.clone();
        updated.status = OfferStatus::Declined;
        self.persist(updated).await?;

        tracing::info!(offer = %id, "offer declined");
        Ok(Transition::Applied)
    }

    // ------------------------------------------------------------------
    // Swap steps
    // ------------------------------------------------------------------

    /// Logistics -> Verify, recording where and when to meet.
    pub async fn confirm_logistics(
        &mut self,
        id: OfferId,
        details: MeetingDetails,
    ) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        if offer.status != OfferStatus::Accepted || offer.swap_step != Some(SwapStep::Logistics) {
            return Ok(Transition::Invalid);
        }

        let mut updated = offer.clone();
        updated.meeting_details = Some(details);
        updated.swap_step = Some(SwapStep::Verify);
        self.persist(updated).await?;

        tracing::info!(offer = %id, "logistics confirmed");
        Ok(Transition::Applied)
    }

    /// Verify -> Complete, after the in-person item check.
    pub async fn confirm_inspection(&mut self, id: OfferId) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        if offer.status != OfferStatus::Accepted || offer.swap_step != Some(SwapStep::Verify) {
            return Ok(Transition::Invalid);
        }

        let mut updated = offer.clone();
        updated.swap_step = Some(SwapStep::Complete);
        self.persist(updated).await?;

        tracing::info!(offer = %id, "items inspected");
        Ok(Transition::Applied)
    }

    // ------------------------------------------------------------------
    // Verification protocol
    // ------------------------------------------------------------------

    /// Check the code the counterpart presented.
    ///
    /// Compared against the offer's `their_code` with exact 4-digit string
    /// equality. A match is the terminal transition to Swapped (the swap step
    /// stays Complete as the marker that the flow finished); a mismatch
    /// changes nothing and may be retried without limit. Codes are fixed at
    /// offer creation and never regenerated.
    pub async fn submit_code(&mut self, id: OfferId, entered: &str) -> Result<CodeCheck> {
        let Some(offer) = self.get(id) else {
            return Ok(CodeCheck::NotFound);
        };
        if offer.status != OfferStatus::Accepted || offer.swap_step != Some(SwapStep::Complete) {
            return Ok(CodeCheck::NotReady);
        }

        if !offer.their_code.matches(entered) {
            tracing::info!(offer = %id, "verification code mismatch");
            return Ok(CodeCheck::Mismatch);
        }

        let mut updated = offer.clone();
        updated.status = OfferStatus::Swapped;
        self.persist(updated).await?;

        tracing::info!(offer = %id, "swap verified, offer complete");
        Ok(CodeCheck::Swapped)
    }

    /// Record the user's 1-5 rating after a completed swap. Set once.
    pub async fn rate(&mut self, id: OfferId, rating: u8) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        if offer.status != OfferStatus::Swapped
            || offer.user_rating.is_some()
            || !(1..=5).contains(&rating)
        {
            return Ok(Transition::Invalid);
        }

        let patch = OfferPatch {
            user_rating: Some(rating),
            ..Default::default()
        };
        let updated = patch.apply(offer);
        self.persist(updated).await?;

        tracing::info!(offer = %id, rating, "swap rated");
        Ok(Transition::Applied)
    }

    // ------------------------------------------------------------------
    // Pin / hide
    // ------------------------------------------------------------------

    /// Flip the pinned flag. Legal in every state; never gates a transition.
    pub async fn toggle_pinned(&mut self, id: OfferId) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        let patch = OfferPatch {
            is_pinned: Some(!offer.is_pinned),
            ..Default::default()
        };
        let updated = patch.apply(offer);
        self.persist(updated).await?;
        Ok(Transition::Applied)
    }

    /// Flip the hidden flag. Legal in every state; never gates a transition.
    pub async fn toggle_hidden(&mut self, id: OfferId) -> Result<Transition> {
        let Some(offer) = self.get(id) else {
            return Ok(Transition::NotFound);
        };
        let patch = OfferPatch {
            is_hidden: Some(!offer.is_hidden),
            ..Default::default()
        };
        let updated = patch.apply(offer);
        self.persist(updated).await?;
        Ok(Transition::Applied)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Display order: pinned before unpinned, then pending before resolved,
    /// then newest first. Consumers rely on this exact rule.
    pub fn sorted(&self) -> Vec<&Offer> {
        let mut sorted: Vec<&Offer> = self.offers.iter().collect();
        sorted.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| a.status.is_resolved().cmp(&b.status.is_resolved()))
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        sorted
    }

    /// Display order, hidden offers filtered out.
    pub fn visible(&self) -> Vec<&Offer> {
        self.sorted().into_iter().filter(|o| !o.is_hidden).collect()
    }

    /// Display order, hidden offers only.
    pub fn hidden(&self) -> Vec<&Offer> {
        self.sorted().into_iter().filter(|o| o.is_hidden).collect()
    }

    /// Badge count: pending offers that are not hidden.
    pub fn pending_count(&self) -> usize {
        self.offers
            .iter()
            .filter(|o| o.status == OfferStatus::Pending && !o.is_hidden)
            .count()
    }

    pub fn get(&self, id: OfferId) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == id)
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Write through, then commit to memory.
    async fn persist(&mut self, updated: Offer) -> Result<()> {
        self.repo.save_offer(&updated).await?;
        if let Some(slot) = self.offers.iter_mut().find(|o| o.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use swapdeck_shared::{Category, Item};
    use swapdeck_store::{MemoryRepository, StoreError};

    use crate::policy::FixedPolicy;

    fn candidate(n: usize) -> Item {
        catalog::fallback_items(Category::Gaming, n + 1).remove(n)
    }

    fn intent(n: usize) -> MatchIntent {
        MatchIntent { item: candidate(n) }
    }

    fn book(matching: bool) -> (Arc<MemoryRepository>, OfferBook) {
        let repo = Arc::new(MemoryRepository::new());
        let book = OfferBook::new(repo.clone(), Box::new(FixedPolicy(matching)));
        (repo, book)
    }

    async fn offered(book: &mut OfferBook) -> Offer {
        match book
            .handle_match_intent(intent(0), ItemId::new())
            .await
            .unwrap()
        {
            MatchOutcome::Offered(offer) => offer,
            other => panic!("expected Offered, got {other:?}"),
        }
    }

    /// Drive an offer to Accepted/Complete, ready for the code check.
    async fn at_code_step(book: &mut OfferBook) -> Offer {
        let offer = offered(book).await;
        book.accept(offer.id).await.unwrap();
        let details = MeetingDetails {
            location: "Park".to_string(),
            datetime: Utc::now().naive_utc(),
            notes: None,
        };
        book.confirm_logistics(offer.id, details).await.unwrap();
        book.confirm_inspection(offer.id).await.unwrap();
        book.get(offer.id).unwrap().clone()
    }

    #[tokio::test]
    async fn test_new_offer_invariants() {
        let (_, mut book) = book(true);
        let offer = offered(&mut book).await;

        assert_eq!(offer.status, OfferStatus::Pending);
        assert_eq!(offer.swap_step, Some(SwapStep::Logistics));
        assert_eq!(offer.my_code.as_str().len(), 4);
        assert_eq!(offer.their_code.as_str().len(), 4);
        assert!(offer.meeting_details.is_none());
        assert!(!offer.is_pinned && !offer.is_hidden);
        assert!(offer.user_rating.is_none());
    }

    #[tokio::test]
    async fn test_policy_pass_creates_nothing() {
        let (repo, mut book) = book(false);
        let outcome = book
            .handle_match_intent(intent(0), ItemId::new())
            .await
            .unwrap();
        assert!(matches!(outcome, MatchOutcome::Passed));
        assert!(book.offers().is_empty());
        assert!(repo.get_offers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reswipe_deduplicates_live_offer() {
        let (_, mut book) = book(true);
        let offer = offered(&mut book).await;

        // Same candidate again (undo then re-swipe).
        match book
            .handle_match_intent(
                MatchIntent {
                    item: offer.their_item.clone(),
                },
                offer.my_item_id,
            )
            .await
            .unwrap()
        {
            MatchOutcome::AlreadyOffered(id) => assert_eq!(id, offer.id),
            other => panic!("expected AlreadyOffered, got {other:?}"),
        }
        assert_eq!(book.offers().len(), 1);
    }

    #[tokio::test]
    async fn test_declined_offer_does_not_block_reswipe() {
        let (_, mut book) = book(true);
        let offer = offered(&mut book).await;
        book.decline(offer.id).await.unwrap();

        match book
            .handle_match_intent(
                MatchIntent {
                    item: offer.their_item.clone(),
                },
                offer.my_item_id,
            )
            .await
            .unwrap()
        {
            MatchOutcome::Offered(second) => assert_ne!(second.id, offer.id),
            other => panic!("expected Offered, got {other:?}"),
        }
        assert_eq!(book.offers().len(), 2);
    }

    #[tokio::test]
    async fn test_decline_is_terminal() {
        let (_, mut book) = book(true);
        let offer = offered(&mut book).await;

        assert_eq!(book.decline(offer.id).await.unwrap(), Transition::Applied);
        assert_eq!(
            book.get(offer.id).unwrap().status,
            OfferStatus::Declined
        );
        // No way back.
        assert_eq!(book.accept(offer.id).await.unwrap(), Transition::Invalid);
        assert_eq!(book.decline(offer.id).await.unwrap(), Transition::Invalid);
    }

    #[tokio::test]
    async fn test_steps_require_accepted_status() {
        let (_, mut book) = book(true);
        let offer = offered(&mut book).await;
        let details = MeetingDetails {
            location: "Cafe".to_string(),
            datetime: Utc::now().naive_utc(),
            notes: None,
        };

        // Still pending: no step may fire.
        assert_eq!(
            book.confirm_logistics(offer.id, details.clone())
                .await
                .unwrap(),
            Transition::Invalid
        );
        assert_eq!(
            book.confirm_inspection(offer.id).await.unwrap(),
            Transition::Invalid
        );
        assert_eq!(
            book.submit_code(offer.id, "1234").await.unwrap(),
            CodeCheck::NotReady
        );

        book.accept(offer.id).await.unwrap();

        // Steps fire strictly in order.
        assert_eq!(
            book.confirm_inspection(offer.id).await.unwrap(),
            Transition::Invalid
        );
        assert_eq!(
            book.confirm_logistics(offer.id, details).await.unwrap(),
            Transition::Applied
        );
        let current = book.get(offer.id).unwrap();
        assert_eq!(current.swap_step, Some(SwapStep::Verify));
        assert_eq!(
            current.meeting_details.as_ref().unwrap().location,
            "Cafe"
        );
    }

    #[tokio::test]
    async fn test_code_check_exhaustive_over_all_codes() {
        let (_, mut book) = book(true);
        let offer = at_code_step(&mut book).await;
        let correct = offer.their_code.as_str().to_string();

        // Every wrong 4-digit string is a mismatch that changes nothing.
        for n in 0..10_000 {
            let entered = format!("{n:04}");
            if entered == correct {
                continue;
            }
            assert_eq!(
                book.submit_code(offer.id, &entered).await.unwrap(),
                CodeCheck::Mismatch
            );
        }
        let unchanged = book.get(offer.id).unwrap();
        assert_eq!(unchanged.status, OfferStatus::Accepted);
        assert_eq!(unchanged.swap_step, Some(SwapStep::Complete));

        // The one matching string completes the swap.
        assert_eq!(
            book.submit_code(offer.id, &correct).await.unwrap(),
            CodeCheck::Swapped
        );
        let swapped = book.get(offer.id).unwrap();
        assert_eq!(swapped.status, OfferStatus::Swapped);
        assert_eq!(swapped.swap_step, Some(SwapStep::Complete));

        // Terminal: re-submission is no longer ready.
        assert_eq!(
            book.submit_code(offer.id, &correct).await.unwrap(),
            CodeCheck::NotReady
        );
    }

    #[tokio::test]
    async fn test_my_code_does_not_complete_the_swap() {
        let (_, mut book) = book(true);
        let offer = at_code_step(&mut book).await;

        if offer.my_code != offer.their_code {
            assert_eq!(
                book.submit_code(offer.id, offer.my_code.as_str())
                    .await
                    .unwrap(),
                CodeCheck::Mismatch
            );
        }
    }

    #[tokio::test]
    async fn test_rating_only_after_swap_and_only_once() {
        let (_, mut book) = book(true);
        let offer = at_code_step(&mut book).await;

        assert_eq!(book.rate(offer.id, 5).await.unwrap(), Transition::Invalid);

        let code = offer.their_code.as_str().to_string();
        book.submit_code(offer.id, &code).await.unwrap();

        assert_eq!(book.rate(offer.id, 0).await.unwrap(), Transition::Invalid);
        assert_eq!(book.rate(offer.id, 6).await.unwrap(), Transition::Invalid);
        assert_eq!(book.rate(offer.id, 4).await.unwrap(), Transition::Applied);
        assert_eq!(book.get(offer.id).unwrap().user_rating, Some(4));
        // Set once.
        assert_eq!(book.rate(offer.id, 5).await.unwrap(), Transition::Invalid);
    }

    #[tokio::test]
    async fn test_missing_offer_is_reported_not_raised() {
        let (_, mut book) = book(true);
        let ghost = OfferId::new();

        assert_eq!(book.accept(ghost).await.unwrap(), Transition::NotFound);
        assert_eq!(
            book.submit_code(ghost, "1234").await.unwrap(),
            CodeCheck::NotFound
        );
        assert_eq!(
            book.toggle_pinned(ghost).await.unwrap(),
            Transition::NotFound
        );
    }

    #[tokio::test]
    async fn test_pin_and_hide_do_not_touch_status() {
        let (_, mut book) = book(true);
        let offer = offered(&mut book).await;

        book.toggle_pinned(offer.id).await.unwrap();
        book.toggle_hidden(offer.id).await.unwrap();

        let current = book.get(offer.id).unwrap();
        assert!(current.is_pinned && current.is_hidden);
        assert_eq!(current.status, OfferStatus::Pending);
        assert_eq!(current.swap_step, Some(SwapStep::Logistics));

        book.toggle_pinned(offer.id).await.unwrap();
        assert!(!book.get(offer.id).unwrap().is_pinned);
    }

    fn raw_offer(pinned: bool, status: OfferStatus, created_at: DateTime<Utc>) -> Offer {
        let mut rng = rand::thread_rng();
        Offer {
            id: OfferId::new(),
            my_item_id: ItemId::new(),
            their_item: candidate(0),
            their_user: catalog::known_traders()[0].clone(),
            status,
            chat_id: ChatId::new(),
            created_at,
            swap_step: Some(SwapStep::Logistics),
            my_code: SwapCode::generate(&mut rng),
            their_code: SwapCode::generate(&mut rng),
            meeting_details: None,
            is_pinned: pinned,
            is_hidden: false,
            user_rating: None,
        }
    }

    #[tokio::test]
    async fn test_display_ordering() {
        let repo = Arc::new(MemoryRepository::new());
        let t = |n| Utc.timestamp_opt(n, 0).unwrap();

        // A(pinned, pending, t=1), B(unpinned, pending, t=2), C(pinned, declined, t=3)
        let a = raw_offer(true, OfferStatus::Pending, t(1));
        let b = raw_offer(false, OfferStatus::Pending, t(2));
        let c = raw_offer(true, OfferStatus::Declined, t(3));
        for offer in [&a, &b, &c] {
            repo.save_offer(offer).await.unwrap();
        }

        let mut book = OfferBook::new(repo, Box::new(FixedPolicy(true)));
        book.load().await.unwrap();

        let order: Vec<OfferId> = book.sorted().iter().map(|o| o.id).collect();
        assert_eq!(order, vec![a.id, c.id, b.id]);
    }

    #[tokio::test]
    async fn test_newest_first_within_tier() {
        let repo = Arc::new(MemoryRepository::new());
        let t = |n| Utc.timestamp_opt(n, 0).unwrap();

        let older = raw_offer(false, OfferStatus::Pending, t(10));
        let newer = raw_offer(false, OfferStatus::Pending, t(20));
        repo.save_offer(&older).await.unwrap();
        repo.save_offer(&newer).await.unwrap();

        let mut book = OfferBook::new(repo, Box::new(FixedPolicy(true)));
        book.load().await.unwrap();

        let order: Vec<OfferId> = book.sorted().iter().map(|o| o.id).collect();
        assert_eq!(order, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_hidden_views_and_pending_count() {
        let (_, mut book) = book(true);
        let kept = offered(&mut book).await;

        let second = match book
            .handle_match_intent(intent(1), ItemId::new())
            .await
            .unwrap()
        {
            MatchOutcome::Offered(o) => o,
            other => panic!("expected Offered, got {other:?}"),
        };
        book.toggle_hidden(second.id).await.unwrap();

        assert_eq!(book.pending_count(), 1);
        let visible: Vec<OfferId> = book.visible().iter().map(|o| o.id).collect();
        assert_eq!(visible, vec![kept.id]);
        let hidden: Vec<OfferId> = book.hidden().iter().map(|o| o.id).collect();
        assert_eq!(hidden, vec![second.id]);
    }

    #[tokio::test]
    async fn test_store_fault_propagates_and_preserves_state() {
        let repo = Arc::new(MemoryRepository::new());
        let mut book = OfferBook::new(repo.clone(), Box::new(FixedPolicy(true)));
        let offer = offered(&mut book).await;

        repo.set_fail_writes(true);
        let err = book.accept(offer.id).await.unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Store(StoreError::Unavailable)
        ));
        // The in-memory offer is still pending: the write never landed.
        assert_eq!(book.get(offer.id).unwrap().status, OfferStatus::Pending);
    }
}
