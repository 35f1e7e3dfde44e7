//! Domain model structs for the swap lifecycle.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be persisted
//! by the store crate or handed directly to a UI layer.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::codes::SwapCode;
use crate::types::{ChatId, ItemId, MessageId, OfferId, UserId};

// ---------------------------------------------------------------------------
// Category & Condition
// ---------------------------------------------------------------------------

/// Closed set of item categories used to filter the swipe deck.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Electronics,
    Fashion,
    Home,
    Fitness,
    Books,
    Gaming,
    Music,
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 8] = [
        Category::Electronics,
        Category::Fashion,
        Category::Home,
        Category::Fitness,
        Category::Books,
        Category::Gaming,
        Category::Music,
        Category::Other,
    ];

    /// Human-readable label, also used as the persisted representation.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Fashion => "Fashion",
            Category::Home => "Home",
            Category::Fitness => "Fitness",
            Category::Books => "Books",
            Category::Gaming => "Gaming",
            Category::Music => "Music",
            Category::Other => "Other",
        }
    }

    /// Inverse of [`Category::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical condition of an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Condition {
    New,
    LikeNew,
    Good,
    Fair,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::New,
        Condition::LikeNew,
        Condition::Good,
        Condition::Fair,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
        }
    }

    /// Inverse of [`Condition::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        Condition::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A tradeable item, either owned by the local user or offered by a
/// counterpart in the swipe deck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Unique item identifier. Immutable across updates.
    pub id: ItemId,
    /// The user who owns this item.
    pub owner_id: UserId,
    /// Short display title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category the item belongs to.
    pub category: Category,
    /// Ordered image references, at most [`Item::MAX_IMAGES`].
    pub images: Vec<String>,
    /// Physical condition.
    pub condition: Condition,
    /// Estimated value in whole currency units. Never negative.
    pub estimated_value: f64,
}

impl Item {
    /// Maximum number of image references an item may carry.
    pub const MAX_IMAGES: usize = 5;

    /// The image reference a display layer should use.
    ///
    /// Falls back to a per-category stock reference when the item carries no
    /// images, so callers never receive an empty value.
    pub fn display_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| catalog::fallback_image(self.category))
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A user profile. Read-only reference data in the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar image reference.
    pub avatar_url: String,
    /// Trader rating, 0.0 to 5.0.
    pub rating: f32,
}

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

/// Top-level lifecycle status of an [`Offer`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OfferStatus {
    /// Freshly matched, awaiting an accept/decline decision.
    Pending,
    /// Accepted; the in-person exchange flow (swap step) is underway.
    Accepted,
    /// Declined. Terminal.
    Declined,
    /// Exchange verified by code. Terminal.
    Swapped,
}

impl OfferStatus {
    /// Whether the offer has left the `Pending` state.
    ///
    /// Resolved offers sort after pending ones in the offer list.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

/// Sub-state of an accepted offer tracking the in-person exchange.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SwapStep {
    /// Agreeing where and when to meet.
    Logistics,
    /// Inspecting each other's items in person.
    Verify,
    /// Exchanging verification codes.
    Complete,
}

/// Agreed meeting arrangements for an accepted offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingDetails {
    /// Free-form meeting place, e.g. "Starbucks, Central Park".
    pub location: String,
    /// Agreed local meeting time.
    pub datetime: NaiveDateTime,
    /// Optional extra notes.
    pub notes: Option<String>,
}

/// A proposed, ongoing or completed trade between the local user's item and
/// a matched counterpart item.
///
/// The counterpart's item and profile are denormalized snapshots taken at
/// match time: they record what was agreed to and are immune to later edits
/// of the source data. The local side stays a live [`ItemId`] reference and
/// is never re-validated; deleting that item leaves the offer untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    /// Unique offer identifier.
    pub id: OfferId,
    /// The local user's item at match time (live reference, may dangle).
    pub my_item_id: ItemId,
    /// Snapshot of the matched counterpart item.
    pub their_item: Item,
    /// Snapshot of the counterpart's profile.
    pub their_user: User,
    /// Lifecycle status.
    pub status: OfferStatus,
    /// The chat session attached to this offer (1:1).
    pub chat_id: ChatId,
    /// Creation time; newest-first tie-break in the offer list.
    pub created_at: DateTime<Utc>,
    /// Exchange progress. Only meaningful while `status` is `Accepted` or
    /// `Swapped`.
    pub swap_step: Option<SwapStep>,
    /// Code the local user shows the counterpart. Fixed at creation.
    pub my_code: SwapCode,
    /// Code the counterpart is expected to present. Fixed at creation.
    pub their_code: SwapCode,
    /// Meeting arrangements, set when logistics are confirmed.
    pub meeting_details: Option<MeetingDetails>,
    /// Pinned to the top of the offer list. Never gates a transition.
    pub is_pinned: bool,
    /// Hidden from the default offer list. Never gates a transition.
    pub is_hidden: bool,
    /// 1-5 rating the user left after the swap completed.
    pub user_rating: Option<u8>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Who authored a chat message. Closed set: the local user or the simulated
/// counterpart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Sender {
    Me,
    Them,
}

/// A single chat message. Messages are append-only: no edit, no delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Message author.
    pub sender: Sender,
    /// Message body.
    pub text: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn now(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
