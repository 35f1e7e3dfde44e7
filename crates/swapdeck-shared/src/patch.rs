//! Typed partial updates.
//!
//! Mutable entities are updated through explicit patch structs with named
//! optional fields, applied by a pure merge that returns a new value. Fields
//! driven by the offer state machine (`status`, `swap_step`, the codes) are
//! deliberately absent from [`OfferPatch`]: those change only through engine
//! transitions.

use crate::models::{Category, Condition, Item, MeetingDetails, Offer};

/// Partial update for an [`Item`]. `id` and `owner_id` are immutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub images: Option<Vec<String>>,
    pub condition: Option<Condition>,
    pub estimated_value: Option<f64>,
}

impl ItemPatch {
    /// Merge this patch over `item`, returning the updated value.
    pub fn apply(&self, item: &Item) -> Item {
        Item {
            id: item.id,
            owner_id: item.owner_id,
            title: self.title.clone().unwrap_or_else(|| item.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| item.description.clone()),
            category: self.category.unwrap_or(item.category),
            images: self.images.clone().unwrap_or_else(|| item.images.clone()),
            condition: self.condition.unwrap_or(item.condition),
            estimated_value: self.estimated_value.unwrap_or(item.estimated_value),
        }
    }
}

/// Partial update for the user-controlled fields of an [`Offer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferPatch {
    pub meeting_details: Option<MeetingDetails>,
    pub is_pinned: Option<bool>,
    pub is_hidden: Option<bool>,
    pub user_rating: Option<u8>,
}

impl OfferPatch {
    /// Merge this patch over `offer`, returning the updated value.
    pub fn apply(&self, offer: &Offer) -> Offer {
        let mut next = offer.clone();
        if let Some(details) = &self.meeting_details {
            next.meeting_details = Some(details.clone());
        }
        if let Some(pinned) = self.is_pinned {
            next.is_pinned = pinned;
        }
        if let Some(hidden) = self.is_hidden {
            next.is_hidden = hidden;
        }
        if let Some(rating) = self.user_rating {
            next.user_rating = Some(rating);
        }
        next
    }
}
