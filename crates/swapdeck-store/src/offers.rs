//! CRUD operations for [`Offer`] records.
//!
//! The counterpart item/user snapshots and the meeting details are stored as
//! JSON columns; the store owns this layout and may change it behind a
//! migration.

use chrono::{DateTime, Utc};
use rusqlite::params;
use std::str::FromStr;

use swapdeck_shared::{
    ChatId, Item, ItemId, MeetingDetails, Offer, OfferId, OfferStatus, SwapCode, SwapStep, User,
};

use crate::database::Database;
use crate::error::Result;

fn status_label(status: OfferStatus) -> &'static str {
    match status {
        OfferStatus::Pending => "pending",
        OfferStatus::Accepted => "accepted",
        OfferStatus::Declined => "declined",
        OfferStatus::Swapped => "swapped",
    }
}

fn status_from_label(label: &str) -> Option<OfferStatus> {
    match label {
        "pending" => Some(OfferStatus::Pending),
        "accepted" => Some(OfferStatus::Accepted),
        "declined" => Some(OfferStatus::Declined),
        "swapped" => Some(OfferStatus::Swapped),
        _ => None,
    }
}

fn step_label(step: SwapStep) -> &'static str {
    match step {
        SwapStep::Logistics => "logistics",
        SwapStep::Verify => "verify",
        SwapStep::Complete => "complete",
    }
}

fn step_from_label(label: &str) -> Option<SwapStep> {
    match label {
        "logistics" => Some(SwapStep::Logistics),
        "verify" => Some(SwapStep::Verify),
        "complete" => Some(SwapStep::Complete),
        _ => None,
    }
}

impl Database {
    /// Insert or replace an offer by id.
    pub fn upsert_offer(&self, offer: &Offer) -> Result<()> {
        self.conn().execute(
            "INSERT INTO offers (id, my_item_id, their_item, their_user, status, chat_id,
                                 created_at, swap_step, my_code, their_code, meeting_details,
                                 is_pinned, is_hidden, user_rating)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                 my_item_id = excluded.my_item_id,
                 their_item = excluded.their_item,
                 their_user = excluded.their_user,
                 status = excluded.status,
                 chat_id = excluded.chat_id,
                 created_at = excluded.created_at,
                 swap_step = excluded.swap_step,
                 my_code = excluded.my_code,
                 their_code = excluded.their_code,
                 meeting_details = excluded.meeting_details,
                 is_pinned = excluded.is_pinned,
                 is_hidden = excluded.is_hidden,
                 user_rating = excluded.user_rating",
            params![
                offer.id.to_string(),
                offer.my_item_id.to_string(),
                serde_json::to_string(&offer.their_item)?,
                serde_json::to_string(&offer.their_user)?,
                status_label(offer.status),
                offer.chat_id.to_string(),
                offer.created_at.to_rfc3339(),
                offer.swap_step.map(step_label),
                offer.my_code.as_str(),
                offer.their_code.as_str(),
                offer
                    .meeting_details
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                offer.is_pinned as i64,
                offer.is_hidden as i64,
                offer.user_rating.map(|r| r as i64),
            ],
        )?;
        Ok(())
    }

    /// List all offers, most recently created first.
    pub fn list_offers(&self) -> Result<Vec<Offer>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, my_item_id, their_item, their_user, status, chat_id,
                    created_at, swap_step, my_code, their_code, meeting_details,
                    is_pinned, is_hidden, user_rating
             FROM offers
             ORDER BY rowid DESC",
        )?;

        let rows = stmt.query_map([], row_to_offer)?;

        let mut offers = Vec::new();
        for row in rows {
            offers.push(row?);
        }
        Ok(offers)
    }
}

fn row_to_offer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Offer> {
    fn conv<E: std::error::Error + Send + Sync + 'static>(
        idx: usize,
    ) -> impl FnOnce(E) -> rusqlite::Error {
        move |e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }
    }

    let id_str: String = row.get(0)?;
    let my_item_str: String = row.get(1)?;
    let their_item_json: String = row.get(2)?;
    let their_user_json: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let chat_str: String = row.get(5)?;
    let created_str: String = row.get(6)?;
    let step_str: Option<String> = row.get(7)?;
    let my_code_str: String = row.get(8)?;
    let their_code_str: String = row.get(9)?;
    let meeting_json: Option<String> = row.get(10)?;
    let is_pinned: i64 = row.get(11)?;
    let is_hidden: i64 = row.get(12)?;
    let user_rating: Option<i64> = row.get(13)?;

    let id = OfferId::parse(&id_str).map_err(conv(0))?;
    let my_item_id = ItemId::parse(&my_item_str).map_err(conv(1))?;
    let their_item: Item = serde_json::from_str(&their_item_json).map_err(conv(2))?;
    let their_user: User = serde_json::from_str(&their_user_json).map_err(conv(3))?;
    let status = status_from_label(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown offer status: {status_str}").into(),
        )
    })?;
    let chat_id = ChatId::parse(&chat_str).map_err(conv(5))?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(conv(6))?;
    let swap_step = match step_str {
        Some(s) => Some(step_from_label(&s).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                format!("unknown swap step: {s}").into(),
            )
        })?),
        None => None,
    };
    let my_code = SwapCode::from_str(&my_code_str).map_err(conv(8))?;
    let their_code = SwapCode::from_str(&their_code_str).map_err(conv(9))?;
    let meeting_details: Option<MeetingDetails> = meeting_json
        .map(|json| serde_json::from_str(&json).map_err(conv(10)))
        .transpose()?;

    Ok(Offer {
        id,
        my_item_id,
        their_item,
        their_user,
        status,
        chat_id,
        created_at,
        swap_step,
        my_code,
        their_code,
        meeting_details,
        is_pinned: is_pinned != 0,
        is_hidden: is_hidden != 0,
        user_rating: user_rating.map(|r| r as u8),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use swapdeck_shared::catalog;

    fn sample_offer() -> Offer {
        let their_item = catalog::fallback_items(swapdeck_shared::Category::Music, 1)
            .pop()
            .unwrap();
        let their_user = catalog::known_traders()[0].clone();
        let mut rng = rand::thread_rng();
        Offer {
            id: OfferId::new(),
            my_item_id: ItemId::new(),
            their_item,
            their_user,
            status: OfferStatus::Pending,
            chat_id: ChatId::new(),
            created_at: Utc::now(),
            swap_step: Some(SwapStep::Logistics),
            my_code: SwapCode::generate(&mut rng),
            their_code: SwapCode::generate(&mut rng),
            meeting_details: None,
            is_pinned: false,
            is_hidden: false,
            user_rating: None,
        }
    }

    #[test]
    fn test_offer_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let offer = sample_offer();
        db.upsert_offer(&offer).unwrap();

        let listed = db.list_offers().unwrap();
        assert_eq!(listed.len(), 1);
        // RFC-3339 round trip can shift sub-second precision; compare fields.
        assert_eq!(listed[0].id, offer.id);
        assert_eq!(listed[0].their_item, offer.their_item);
        assert_eq!(listed[0].status, offer.status);
        assert_eq!(listed[0].swap_step, offer.swap_step);
        assert_eq!(listed[0].their_code, offer.their_code);
    }

    #[test]
    fn test_offer_upsert_updates_fields() {
        let db = Database::open_in_memory().unwrap();
        let mut offer = sample_offer();
        db.upsert_offer(&offer).unwrap();

        offer.status = OfferStatus::Accepted;
        offer.swap_step = Some(SwapStep::Verify);
        offer.meeting_details = Some(MeetingDetails {
            location: "Park".to_string(),
            datetime: NaiveDate::from_ymd_opt(2026, 3, 14)
                .unwrap()
                .and_hms_opt(15, 30, 0)
                .unwrap(),
            notes: None,
        });
        offer.is_pinned = true;
        db.upsert_offer(&offer).unwrap();

        let listed = db.list_offers().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, OfferStatus::Accepted);
        assert_eq!(listed[0].swap_step, Some(SwapStep::Verify));
        assert!(listed[0].is_pinned);
        assert_eq!(
            listed[0].meeting_details.as_ref().unwrap().location,
            "Park"
        );
    }
}
