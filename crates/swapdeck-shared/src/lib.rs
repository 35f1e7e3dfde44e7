//! # swapdeck-shared
//!
//! Domain types shared by every SwapDeck crate: items, users, offers, chat
//! messages, typed patch structs, swap verification codes and the static
//! catalog of seed/fallback content.
//!
//! This crate is pure data — no I/O, no persistence, no HTTP. Everything
//! derives `Serialize`/`Deserialize` so values can be handed straight to a
//! store or a UI layer.

pub mod catalog;
pub mod codes;
pub mod models;
pub mod patch;
pub mod types;

pub use codes::{CodeError, SwapCode};
pub use models::*;
pub use patch::{ItemPatch, OfferPatch};
pub use types::{ChatId, ItemId, MessageId, OfferId, UserId};
