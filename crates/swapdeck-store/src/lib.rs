//! # swapdeck-store
//!
//! Local persistence for the SwapDeck application, backed by SQLite.
//!
//! The crate exposes two layers: a synchronous [`Database`] handle wrapping a
//! `rusqlite::Connection` with typed CRUD helpers for every collection, and
//! the async [`Repository`] capability the engines consume. Two repository
//! implementations are provided: [`SqliteRepository`] (durable, write-through
//! to disk) and [`MemoryRepository`] (ephemeral, used by tests and demos).

pub mod database;
pub mod items;
pub mod memory;
pub mod messages;
pub mod migrations;
pub mod offers;
pub mod repository;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use memory::MemoryRepository;
pub use repository::{Repository, SqliteRepository};
