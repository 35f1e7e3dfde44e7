//! v001 -- Initial schema creation.
//!
//! Creates the four collections the engines depend on: `items`, `offers`,
//! `messages`, and the `settings` key/value table holding the active-item
//! pointer.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
///
/// Insertion order doubles as recency order: the newest row has the highest
/// rowid, and upserts update in place so a record keeps its position.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Items (the local user's inventory)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS items (
    id              TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    owner_id        TEXT NOT NULL,              -- UUID v4
    title           TEXT NOT NULL,
    description     TEXT NOT NULL,
    category        TEXT NOT NULL,              -- category label
    images          TEXT NOT NULL,              -- JSON array of refs
    condition       TEXT NOT NULL,              -- condition label
    estimated_value REAL NOT NULL
);

-- ----------------------------------------------------------------
-- Offers
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS offers (
    id              TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    my_item_id      TEXT NOT NULL,              -- live reference, may dangle
    their_item      TEXT NOT NULL,              -- JSON Item snapshot
    their_user      TEXT NOT NULL,              -- JSON User snapshot
    status          TEXT NOT NULL,              -- pending/accepted/declined/swapped
    chat_id         TEXT NOT NULL,
    created_at      TEXT NOT NULL,              -- ISO-8601 / RFC-3339
    swap_step       TEXT,                       -- logistics/verify/complete
    my_code         TEXT NOT NULL,              -- 4 digits
    their_code      TEXT NOT NULL,              -- 4 digits
    meeting_details TEXT,                       -- JSON MeetingDetails
    is_pinned       INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    is_hidden       INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    user_rating     INTEGER                     -- 1-5
);

-- ----------------------------------------------------------------
-- Messages (append-only per chat)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id        TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    chat_id   TEXT NOT NULL,
    sender    TEXT NOT NULL,                    -- 'me' | 'them'
    text      TEXT NOT NULL,
    timestamp TEXT NOT NULL                     -- ISO-8601
);

CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages(chat_id);

-- ----------------------------------------------------------------
-- Settings (active-item pointer, future flags)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
