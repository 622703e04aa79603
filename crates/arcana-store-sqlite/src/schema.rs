//! SQL schema for the Arcana SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Oracle tag tables. Each is rebuilt wholesale by an enrichment run.
CREATE TABLE IF NOT EXISTS role_tags (
    identity   TEXT NOT NULL,
    role       TEXT NOT NULL,
    is_primary INTEGER NOT NULL DEFAULT 0,
    source     TEXT NOT NULL,
    UNIQUE (identity, role, source)
);

CREATE TABLE IF NOT EXISTS sub_role_tags (
    identity    TEXT NOT NULL,
    parent_role TEXT NOT NULL,
    sub_role    TEXT NOT NULL,
    source      TEXT NOT NULL,
    UNIQUE (identity, parent_role, sub_role, source)
);

CREATE TABLE IF NOT EXISTS keyword_tags (
    identity TEXT NOT NULL,
    keyword  TEXT NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (identity, keyword, source)
);

CREATE TABLE IF NOT EXISTS typal_tags (
    identity TEXT NOT NULL,
    typal    TEXT NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (identity, typal, source)
);

CREATE TABLE IF NOT EXISTS core_role_tags (
    identity TEXT NOT NULL,
    role     TEXT NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (identity, role, source)
);

CREATE TABLE IF NOT EXISTS deck_tags (
    identity       TEXT NOT NULL,
    tag            TEXT NOT NULL,
    category       TEXT,
    source         TEXT NOT NULL,
    version        INTEGER NOT NULL,
    source_version TEXT NOT NULL,
    UNIQUE (identity, tag, source)
);

CREATE TABLE IF NOT EXISTS evergreen_tags (
    identity TEXT NOT NULL,
    keyword  TEXT NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (identity, keyword, source)
);

-- Synergy tables. weight is a lift ratio, except for cards where it is a
-- composite score.
CREATE TABLE IF NOT EXISTS deck_tag_core_role_synergy (
    deck_tag TEXT NOT NULL,
    role     TEXT NOT NULL,
    weight   REAL NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (deck_tag, role, source)
);

CREATE TABLE IF NOT EXISTS deck_tag_evergreen_synergy (
    deck_tag TEXT NOT NULL,
    keyword  TEXT NOT NULL,
    weight   REAL NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (deck_tag, keyword, source)
);

CREATE TABLE IF NOT EXISTS deck_tag_card_synergy (
    deck_tag TEXT NOT NULL,
    identity TEXT NOT NULL,
    weight   REAL NOT NULL,
    source   TEXT NOT NULL,
    UNIQUE (deck_tag, identity, source)
);

-- Owned card records, written by the collection layer.
CREATE TABLE IF NOT EXISTS owned_cards (
    card_id          TEXT PRIMARY KEY,
    oracle_id        TEXT,
    name             TEXT NOT NULL,
    type_line        TEXT,
    set_code         TEXT,
    collector_number TEXT
);

CREATE TABLE IF NOT EXISTS card_roles (
    card_id    TEXT NOT NULL REFERENCES owned_cards(card_id) ON DELETE CASCADE,
    role       TEXT NOT NULL,
    is_primary INTEGER NOT NULL DEFAULT 0,
    UNIQUE (card_id, role)
);

-- sub_role is the full `parent:sub` key.
CREATE TABLE IF NOT EXISTS card_sub_roles (
    card_id  TEXT NOT NULL REFERENCES owned_cards(card_id) ON DELETE CASCADE,
    sub_role TEXT NOT NULL,
    UNIQUE (card_id, sub_role)
);

CREATE INDEX IF NOT EXISTS deck_tags_tag_idx       ON deck_tags(tag);
CREATE INDEX IF NOT EXISTS deck_tags_version_idx   ON deck_tags(version, source_version);
CREATE INDEX IF NOT EXISTS core_role_tags_role_idx ON core_role_tags(role);
CREATE INDEX IF NOT EXISTS evergreen_tags_kw_idx   ON evergreen_tags(keyword);

PRAGMA user_version = 1;
";
