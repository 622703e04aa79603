//! [`SqliteStore`], the SQLite implementation of [`TagStore`].

use std::path::Path;

use arcana_core::{
  card::OwnedCard,
  store::{DeckTagCurrency, TagStore},
  synergy::{
    DeckTagCardSynergy, DeckTagCoreRoleSynergy, DeckTagEvergreenSynergy, SynergyBatch,
  },
  tag::{
    CardRoleSet, CoreRoleTag, DeckTag, EvergreenTag, KeywordTag, OracleTagBatch, RoleTag,
    SubRoleTag, TagTable, TypalTag,
  },
};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{
  Result,
  encode::{RawCardRoles, RawOwnedCard, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Arcana tag store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Bulk writes ─────────────────────────────────────────────────────────────

const ORACLE_TABLES: [TagTable; 7] = [
  TagTable::RoleTags,
  TagTable::SubRoleTags,
  TagTable::KeywordTags,
  TagTable::TypalTags,
  TagTable::CoreRoleTags,
  TagTable::DeckTags,
  TagTable::EvergreenTags,
];

const SYNERGY_TABLES: [TagTable; 3] = [
  TagTable::DeckTagCoreRoleSynergy,
  TagTable::DeckTagEvergreenSynergy,
  TagTable::DeckTagCardSynergy,
];

fn clear_tables(conn: &Connection, tables: &[TagTable]) -> rusqlite::Result<()> {
  for table in tables {
    conn.execute(&format!("DELETE FROM {table}"), [])?;
  }
  Ok(())
}

fn insert_oracle_tags(conn: &Connection, batch: &OracleTagBatch) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT INTO role_tags (identity, role, is_primary, source) VALUES (?1, ?2, ?3, ?4)",
  )?;
  for row in &batch.role_tags {
    stmt.execute(rusqlite::params![row.identity, row.role, row.is_primary, row.source])?;
  }

  let mut stmt = conn.prepare(
    "INSERT INTO sub_role_tags (identity, parent_role, sub_role, source)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for row in &batch.sub_role_tags {
    stmt.execute(rusqlite::params![row.identity, row.parent_role, row.sub_role, row.source])?;
  }

  let mut stmt =
    conn.prepare("INSERT INTO keyword_tags (identity, keyword, source) VALUES (?1, ?2, ?3)")?;
  for row in &batch.keyword_tags {
    stmt.execute(rusqlite::params![row.identity, row.keyword, row.source])?;
  }

  let mut stmt =
    conn.prepare("INSERT INTO typal_tags (identity, typal, source) VALUES (?1, ?2, ?3)")?;
  for row in &batch.typal_tags {
    stmt.execute(rusqlite::params![row.identity, row.typal, row.source])?;
  }

  let mut stmt =
    conn.prepare("INSERT INTO core_role_tags (identity, role, source) VALUES (?1, ?2, ?3)")?;
  for row in &batch.core_role_tags {
    stmt.execute(rusqlite::params![row.identity, row.role, row.source])?;
  }

  let mut stmt = conn.prepare(
    "INSERT INTO deck_tags (identity, tag, category, source, version, source_version)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
  )?;
  for row in &batch.deck_tags {
    stmt.execute(rusqlite::params![
      row.identity,
      row.tag,
      row.category,
      row.source,
      row.version,
      row.source_version,
    ])?;
  }

  let mut stmt =
    conn.prepare("INSERT INTO evergreen_tags (identity, keyword, source) VALUES (?1, ?2, ?3)")?;
  for row in &batch.evergreen_tags {
    stmt.execute(rusqlite::params![row.identity, row.keyword, row.source])?;
  }
  Ok(())
}

fn insert_synergies(conn: &Connection, batch: &SynergyBatch) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT INTO deck_tag_core_role_synergy (deck_tag, role, weight, source)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for row in &batch.core_roles {
    stmt.execute(rusqlite::params![row.deck_tag, row.role, row.weight, row.source])?;
  }

  let mut stmt = conn.prepare(
    "INSERT INTO deck_tag_evergreen_synergy (deck_tag, keyword, weight, source)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for row in &batch.evergreen {
    stmt.execute(rusqlite::params![row.deck_tag, row.keyword, row.weight, row.source])?;
  }

  let mut stmt = conn.prepare(
    "INSERT INTO deck_tag_card_synergy (deck_tag, identity, weight, source)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for row in &batch.cards {
    stmt.execute(rusqlite::params![row.deck_tag, row.identity, row.weight, row.source])?;
  }
  Ok(())
}

// ─── Reads ───────────────────────────────────────────────────────────────────

const DECK_TAG_COLUMNS: &str =
  "SELECT identity, tag, category, source, version, source_version FROM deck_tags";

fn deck_tag_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DeckTag> {
  Ok(DeckTag {
    identity:       row.get(0)?,
    tag:            row.get(1)?,
    category:       row.get(2)?,
    source:         row.get(3)?,
    version:        row.get(4)?,
    source_version: row.get(5)?,
  })
}

fn read_core_role_tags(conn: &Connection) -> rusqlite::Result<Vec<CoreRoleTag>> {
  let mut stmt =
    conn.prepare("SELECT identity, role, source FROM core_role_tags ORDER BY rowid")?;
  let rows = stmt
    .query_map([], |row| {
      Ok(CoreRoleTag {
        identity: row.get(0)?,
        role:     row.get(1)?,
        source:   row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_evergreen_tags(conn: &Connection) -> rusqlite::Result<Vec<EvergreenTag>> {
  let mut stmt =
    conn.prepare("SELECT identity, keyword, source FROM evergreen_tags ORDER BY rowid")?;
  let rows = stmt
    .query_map([], |row| {
      Ok(EvergreenTag {
        identity: row.get(0)?,
        keyword:  row.get(1)?,
        source:   row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn read_oracle_tags(conn: &Connection) -> rusqlite::Result<OracleTagBatch> {
  let role_tags = conn
    .prepare("SELECT identity, role, is_primary, source FROM role_tags ORDER BY rowid")?
    .query_map([], |row| {
      Ok(RoleTag {
        identity:   row.get(0)?,
        role:       row.get(1)?,
        is_primary: row.get(2)?,
        source:     row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let sub_role_tags = conn
    .prepare(
      "SELECT identity, parent_role, sub_role, source FROM sub_role_tags ORDER BY rowid",
    )?
    .query_map([], |row| {
      Ok(SubRoleTag {
        identity:    row.get(0)?,
        parent_role: row.get(1)?,
        sub_role:    row.get(2)?,
        source:      row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let keyword_tags = conn
    .prepare("SELECT identity, keyword, source FROM keyword_tags ORDER BY rowid")?
    .query_map([], |row| {
      Ok(KeywordTag {
        identity: row.get(0)?,
        keyword:  row.get(1)?,
        source:   row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let typal_tags = conn
    .prepare("SELECT identity, typal, source FROM typal_tags ORDER BY rowid")?
    .query_map([], |row| {
      Ok(TypalTag {
        identity: row.get(0)?,
        typal:    row.get(1)?,
        source:   row.get(2)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let deck_tags = conn
    .prepare(&format!("{DECK_TAG_COLUMNS} ORDER BY rowid"))?
    .query_map([], deck_tag_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(OracleTagBatch {
    role_tags,
    sub_role_tags,
    keyword_tags,
    typal_tags,
    core_role_tags: read_core_role_tags(conn)?,
    deck_tags,
    evergreen_tags: read_evergreen_tags(conn)?,
  })
}

fn read_synergies(conn: &Connection) -> rusqlite::Result<SynergyBatch> {
  let core_roles = conn
    .prepare(
      "SELECT deck_tag, role, weight, source FROM deck_tag_core_role_synergy ORDER BY rowid",
    )?
    .query_map([], |row| {
      Ok(DeckTagCoreRoleSynergy {
        deck_tag: row.get(0)?,
        role:     row.get(1)?,
        weight:   row.get(2)?,
        source:   row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let evergreen = conn
    .prepare(
      "SELECT deck_tag, keyword, weight, source FROM deck_tag_evergreen_synergy
       ORDER BY rowid",
    )?
    .query_map([], |row| {
      Ok(DeckTagEvergreenSynergy {
        deck_tag: row.get(0)?,
        keyword:  row.get(1)?,
        weight:   row.get(2)?,
        source:   row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let cards = conn
    .prepare(
      "SELECT deck_tag, identity, weight, source FROM deck_tag_card_synergy ORDER BY rowid",
    )?
    .query_map([], |row| {
      Ok(DeckTagCardSynergy {
        deck_tag: row.get(0)?,
        identity: row.get(1)?,
        weight:   row.get(2)?,
        source:   row.get(3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(SynergyBatch { core_roles, evergreen, cards })
}

// ─── TagStore impl ───────────────────────────────────────────────────────────

impl TagStore for SqliteStore {
  type Error = crate::Error;

  // ── Oracle tags ───────────────────────────────────────────────────────────

  async fn replace_oracle_tags(
    &self,
    batch: OracleTagBatch,
    synergies: Option<SynergyBatch>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        clear_tables(&tx, &ORACLE_TABLES)?;
        insert_oracle_tags(&tx, &batch)?;
        if let Some(synergies) = &synergies {
          clear_tables(&tx, &SYNERGY_TABLES)?;
          insert_synergies(&tx, synergies)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn oracle_tags(&self) -> Result<OracleTagBatch> {
    let batch = self.conn.call(|conn| Ok(read_oracle_tags(conn)?)).await?;
    Ok(batch)
  }

  async fn current_deck_tags(
    &self,
    version: u32,
    source_version: String,
  ) -> Result<Vec<DeckTag>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{DECK_TAG_COLUMNS} WHERE version = ?1 AND source_version = ?2 ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![version, source_version], deck_tag_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn deck_tag_currency(
    &self,
    version: u32,
    source_version: String,
  ) -> Result<DeckTagCurrency> {
    let (total, current): (i64, i64) = self
      .conn
      .call(move |conn| {
        let counts = conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(version = ?1 AND source_version = ?2), 0)
           FROM deck_tags",
          rusqlite::params![version, source_version],
          |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        Ok(counts)
      })
      .await?;
    Ok(DeckTagCurrency {
      total:   total.max(0) as usize,
      current: current.max(0) as usize,
    })
  }

  async fn core_role_tags(&self) -> Result<Vec<CoreRoleTag>> {
    let rows = self.conn.call(|conn| Ok(read_core_role_tags(conn)?)).await?;
    Ok(rows)
  }

  async fn evergreen_tags(&self) -> Result<Vec<EvergreenTag>> {
    let rows = self.conn.call(|conn| Ok(read_evergreen_tags(conn)?)).await?;
    Ok(rows)
  }

  // ── Synergies ─────────────────────────────────────────────────────────────

  async fn replace_synergies(&self, batch: SynergyBatch) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        clear_tables(&tx, &SYNERGY_TABLES)?;
        insert_synergies(&tx, &batch)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn synergies(&self) -> Result<SynergyBatch> {
    let batch = self.conn.call(|conn| Ok(read_synergies(conn)?)).await?;
    Ok(batch)
  }

  // ── Owned records ─────────────────────────────────────────────────────────

  async fn add_owned_card(&self, card: OwnedCard) -> Result<()> {
    let id_str = encode_uuid(card.card_id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO owned_cards (
             card_id, oracle_id, name, type_line, set_code, collector_number
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            card.oracle_id,
            card.name,
            card.type_line,
            card.set_code,
            card.collector_number,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn owned_cards(&self) -> Result<Vec<OwnedCard>> {
    let raws: Vec<RawOwnedCard> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT card_id, oracle_id, name, type_line, set_code, collector_number
           FROM owned_cards ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawOwnedCard {
              card_id:          row.get(0)?,
              oracle_id:        row.get(1)?,
              name:             row.get(2)?,
              type_line:        row.get(3)?,
              set_code:         row.get(4)?,
              collector_number: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawOwnedCard::into_owned_card).collect()
  }

  async fn card_roles(&self, card_id: Uuid) -> Result<Option<CardRoleSet>> {
    let id_str = encode_uuid(card_id);
    let raw = self
      .conn
      .call(move |conn| {
        let roles = conn
          .prepare("SELECT role, is_primary FROM card_roles WHERE card_id = ?1")?
          .query_map(rusqlite::params![id_str], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        let sub_roles = conn
          .prepare("SELECT sub_role FROM card_sub_roles WHERE card_id = ?1")?
          .query_map(rusqlite::params![id_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(RawCardRoles { roles, sub_roles })
      })
      .await?;
    Ok(raw.into_card_roles(card_id))
  }

  async fn replace_card_roles(&self, sets: Vec<CardRoleSet>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM card_roles", [])?;
        tx.execute("DELETE FROM card_sub_roles", [])?;
        {
          let mut role_stmt = tx.prepare(
            "INSERT INTO card_roles (card_id, role, is_primary) VALUES (?1, ?2, ?3)",
          )?;
          let mut sub_stmt =
            tx.prepare("INSERT INTO card_sub_roles (card_id, sub_role) VALUES (?1, ?2)")?;
          for set in &sets {
            let id_str = encode_uuid(set.card_id);
            for role in &set.roles {
              let is_primary = set.primary.as_ref() == Some(role);
              role_stmt.execute(rusqlite::params![id_str, role, is_primary])?;
            }
            for sub_role in &set.sub_roles {
              sub_stmt.execute(rusqlite::params![id_str, sub_role])?;
            }
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Introspection ─────────────────────────────────────────────────────────

  async fn count_rows(&self, table: TagTable) -> Result<usize> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        let count =
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(count)
      })
      .await?;
    Ok(count.max(0) as usize)
  }
}
