//! Per-identity tag rows produced by the enrichment run.
//!
//! Every table is rebuilt wholesale by each run; rows are never updated in
//! place. Uniqueness is `(identity, value, source)` for every table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

/// Schema revision of the deck-tag derivation rules. Bump whenever the
/// derivation changes in a way that should invalidate stored rows.
pub const DECK_TAG_VERSION: u32 = 1;

pub const SOURCE_DERIVED: &str = "derived";
pub const SOURCE_CORPUS: &str = "corpus";
pub const SOURCE_CORE_ROLE: &str = "core-role";

// ─── Tables ──────────────────────────────────────────────────────────────────

/// Names of the persisted tables; the string form is the SQL table name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum TagTable {
  RoleTags,
  SubRoleTags,
  KeywordTags,
  TypalTags,
  CoreRoleTags,
  DeckTags,
  EvergreenTags,
  DeckTagCoreRoleSynergy,
  DeckTagEvergreenSynergy,
  DeckTagCardSynergy,
}

impl TagTable {
  pub fn is_synergy(self) -> bool {
    matches!(
      self,
      Self::DeckTagCoreRoleSynergy
        | Self::DeckTagEvergreenSynergy
        | Self::DeckTagCardSynergy
    )
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A functional role held by an identity. At most one row per identity has
/// `is_primary` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTag {
  pub identity:   String,
  pub role:       String,
  pub is_primary: bool,
  pub source:     String,
}

/// A sub-role scoped within a parent role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRoleTag {
  pub identity:    String,
  pub parent_role: String,
  pub sub_role:    String,
  pub source:      String,
}

/// A printed keyword found on any printing of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTag {
  pub identity: String,
  pub keyword:  String,
  pub source:   String,
}

/// A creature (or other typal-eligible) subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypalTag {
  pub identity: String,
  pub typal:    String,
  pub source:   String,
}

/// A human-readable core-role label, e.g. `"Mana Rock"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreRoleTag {
  pub identity: String,
  pub role:     String,
  pub source:   String,
}

/// An archetype label. A row is current only if both `version` and
/// `source_version` match what the engine expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckTag {
  pub identity:       String,
  pub tag:            String,
  pub category:       Option<String>,
  pub source:         String,
  pub version:        u32,
  pub source_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvergreenTag {
  pub identity: String,
  pub keyword:  String,
  pub source:   String,
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// Full replacement contents for the seven oracle tag tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleTagBatch {
  pub role_tags:      Vec<RoleTag>,
  pub sub_role_tags:  Vec<SubRoleTag>,
  pub keyword_tags:   Vec<KeywordTag>,
  pub typal_tags:     Vec<TypalTag>,
  pub core_role_tags: Vec<CoreRoleTag>,
  pub deck_tags:      Vec<DeckTag>,
  pub evergreen_tags: Vec<EvergreenTag>,
}

impl OracleTagBatch {
  /// Row count of one table within the batch (zero for synergy tables).
  pub fn count(&self, table: TagTable) -> usize {
    match table {
      TagTable::RoleTags => self.role_tags.len(),
      TagTable::SubRoleTags => self.sub_role_tags.len(),
      TagTable::KeywordTags => self.keyword_tags.len(),
      TagTable::TypalTags => self.typal_tags.len(),
      TagTable::CoreRoleTags => self.core_role_tags.len(),
      TagTable::DeckTags => self.deck_tags.len(),
      TagTable::EvergreenTags => self.evergreen_tags.len(),
      _ => 0,
    }
  }
}

// ─── Owned-record roles ──────────────────────────────────────────────────────

/// The roles linked to one owned card record. Sub-roles are keyed
/// `parent:sub`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRoleSet {
  pub card_id:   Uuid,
  pub roles:     BTreeSet<String>,
  pub sub_roles: BTreeSet<String>,
  pub primary:   Option<String>,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn table_names_are_snake_case() {
    assert_eq!(TagTable::DeckTagCardSynergy.as_ref(), "deck_tag_card_synergy");
    assert_eq!(TagTable::from_str("role_tags").unwrap(), TagTable::RoleTags);
  }

  #[test]
  fn three_synergy_tables() {
    assert_eq!(TagTable::iter().filter(|t| t.is_synergy()).count(), 3);
  }
}
