//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are stored as hyphenated lowercase strings. Booleans and integers
//! use SQLite's native types.

use std::collections::BTreeSet;

use arcana_core::{card::OwnedCard, tag::CardRoleSet};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `owned_cards` row.
pub struct RawOwnedCard {
  pub card_id:          String,
  pub oracle_id:        Option<String>,
  pub name:             String,
  pub type_line:        Option<String>,
  pub set_code:         Option<String>,
  pub collector_number: Option<String>,
}

impl RawOwnedCard {
  pub fn into_owned_card(self) -> Result<OwnedCard> {
    Ok(OwnedCard {
      card_id:          decode_uuid(&self.card_id)?,
      oracle_id:        self.oracle_id,
      name:             self.name,
      type_line:        self.type_line,
      set_code:         self.set_code,
      collector_number: self.collector_number,
    })
  }
}

/// Role and sub-role rows of one owned card.
pub struct RawCardRoles {
  /// `(role, is_primary)`
  pub roles:     Vec<(String, bool)>,
  pub sub_roles: Vec<String>,
}

impl RawCardRoles {
  /// `None` when the card has no role links at all.
  pub fn into_card_roles(self, card_id: Uuid) -> Option<CardRoleSet> {
    if self.roles.is_empty() && self.sub_roles.is_empty() {
      return None;
    }
    let primary = self
      .roles
      .iter()
      .find(|(_, is_primary)| *is_primary)
      .map(|(role, _)| role.clone());
    Some(CardRoleSet {
      card_id,
      roles: self.roles.into_iter().map(|(role, _)| role).collect(),
      sub_roles: self.sub_roles.into_iter().collect::<BTreeSet<_>>(),
      primary,
    })
  }
}
