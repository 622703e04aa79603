//! Weighted associations between deck tags and roles, keywords, and cards.

use serde::{Deserialize, Serialize};

pub const SOURCE_SYNERGY: &str = "derived_synergy_v1";

/// Deck tag ↔ core role. `weight` is a lift ratio rounded to four decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckTagCoreRoleSynergy {
  pub deck_tag: String,
  pub role:     String,
  pub weight:   f64,
  pub source:   String,
}

/// Deck tag ↔ evergreen keyword. `weight` is a lift ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckTagEvergreenSynergy {
  pub deck_tag: String,
  pub keyword:  String,
  pub weight:   f64,
  pub source:   String,
}

/// Deck tag ↔ card identity. `weight` is a composite score, not a lift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckTagCardSynergy {
  pub deck_tag: String,
  pub identity: String,
  pub weight:   f64,
  pub source:   String,
}

/// Full replacement contents for the three synergy tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynergyBatch {
  pub core_roles: Vec<DeckTagCoreRoleSynergy>,
  pub evergreen:  Vec<DeckTagEvergreenSynergy>,
  pub cards:      Vec<DeckTagCardSynergy>,
}

impl SynergyBatch {
  pub fn is_empty(&self) -> bool {
    self.core_roles.is_empty() && self.evergreen.is_empty() && self.cards.is_empty()
  }
}
