//! Card records: printings read from the bulk corpus and the statically
//! shaped text value the classifiers consume.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Printings ───────────────────────────────────────────────────────────────

/// One face of a split, transform, or modal card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFace {
  pub name:        Option<String>,
  pub type_line:   Option<String>,
  pub oracle_text: Option<String>,
}

/// One physical or digital printing of a card identity, as it appears in the
/// bulk card file. Unknown fields in the source document are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Printing {
  /// The card identity this printing belongs to.
  pub oracle_id:        Option<String>,
  pub name:             String,
  pub type_line:        Option<String>,
  pub oracle_text:      Option<String>,
  pub card_faces:       Vec<CardFace>,
  pub keywords:         Vec<String>,
  pub lang:             Option<String>,
  /// Distribution category, e.g. `expansion`, `token`, `memorabilia`.
  pub set_type:         Option<String>,
  /// Set code.
  pub set:              Option<String>,
  pub collector_number: Option<String>,
  /// Play formats this printing is available in (`paper`, `arena`, ...).
  pub games:            Vec<String>,
  pub digital:          bool,
  pub layout:           Option<String>,
  pub produced_mana:    Vec<String>,
  pub color_identity:   Vec<String>,
  pub colors:           Vec<String>,
}

// ─── Classifier input ────────────────────────────────────────────────────────

/// The text fields every classifier reads, derived from one canonical
/// printing (or from a bare owned record when no printing is available).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiableText {
  pub name:          String,
  pub oracle_text:   String,
  pub type_line:     String,
  pub card_faces:    Vec<CardFace>,
  pub layout:        String,
  pub produced_mana: Vec<String>,
}

impl ClassifiableText {
  /// Text for a record that only knows its name and type line.
  pub fn bare(name: impl Into<String>, type_line: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      type_line: type_line.into(),
      ..Self::default()
    }
  }

  /// Convenience constructor used heavily by tests and the `classify`
  /// command.
  pub fn new(
    name: impl Into<String>,
    oracle_text: impl Into<String>,
    type_line: impl Into<String>,
  ) -> Self {
    Self {
      name: name.into(),
      oracle_text: oracle_text.into(),
      type_line: type_line.into(),
      ..Self::default()
    }
  }

  pub fn is_land(&self) -> bool {
    self.type_line.to_lowercase().contains("land")
  }
}

// ─── Owned records ───────────────────────────────────────────────────────────

/// A card record owned by the external collection layer. Role sync reads
/// these and writes per-record role links keyed by `card_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedCard {
  pub card_id:          Uuid,
  pub oracle_id:        Option<String>,
  pub name:             String,
  pub type_line:        Option<String>,
  pub set_code:         Option<String>,
  pub collector_number: Option<String>,
}

impl OwnedCard {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      card_id:          Uuid::new_v4(),
      oracle_id:        None,
      name:             name.into(),
      type_line:        None,
      set_code:         None,
      collector_number: None,
    }
  }
}
