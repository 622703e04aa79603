//! Canonical printing selection.
//!
//! Every identity is classified from exactly one printing. Printings are
//! scored additively and the first maximal score wins, so the choice is
//! stable for a fixed input order.

use arcana_core::card::{CardFace, ClassifiableText, Printing};

/// Separator placed between card faces when a top-level field is missing.
pub const FACE_SEPARATOR: &str = "\n\n//\n\n";

const PRIMARY_LANGUAGE: &str = "en";
const PAPER_GAME: &str = "paper";
const EXCLUDED_SET_TYPES: &[&str] = &["token", "memorabilia", "art_series"];

/// Additive preference score for one printing.
pub fn score_print(printing: &Printing) -> u32 {
  let mut score = 0;
  if printing.lang.as_deref() == Some(PRIMARY_LANGUAGE) {
    score += 3;
  }
  let set_type = printing.set_type.as_deref().unwrap_or_default();
  if !EXCLUDED_SET_TYPES.contains(&set_type) {
    score += 2;
  }
  if printing.games.iter().any(|g| g == PAPER_GAME) {
    score += 1;
  }
  if !printing.digital {
    score += 1;
  }
  score
}

/// The first printing with the highest score, or `None` for an empty slice.
pub fn select_best_print(printings: &[Printing]) -> Option<&Printing> {
  let mut best: Option<(&Printing, u32)> = None;
  for printing in printings {
    let score = score_print(printing);
    if best.is_none_or(|(_, top)| score > top) {
      best = Some((printing, score));
    }
  }
  best.map(|(printing, _)| printing)
}

/// Join one field across all faces, skipping faces where it is empty.
pub fn join_faces(
  faces: &[CardFace],
  field: impl Fn(&CardFace) -> Option<&str>,
) -> Option<String> {
  let parts: Vec<&str> = faces
    .iter()
    .filter_map(&field)
    .filter(|value| !value.is_empty())
    .collect();
  (!parts.is_empty()).then(|| parts.join(FACE_SEPARATOR))
}

/// Rules text of a printing, falling back to its faces.
pub fn oracle_text_of(printing: &Printing) -> String {
  printing
    .oracle_text
    .as_deref()
    .filter(|text| !text.is_empty())
    .map(str::to_owned)
    .or_else(|| join_faces(&printing.card_faces, |f| f.oracle_text.as_deref()))
    .unwrap_or_default()
}

/// Type line of a printing, falling back to its faces.
pub fn type_line_of(printing: &Printing) -> String {
  printing
    .type_line
    .as_deref()
    .filter(|line| !line.is_empty())
    .map(str::to_owned)
    .or_else(|| join_faces(&printing.card_faces, |f| f.type_line.as_deref()))
    .unwrap_or_default()
}

/// The classifier view of one printing.
pub fn classifiable_text(printing: &Printing) -> ClassifiableText {
  ClassifiableText {
    name:          printing.name.clone(),
    oracle_text:   oracle_text_of(printing),
    type_line:     type_line_of(printing),
    card_faces:    printing.card_faces.clone(),
    layout:        printing.layout.clone().unwrap_or_default(),
    produced_mana: printing.produced_mana.clone(),
  }
}
