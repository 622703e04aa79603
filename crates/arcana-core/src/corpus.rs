//! The in-memory card corpus: card identity → ordered printings.
//!
//! The corpus is loaded once from the external bulk card file and is
//! read-only for the rest of a run. Identities iterate in the order they were
//! first seen in the source file.

use std::{collections::HashMap, fmt, io::Read, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, card::Printing};

// ─── Entries ─────────────────────────────────────────────────────────────────

/// All printings of one card identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
  pub identity:  String,
  pub printings: Vec<Printing>,
}

// ─── Corpus ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Corpus {
  entries:       Vec<CorpusEntry>,
  /// identity → entry index; the first entry wins on duplicates
  by_identity:   HashMap<String, usize>,
  /// (lowercased set code, collector number) → (entry index, printing index)
  by_set_number: HashMap<(String, String), (usize, usize)>,
  ungrouped:     usize,
}

impl Corpus {
  /// Build a corpus from pre-grouped entries. Entries are kept verbatim, even
  /// ones with an empty identity; the orchestrator treats those as fatal.
  pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
    let mut corpus = Self { entries, ..Self::default() };
    corpus.build_indexes();
    corpus
  }

  /// Group a flat list of printings by `oracle_id`, preserving first-seen
  /// order. Printings without an identity are dropped and counted.
  pub fn from_printings(printings: Vec<Printing>) -> Self {
    let mut entries: Vec<CorpusEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut ungrouped = 0;

    for printing in printings {
      let Some(identity) = printing
        .oracle_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
      else {
        ungrouped += 1;
        continue;
      };

      match positions.get(&identity) {
        Some(&idx) => entries[idx].printings.push(printing),
        None => {
          positions.insert(identity.clone(), entries.len());
          entries.push(CorpusEntry { identity, printings: vec![printing] });
        }
      }
    }

    let mut corpus = Self { entries, ungrouped, ..Self::default() };
    corpus.build_indexes();
    corpus
  }

  /// Parse a bulk card file: a JSON array of printing objects.
  pub fn from_reader(reader: impl Read) -> Result<Self> {
    let printings: Vec<Printing> = serde_json::from_reader(reader)?;
    Ok(Self::from_printings(printings))
  }

  /// Load the bulk card file at `path`.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let file = std::fs::File::open(path)?;
    Self::from_reader(std::io::BufReader::new(file))
  }

  fn build_indexes(&mut self) {
    self.by_identity.clear();
    self.by_set_number.clear();
    for (entry_idx, entry) in self.entries.iter().enumerate() {
      self
        .by_identity
        .entry(entry.identity.clone())
        .or_insert(entry_idx);
      for (print_idx, printing) in entry.printings.iter().enumerate() {
        if let (Some(set), Some(number)) =
          (printing.set.as_deref(), printing.collector_number.as_deref())
        {
          self
            .by_set_number
            .entry((set.to_lowercase(), number.to_owned()))
            .or_insert((entry_idx, print_idx));
        }
      }
    }
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Printings that could not be grouped because they lacked an identity.
  pub fn ungrouped(&self) -> usize { self.ungrouped }

  pub fn entries(&self) -> &[CorpusEntry] { &self.entries }

  pub fn iter(&self) -> impl Iterator<Item = &CorpusEntry> {
    self.entries.iter()
  }

  /// All printings of `identity`, or `None` if the identity is unknown.
  pub fn printings_for(&self, identity: &str) -> Option<&[Printing]> {
    let &idx = self.by_identity.get(identity)?;
    self.entries.get(idx).map(|e| e.printings.as_slice())
  }

  /// Look a printing up by set code and collector number.
  pub fn find_by_set_number(
    &self,
    set_code: &str,
    collector_number: &str,
  ) -> Option<&Printing> {
    let key = (set_code.to_lowercase(), collector_number.to_owned());
    let &(entry_idx, print_idx) = self.by_set_number.get(&key)?;
    self.entries.get(entry_idx)?.printings.get(print_idx)
  }
}

// ─── Source version ──────────────────────────────────────────────────────────

/// A content fingerprint of the upstream bulk card file. Byte size plus
/// modification time; a false mismatch only costs a recompute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceVersion(pub String);

impl SourceVersion {
  pub fn of_path(path: impl AsRef<Path>) -> Self {
    let path = path.as_ref();
    if !path.exists() {
      return Self("default_cards:missing".into());
    }
    match std::fs::metadata(path).and_then(|m| Ok((m.modified()?, m.len()))) {
      Ok((modified, size)) => {
        let mtime: DateTime<Utc> = modified.into();
        Self(format!("default_cards:{}:{size}", mtime.timestamp()))
      }
      Err(_) => Self("default_cards:unknown".into()),
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SourceVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for SourceVersion {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn printing(oracle_id: Option<&str>, name: &str) -> Printing {
    Printing {
      oracle_id: oracle_id.map(str::to_owned),
      name: name.into(),
      ..Printing::default()
    }
  }

  #[test]
  fn groups_by_identity_in_first_seen_order() {
    let corpus = Corpus::from_printings(vec![
      printing(Some("b"), "Bolt"),
      printing(Some("a"), "Ancestral"),
      printing(Some("b"), "Bolt (reprint)"),
      printing(None, "Orphan"),
    ]);

    let ids: Vec<&str> = corpus.iter().map(|e| e.identity.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(corpus.printings_for("b").unwrap().len(), 2);
    assert_eq!(corpus.ungrouped(), 1);
  }

  #[test]
  fn identity_lookup_uses_first_matching_entry() {
    let entry = |identity: &str, name: &str| CorpusEntry {
      identity:  identity.into(),
      printings: vec![printing(Some(identity), name)],
    };
    let corpus = Corpus::from_entries(vec![
      entry("a", "First"),
      entry("b", "Other"),
      entry("a", "Shadowed"),
    ]);

    assert_eq!(corpus.printings_for("a").unwrap()[0].name, "First");
    assert_eq!(corpus.printings_for("b").unwrap()[0].name, "Other");
    assert!(corpus.printings_for("missing").is_none());
    assert_eq!(corpus.len(), 3);
  }

  #[test]
  fn parses_bulk_json_ignoring_unknown_fields() {
    let json = r#"[
      {"oracle_id": "x1", "name": "Llanowar Elves", "type_line": "Creature — Elf Druid",
       "oracle_text": "{T}: Add {G}.", "lang": "en", "set": "M19",
       "collector_number": "314", "games": ["paper"], "prices": {"usd": "0.25"}}
    ]"#;
    let corpus = Corpus::from_reader(json.as_bytes()).unwrap();
    assert_eq!(corpus.len(), 1);

    let found = corpus.find_by_set_number("m19", "314").unwrap();
    assert_eq!(found.name, "Llanowar Elves");
    assert!(corpus.find_by_set_number("m19", "1").is_none());
  }

  #[test]
  fn source_version_of_missing_file() {
    let v = SourceVersion::of_path("/definitely/not/here.json");
    assert_eq!(v.as_str(), "default_cards:missing");
  }
}
