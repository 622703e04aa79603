//! Text normalisation and rule-token compilation.
//!
//! Every classifier matches against the same normalised string: name, type
//! line, and rules text joined by spaces, reminder text removed, lowercased,
//! symbol replacements applied, and whitespace collapsed to single spaces.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

// ─── Normalisation settings ───────────────────────────────────────────────────

/// The declarative normalisation settings read from `normalization.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
  pub strip_reminder_text: bool,
  pub lowercase:           bool,
  /// Symbol → word, e.g. `{t}` → `tap`. The word is inserted padded with
  /// spaces so it always forms its own token.
  pub symbol_replacements: BTreeMap<String, String>,
}

impl Default for Normalization {
  fn default() -> Self {
    Self {
      strip_reminder_text: false,
      lowercase:           true,
      symbol_replacements: BTreeMap::new(),
    }
  }
}

// ─── Normalizer ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
  config: Normalization,
}

impl Normalizer {
  pub fn new(config: Normalization) -> Self { Self { config } }

  pub fn config(&self) -> &Normalization { &self.config }

  /// Normalise a single piece of text.
  pub fn normalize(&self, text: &str) -> String {
    if text.is_empty() {
      return String::new();
    }

    let mut out = if self.config.strip_reminder_text {
      strip_reminder_text(text)
    } else {
      text.to_owned()
    };

    if self.config.lowercase {
      out = out.to_lowercase();
    }

    for (symbol, word) in &self.config.symbol_replacements {
      if symbol.is_empty() {
        continue;
      }
      let key = if self.config.lowercase {
        symbol.to_lowercase()
      } else {
        symbol.clone()
      };
      out = out.replace(&key, &format!(" {word} "));
    }

    collapse_whitespace(&out)
  }

  /// Normalise the classifier view of a card: name, type line, and rules
  /// text, in that order, skipping empty parts.
  pub fn normalize_card(
    &self,
    name: &str,
    type_line: &str,
    oracle_text: &str,
  ) -> String {
    let joined = [name, type_line, oracle_text]
      .into_iter()
      .filter(|part| !part.is_empty())
      .collect::<Vec<_>>()
      .join(" ");
    self.normalize(&joined)
  }
}

/// Repeatedly remove the innermost parenthesised groups until none remain.
/// Unbalanced parentheses are left in place.
pub fn strip_reminder_text(text: &str) -> String {
  let mut out = text.to_owned();
  loop {
    let cleaned = strip_innermost_groups(&out);
    if cleaned == out {
      return cleaned;
    }
    out = cleaned;
  }
}

/// One pass: every `( ... )` group with no parentheses inside becomes a
/// single space.
fn strip_innermost_groups(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut open: Option<usize> = None;
  for ch in text.chars() {
    match ch {
      '(' => {
        open = Some(out.len());
        out.push(ch);
      }
      ')' => match open.take() {
        Some(start) => {
          out.truncate(start);
          out.push(' ');
        }
        None => out.push(ch),
      },
      _ => out.push(ch),
    }
  }
  out
}

fn collapse_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A compiled rule token.
///
/// Tokens made only of lowercase letters and digits match as whole words, so
/// `to` never matches inside `token`. Anything else (phrases, punctuation,
/// mana symbols) matches as a literal substring.
#[derive(Debug, Clone)]
pub enum TokenPattern {
  Word(Regex),
  Literal(String),
}

impl TokenPattern {
  /// Compile a raw token. Returns `None` for blank tokens.
  pub fn compile(raw: &str) -> Option<Self> {
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
      return None;
    }
    if is_simple_token(&token) {
      let pattern = format!(r"\b{}\b", regex::escape(&token));
      match Regex::new(&pattern) {
        Ok(rx) => Some(Self::Word(rx)),
        Err(err) => {
          tracing::warn!("skipping uncompilable rule token {token:?}: {err}");
          None
        }
      }
    } else {
      Some(Self::Literal(token))
    }
  }

  /// Compile a list of raw tokens, dropping blanks.
  pub fn compile_all<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
    raw.iter().filter_map(|t| Self::compile(t.as_ref())).collect()
  }

  /// A plain lowercased substring, whatever its shape. Role keywords match
  /// this way, so `connive` also finds `connives`.
  pub fn literal(raw: &str) -> Option<Self> {
    let token = raw.trim().to_lowercase();
    (!token.is_empty()).then_some(Self::Literal(token))
  }

  pub fn literal_all<S: AsRef<str>>(raw: &[S]) -> Vec<Self> {
    raw.iter().filter_map(|t| Self::literal(t.as_ref())).collect()
  }

  pub fn is_match(&self, text: &str) -> bool {
    match self {
      Self::Word(rx) => rx.is_match(text),
      Self::Literal(lit) => text.contains(lit.as_str()),
    }
  }
}

fn is_simple_token(token: &str) -> bool {
  token
    .chars()
    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// True if `word` occurs in `text` with a non-alphanumeric character (or the
/// string edge) on both sides.
pub fn contains_word(text: &str, word: &str) -> bool {
  if word.is_empty() {
    return false;
  }
  text.match_indices(word).any(|(start, _)| {
    let end = start + word.len();
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric)
      && !after.is_some_and(char::is_alphanumeric)
  })
}
